//! Engine configuration: sample image location and parameter ranges.
//!
//! ```toml
//! images_dir = "images"
//! extension = "jpg"
//!
//! [gamma]
//! min = 0.1
//! max = 5.0
//! default = 1.0
//! ```
//!
//! Omitted keys fall back to [`AdjustConfig::default`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AdjustError, AdjustResult};

/// Closed range and initial value of one adjustment parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParameterRange {
    pub const fn new(min: f32, max: f32, default: f32) -> Self {
        Self { min, max, default }
    }

    /// Constrain `value` to `[min, max]`. Infinite values land on the ends.
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn validate(&self, name: &str) -> AdjustResult<()> {
        if !(self.min.is_finite() && self.max.is_finite() && self.min <= self.max) {
            return Err(AdjustError::Config(format!(
                "{name}: invalid range [{}, {}]",
                self.min, self.max
            )));
        }
        if !self.contains(self.default) {
            return Err(AdjustError::Config(format!(
                "{name}: default {} outside [{}, {}]",
                self.default, self.min, self.max
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustConfig {
    /// Directory holding the named sample images.
    pub images_dir: PathBuf,
    /// File extension of the sample images, without the dot.
    pub extension: String,
    pub gamma: ParameterRange,
    pub contrast: ParameterRange,
    pub brightness: ParameterRange,
}

impl Default for AdjustConfig {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("images"),
            extension: "jpg".to_string(),
            gamma: ParameterRange::new(0.1, 5.0, 1.0),
            contrast: ParameterRange::new(0.1, 5.0, 1.0),
            brightness: ParameterRange::new(0.0, 1.0, 0.5),
        }
    }
}

impl AdjustConfig {
    pub fn from_toml_str(text: &str) -> AdjustResult<Self> {
        let config: AdjustConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> AdjustResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AdjustError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> AdjustResult<()> {
        self.gamma.validate("gamma")?;
        self.contrast.validate("contrast")?;
        self.brightness.validate("brightness")?;
        if self.extension.is_empty() {
            return Err(AdjustError::Config("empty image extension".to_string()));
        }
        Ok(())
    }
}
