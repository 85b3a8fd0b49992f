//! Adjustment mode, parameters and the edit-lock guard.
//!
//! Only the parameter belonging to the selected mode is editable. The
//! other two keep their values but ignore edits until their mode is
//! selected again.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{AdjustConfig, ParameterRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    None,
    Gamma,
    Contrast,
    Brightness,
    HistogramEqualization,
}

impl Mode {
    pub const ALL: &'static [Mode] = &[
        Mode::None,
        Mode::Gamma,
        Mode::Contrast,
        Mode::Brightness,
        Mode::HistogramEqualization,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Mode::None => "None",
            Mode::Gamma => "Gamma",
            Mode::Contrast => "Contrast",
            Mode::Brightness => "Brightness",
            Mode::HistogramEqualization => "HistEq",
        }
    }

    /// The parameter this mode unlocks, if any.
    pub fn parameter(&self) -> Option<Parameter> {
        match self {
            Mode::Gamma => Some(Parameter::Gamma),
            Mode::Contrast => Some(Parameter::Contrast),
            Mode::Brightness => Some(Parameter::Brightness),
            Mode::None | Mode::HistogramEqualization => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Mode::None),
            "gamma" => Ok(Mode::Gamma),
            "contrast" => Ok(Mode::Contrast),
            "brightness" => Ok(Mode::Brightness),
            "histeq" | "histogram_equalization" | "equalize" => Ok(Mode::HistogramEqualization),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}

/// One of the three numeric adjustment parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parameter {
    Gamma,
    Contrast,
    Brightness,
}

impl Parameter {
    pub const ALL: &'static [Parameter] =
        &[Parameter::Gamma, Parameter::Contrast, Parameter::Brightness];

    pub fn name(&self) -> &'static str {
        match self {
            Parameter::Gamma => "Gamma",
            Parameter::Contrast => "Contrast",
            Parameter::Brightness => "Brightness",
        }
    }

    pub fn range(&self, config: &AdjustConfig) -> ParameterRange {
        match self {
            Parameter::Gamma => config.gamma,
            Parameter::Contrast => config.contrast,
            Parameter::Brightness => config.brightness,
        }
    }
}

impl FromStr for Parameter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown parameter '{s}'"))
    }
}

/// Current values of all three parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    gamma: f32,
    contrast: f32,
    brightness: f32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self::from_config(&AdjustConfig::default())
    }
}

impl Parameters {
    pub fn from_config(config: &AdjustConfig) -> Self {
        Self {
            gamma: config.gamma.default,
            contrast: config.contrast.default,
            brightness: config.brightness.default,
        }
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn get(&self, parameter: Parameter) -> f32 {
        match parameter {
            Parameter::Gamma => self.gamma,
            Parameter::Contrast => self.contrast,
            Parameter::Brightness => self.brightness,
        }
    }

    fn slot(&mut self, parameter: Parameter) -> &mut f32 {
        match parameter {
            Parameter::Gamma => &mut self.gamma,
            Parameter::Contrast => &mut self.contrast,
            Parameter::Brightness => &mut self.brightness,
        }
    }

    /// Store `value` clamped into `range` and return what was stored.
    pub(crate) fn set_clamped(
        &mut self,
        parameter: Parameter,
        value: f32,
        range: &ParameterRange,
    ) -> f32 {
        let clamped = range.clamp(value);
        *self.slot(parameter) = clamped;
        clamped
    }

    /// Slider label text, e.g. `"Gamma: 1.00"`.
    pub fn label(&self, parameter: Parameter) -> String {
        format!("{}: {:.2}", parameter.name(), self.get(parameter))
    }
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No image loaded; no mode can be chosen.
    Locked,
    /// Image loaded with the given mode selected.
    Loaded(Mode),
}

impl Phase {
    pub fn modes_available(&self) -> bool {
        matches!(self, Phase::Loaded(_))
    }

    /// The single editable parameter, if any.
    pub fn editable_parameter(&self) -> Option<Parameter> {
        match self {
            Phase::Locked => None,
            Phase::Loaded(mode) => mode.parameter(),
        }
    }

    pub fn is_editable(&self, parameter: Parameter) -> bool {
        self.editable_parameter() == Some(parameter)
    }
}
