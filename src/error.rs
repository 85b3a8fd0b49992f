//! Error taxonomy for the adjustment engine.
//!
//! Every error is terminal to the operation that raised it only. The
//! session keeps its last good Original/Modified buffers, mode and
//! parameters whenever one of these is returned.

pub type AdjustResult<T> = Result<T, AdjustError>;

#[derive(thiserror::Error, Debug)]
pub enum AdjustError {
    #[error("Failed to load image '{id}': {reason}")]
    Load { id: String, reason: String },
    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),
    #[error("No image loaded")]
    NoImageLoaded,
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AdjustError {
    pub(crate) fn load(id: impl Into<String>, reason: impl ToString) -> Self {
        AdjustError::Load {
            id: id.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<toml::de::Error> for AdjustError {
    fn from(err: toml::de::Error) -> Self {
        AdjustError::Config(err.to_string())
    }
}
