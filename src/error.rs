use thiserror::Error;

/// Errors that can occur while fusing a frame pair.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FusionError {
    #[error("empty {0} frame")]
    EmptyFrame(&'static str),

    #[error("failed to load image: {0}")]
    ImageLoad(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
