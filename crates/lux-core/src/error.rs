use thiserror::Error;

#[derive(Error, Debug)]
pub enum LuxError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Volume mismatch: {0}")]
    VolumeMismatch(String),

    #[error("Config parse error: {0}")]
    ParseError(#[from] ron::error::SpannedError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LuxError>;
