use thiserror::Error;

/// Errors that can occur while configuring a carousel
#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FolioError>;
