//! Error types for ucap

use std::io;
use thiserror::Error;

/// Main error type for ucap
#[derive(Error, Debug)]
pub enum UcapError {
    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Speech engine error: {0}")]
    Engine(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for ucap operations
pub type Result<T> = std::result::Result<T, UcapError>;

impl From<String> for UcapError {
    fn from(s: String) -> Self {
        UcapError::Other(s)
    }
}

impl From<&str> for UcapError {
    fn from(s: &str) -> Self {
        UcapError::Other(s.to_string())
    }
}
