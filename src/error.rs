use miette::Diagnostic;
use thiserror::Error;

use crate::markup::EncodeError;

/// Main error type for receipts operations
#[derive(Error, Diagnostic, Debug)]
pub enum ReceiptError {
    #[error("IO error: {0}")]
    #[diagnostic(code(receipts::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(receipts::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(receipts::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Validation error: {message}")]
    #[diagnostic(code(receipts::validate))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Encode error: {0}")]
    #[diagnostic(
        code(receipts::encode),
        help("Keys must be single-line and trimmed, and numbers finite")
    )]
    Encode(#[from] EncodeError),
}

impl ReceiptError {
    /// Shorthand for an IO error tied to a path.
    pub fn io(path: impl Into<std::path::PathBuf>, action: &str, err: std::io::Error) -> Self {
        ReceiptError::Io {
            path: path.into(),
            message: format!("{}: {}", action, err),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReceiptError>;
