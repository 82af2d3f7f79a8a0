use crate::model::BookKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid book: {0}")]
    Validation(String),

    #[error("Book not found: {0}")]
    NotFound(BookKey),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot encode {segment:?} as a path segment: {reason}")]
    Encoding { segment: String, reason: String },

    #[error("Unsupported cover format: {0} (expected gif, png or jpg)")]
    Format(String),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
