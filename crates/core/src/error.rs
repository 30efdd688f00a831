//! Error types for piimask.
//!
//! Classification itself never fails; these cover the fallible edges
//! around it (OCR output ingestion, rule compilation, image codecs).

use thiserror::Error;

use crate::category::PiiCategory;

/// Primary error type for piimask operations.
#[derive(Error, Debug)]
pub enum PiiError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed OCR JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid pattern for {category}: {source}")]
    InvalidPattern {
        category: PiiCategory,
        #[source]
        source: regex::Error,
    },

    #[error("unknown language code: {0}")]
    UnknownLanguage(String),

    #[error("unknown PII category: {0}")]
    UnknownCategory(String),
}

/// Convenience Result type alias for PiiError.
pub type Result<T> = std::result::Result<T, PiiError>;
