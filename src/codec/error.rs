//! Error types for the package codecs

use std::io;

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Result type for codec operations
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors raised while reading or writing a mind-map package
#[derive(Error, Debug)]
pub enum FormatError {
    /// A required archive entry is absent
    #[error("Missing package entry: {0}")]
    MissingEntry(String),

    /// Neither known primary entry is present
    #[error("Unsupported format: {0}")]
    Unsupported(String),

    /// Entry parsed but does not have the expected shape
    #[error("Malformed {entry}: {reason}")]
    Malformed { entry: String, reason: String },

    /// XML syntax error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error
    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] AttrError),

    /// JSON processing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Archive container error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Entry is not valid UTF-8
    #[error("Entry {0} is not valid UTF-8")]
    Encoding(String),

    /// Writing an entry into an in-memory buffer failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl FormatError {
    pub fn malformed(entry: &str, reason: impl Into<String>) -> Self {
        FormatError::Malformed {
            entry: entry.to_string(),
            reason: reason.into(),
        }
    }
}
