//! Global error handling for xmindctl
//!
//! This module provides a centralized error type that can represent errors
//! from all modules in the project.

use std::io;
use thiserror::Error;

use crate::codec::FormatError;

/// Global error type for xmindctl operations
#[derive(Error, Debug)]
pub enum XmindError {
    /// Package is missing an entry or an entry fails to parse
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Title or sheet lookup matched nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Structurally disallowed edit
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl XmindError {
    /// Process exit code reported for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            XmindError::Io(_) => 1,
            XmindError::Format(_) => 2,
            XmindError::NotFound(_) => 3,
            XmindError::InvalidOperation(_) => 4,
            XmindError::Config(_) | XmindError::InvalidArgument(_) => 64,
        }
    }
}

/// Specialized Result type for xmindctl operations
pub type Result<T> = std::result::Result<T, XmindError>;

/// Creates an XmindError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::XmindError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for adding path context to I/O errors
pub trait ResultExt<T> {
    /// Prefix the error message with additional context
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T> ResultExt<T> for std::result::Result<T, io::Error> {
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|e| {
            let context = f();
            XmindError::Io(io::Error::new(e.kind(), format!("{}: {}", context, e)))
        })
    }
}
