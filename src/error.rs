//! Error types for reference resolution

use std::path::PathBuf;
use thiserror::Error;

/// Result type for resolver operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Reference resolution errors
#[derive(Error, Debug)]
pub enum SchemaError {
    /// No search path could resolve the reference. Carries the failure from
    /// the last search path tried, if any was tried.
    #[error("Unable to find $ref {reference}")]
    ReferenceNotFound {
        reference: String,
        #[source]
        source: Option<Box<SchemaError>>,
    },

    #[error("No title found in $ref {reference}")]
    MissingTitle { reference: String },

    #[error("Absolute $ref not supported {reference}")]
    UnsupportedAbsoluteReference { reference: String },

    #[error("JSON pointer {pointer} in $ref {reference} does not address a value")]
    PointerNotFound { reference: String, pointer: String },

    #[error("Invalid JSON pointer {pointer} in $ref {reference}")]
    InvalidPointer { reference: String, pointer: String },

    #[error("Target of $ref {reference} is not a schema object")]
    NotAnObject { reference: String },

    #[error("Reference nesting exceeded {limit} levels at $ref {reference}")]
    ReferenceDepthExceeded { reference: String, limit: usize },

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON in {path}: {source}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP request for {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: ureq::Error,
    },
}

impl SchemaError {
    /// The `$ref` string this error is about, when there is one
    pub fn reference(&self) -> Option<&str> {
        match self {
            SchemaError::ReferenceNotFound { reference, .. }
            | SchemaError::MissingTitle { reference }
            | SchemaError::UnsupportedAbsoluteReference { reference }
            | SchemaError::PointerNotFound { reference, .. }
            | SchemaError::InvalidPointer { reference, .. }
            | SchemaError::NotAnObject { reference }
            | SchemaError::ReferenceDepthExceeded { reference, .. } => Some(reference),
            _ => None,
        }
    }
}
