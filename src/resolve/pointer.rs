//! Reference splitting and JSON pointer lookup
//!
//! A reference has the shape `<file-part>#<json-pointer>`. Either side may be
//! empty; an empty pointer is treated the same as no pointer at all.

use serde_json::Value;

use crate::error::{Result, SchemaError};

/// A `$ref` string split at its first `#`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefParts<'a> {
    /// Location of the document, empty for the root document
    pub file: &'a str,
    /// JSON pointer into that document
    pub pointer: Option<&'a str>,
}

impl<'a> RefParts<'a> {
    pub fn is_local(&self) -> bool {
        self.file.is_empty()
    }
}

/// Split a reference into its file part and pointer part
pub fn split_reference(reference: &str) -> RefParts<'_> {
    match reference.split_once('#') {
        Some((file, pointer)) => RefParts {
            file,
            pointer: (!pointer.is_empty()).then_some(pointer),
        },
        None => RefParts { file: reference, pointer: None },
    }
}

/// Look up `pointer` inside `document`
pub fn lookup<'v>(document: &'v Value, pointer: &str, reference: &str) -> Result<&'v Value> {
    if !pointer.starts_with('/') {
        return Err(SchemaError::InvalidPointer {
            reference: reference.to_string(),
            pointer: pointer.to_string(),
        });
    }

    document.pointer(pointer).ok_or_else(|| SchemaError::PointerNotFound {
        reference: reference.to_string(),
        pointer: pointer.to_string(),
    })
}

/// Final segment of a pointer with `~1` and `~0` unescaped
///
/// `/definitions/Bar` gives `Bar`.
pub fn last_segment(pointer: &str) -> String {
    let raw = pointer.rsplit('/').next().unwrap_or(pointer);
    raw.replace("~1", "/").replace("~0", "~")
}
