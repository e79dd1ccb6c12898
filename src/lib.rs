//! Schema Reference Graph
//!
//! Resolves `$ref` links in a tree of JSON Schema documents and records which
//! schema types reference which, for documentation generators.
//!
//! ## Features
//!
//! - **Reference Inlining**: every `$ref` node is replaced by the schema it points to
//! - **Search Paths**: relative references are tried against each directory in order
//! - **JSON Pointers**: `file.json#/definitions/Foo` and root-local `#/definitions/Foo`
//! - **Reference Graph**: title-keyed parent/child registry of every referenced type
//! - **Type Names**: `typeName` derived from pointer segments or file names
//!
//! ## Reference locations
//!
//! ```text
//! https://…        opaque, becomes {"$id": url, "title": url}
//! http://…         fetched with a blocking GET
//! file:///a.json   read as a.json under each search path
//! /a.json          rejected
//! a.json           read under each search path
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use schema_refgraph::resolve_references;
//!
//! let root: serde_json::Value = serde_json::from_str(
//!     &std::fs::read_to_string("schema/glTF.schema.json")?,
//! )?;
//! let out = resolve_references(&root, &[PathBuf::from("schema")], &[])?;
//! for (title, entry) in out.graph.iter() {
//!     println!("{title}: {} parents", entry.parents.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod resolve;

pub use config::{OutputFormat, ResolverConfig};
pub use error::{Result, SchemaError};
pub use graph::{GraphEntry, ReferenceGraph};
pub use resolve::{
    derive_type_name, resolve_references, DefaultTransport, RefResolver, Resolution, Transport,
    TypeNameRules,
};
