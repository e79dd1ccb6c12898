//! Reference location dispatch
//!
//! The file part of a `$ref` is classified once into a [`Location`] and then
//! fetched through a [`Transport`]:
//!
//! | prefix      | behaviour                                       |
//! |-------------|-------------------------------------------------|
//! | `https://`  | not fetched, placeholder `{"$id", "title"}`     |
//! | `http://`   | blocking GET, body parsed as JSON               |
//! | `file:///`  | prefix removed, read relative to search dir     |
//! | `/`         | rejected                                        |
//! | otherwise   | read relative to search dir                     |

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::error::{Result, SchemaError};

const HTTPS_PREFIX: &str = "https://";
const HTTP_PREFIX: &str = "http://";
const FILE_PREFIX: &str = "file:///";

/// Where the file part of a reference points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location<'a> {
    /// `https://` URL, kept opaque
    Secure(&'a str),
    /// `http://` URL, fetched
    Http(&'a str),
    /// Path relative to a search directory (`file:///` already removed)
    Relative(&'a str),
    /// Absolute path, unsupported
    Absolute(&'a str),
}

impl<'a> Location<'a> {
    /// Classify a file part. More specific prefixes win.
    pub fn parse(file: &'a str) -> Self {
        if file.starts_with(HTTPS_PREFIX) {
            Location::Secure(file)
        } else if file.starts_with(HTTP_PREFIX) {
            Location::Http(file)
        } else if let Some(rest) = file.strip_prefix(FILE_PREFIX) {
            Location::Relative(rest)
        } else if file.starts_with('/') {
            Location::Absolute(file)
        } else {
            Location::Relative(file)
        }
    }
}

/// Raw document retrieval
pub trait Transport {
    /// Read and parse a local JSON file
    fn read_file(&self, path: &Path) -> Result<Value>;

    /// GET a URL and parse the body as JSON
    fn http_get(&self, url: &str) -> Result<Value>;
}

/// Local filesystem plus blocking HTTP
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTransport;

impl Transport for DefaultTransport {
    fn read_file(&self, path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path).map_err(|source| SchemaError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SchemaError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }

    fn http_get(&self, url: &str) -> Result<Value> {
        let http_err = |source| SchemaError::Http { url: url.to_string(), source };
        let mut response = ureq::get(url).call().map_err(http_err)?;
        response.body_mut().read_json::<Value>().map_err(http_err)
    }
}

/// Fetches the document a reference's file part names
pub struct LocationResolver {
    transport: Box<dyn Transport>,
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::new(DefaultTransport)
    }
}

impl std::fmt::Debug for LocationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationResolver").finish_non_exhaustive()
    }
}

impl LocationResolver {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self { transport: Box::new(transport) }
    }

    /// Fetch the document for `file` relative to `search_dir`
    ///
    /// `reference` is the full `$ref` string, used in error messages.
    pub fn fetch(&self, reference: &str, search_dir: &Path, file: &str) -> Result<Value> {
        match Location::parse(file) {
            Location::Secure(url) => Ok(json!({ "$id": url, "title": url })),
            Location::Http(url) => self.transport.http_get(url),
            Location::Absolute(_) => Err(SchemaError::UnsupportedAbsoluteReference {
                reference: reference.to_string(),
            }),
            Location::Relative(path) => self.transport.read_file(&relative_path(search_dir, path)),
        }
    }
}

/// Join like a plain string concatenation: leading separators on `path` do
/// not replace `search_dir`.
fn relative_path(search_dir: &Path, path: &str) -> PathBuf {
    search_dir.join(path.trim_start_matches('/'))
}
