//! Reference Resolution
//!
//! Walks a schema tree depth-first and replaces every `$ref` node with the
//! schema it points to, recording each resolved type in a [`ReferenceGraph`].
//!
//! ```text
//! {"title": "glTF", "properties": {"nodes": {"$ref": "node.schema.json"}}}
//!                                              │
//!                     search_paths[0]/node.schema.json ✗
//!                     search_paths[1]/node.schema.json ✓
//!                                              ▼
//! {"title": "glTF", "properties": {"nodes": {"title": "node", "typeName": "node", ...}}}
//! ```
//!
//! Pointer-only references (`#/definitions/Foo`) are looked up in the root
//! document as it was passed in. The input tree is never modified; a new tree
//! is returned.

pub mod location;
pub mod pointer;
pub mod type_name;

pub use location::{DefaultTransport, Location, LocationResolver, Transport};
pub use pointer::{split_reference, RefParts};
pub use type_name::{derive_type_name, TypeNameRules};

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::config::ResolverConfig;
use crate::error::{Result, SchemaError};
use crate::graph::ReferenceGraph;

/// Reference substring skipped by default: the expression-conditional
/// schemas reference themselves.
pub const EXPRESSION_CONDITIONAL: &str = "expression-conditional";

/// Default limit on nested reference expansions
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Output of one resolution pass
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The schema tree with every reference replaced
    pub schema: Value,
    /// Which types reference which
    pub graph: ReferenceGraph,
}

/// Resolve every `$ref` in `root` with the default settings
pub fn resolve_references(
    root: &Value,
    search_paths: &[PathBuf],
    ignorable_types: &[String],
) -> Result<Resolution> {
    RefResolver::new()
        .search_paths(search_paths.iter().cloned())
        .ignorable_types(ignorable_types.iter().cloned())
        .resolve(root)
}

/// Configured reference resolver
#[derive(Debug)]
pub struct RefResolver {
    search_paths: Vec<PathBuf>,
    /// Lowercased references
    ignorable_types: HashSet<String>,
    skip_references: Vec<String>,
    naming: TypeNameRules,
    max_depth: usize,
    locations: LocationResolver,
}

impl Default for RefResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RefResolver {
    pub fn new() -> Self {
        Self {
            search_paths: Vec::new(),
            ignorable_types: HashSet::new(),
            skip_references: vec![EXPRESSION_CONDITIONAL.to_string()],
            naming: TypeNameRules::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            locations: LocationResolver::default(),
        }
    }

    /// Build a resolver from configuration
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new().with_config(config)
    }

    /// Apply configuration. Search paths and ignorable types are appended to
    /// those already set; everything else is replaced.
    pub fn with_config(self, config: &ResolverConfig) -> Self {
        self.search_paths(config.resolve.search_paths.iter().cloned())
            .ignorable_types(config.resolve.ignorable_types.iter().cloned())
            .skip_references(config.resolve.skip_references.iter().cloned())
            .naming(config.naming.clone())
            .max_depth(config.resolve.max_depth)
    }

    /// Append search directories, tried in order
    pub fn search_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Add references that are inlined but kept out of the graph
    pub fn ignorable_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignorable_types
            .extend(types.into_iter().map(|t| t.as_ref().to_lowercase()));
        self
    }

    /// Replace the list of reference substrings that are treated as absent
    pub fn skip_references<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_references = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn naming(mut self, naming: TypeNameRules) -> Self {
        self.naming = naming;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Use a different document transport (file reads and HTTP)
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.locations = LocationResolver::new(transport);
        self
    }

    pub fn search_path_list(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Resolve every `$ref` in `root`
    pub fn resolve(&self, root: &Value) -> Result<Resolution> {
        let mut pass = Pass {
            resolver: self,
            root,
            graph: ReferenceGraph::new(),
            depth: 0,
        };
        let schema = pass.resolve_value(root, None)?;
        debug!(
            types = pass.graph.len(),
            references = pass.graph.reference_count(),
            "resolved schema references"
        );
        Ok(Resolution { schema, graph: pass.graph })
    }

    fn is_ignorable(&self, reference: &str) -> bool {
        self.ignorable_types.contains(&reference.to_lowercase())
    }

    fn is_skipped(&self, reference: &str) -> bool {
        self.skip_references
            .iter()
            .any(|pattern| reference.contains(pattern.as_str()))
    }
}

/// A resolved reference target before its own members are walked
struct Target {
    value: Map<String, Value>,
    title: String,
    file_name: String,
}

/// State of one resolution pass
struct Pass<'a> {
    resolver: &'a RefResolver,
    root: &'a Value,
    graph: ReferenceGraph,
    /// Reference expansions currently on the stack
    depth: usize,
}

impl<'a> Pass<'a> {
    fn resolve_value(&mut self, value: &Value, parent: Option<&str>) -> Result<Value> {
        match value {
            Value::Object(obj) => self.resolve_object(obj, parent),
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_value(item, parent))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            scalar => Ok(scalar.clone()),
        }
    }

    fn resolve_object(&mut self, obj: &Map<String, Value>, parent: Option<&str>) -> Result<Value> {
        let reference = obj
            .get("$ref")
            .and_then(Value::as_str)
            .filter(|r| !self.resolver.is_skipped(r));

        match reference {
            Some(reference) => self.expand_reference(reference, parent, title_of(obj)),
            None => {
                let parent = title_of(obj).or(parent);
                self.resolve_members(obj, parent).map(Value::Object)
            }
        }
    }

    fn resolve_members(
        &mut self,
        obj: &Map<String, Value>,
        parent: Option<&str>,
    ) -> Result<Map<String, Value>> {
        let mut out = Map::with_capacity(obj.len());
        for (key, value) in obj {
            let resolved = match value {
                Value::Object(_) | Value::Array(_) => self.resolve_value(value, parent)?,
                scalar => scalar.clone(),
            };
            out.insert(key.clone(), resolved);
        }
        Ok(out)
    }

    /// Expand `reference`, found on a node titled `node_title`, and record it
    /// under `parent`. A chained `$ref` in the target is recorded under the
    /// node's title, falling back to `parent`.
    fn expand_reference(
        &mut self,
        reference: &str,
        parent: Option<&str>,
        node_title: Option<&str>,
    ) -> Result<Value> {
        if self.depth >= self.resolver.max_depth {
            return Err(SchemaError::ReferenceDepthExceeded {
                reference: reference.to_string(),
                limit: self.resolver.max_depth,
            });
        }

        let Target { mut value, title, file_name } = self.locate(reference)?;
        let ignorable = self.resolver.is_ignorable(reference);

        if !ignorable {
            self.graph.record_reference(&title, &file_name, parent);
            if !value.contains_key("typeName") {
                let type_name = self.resolver.naming.derive(&file_name);
                value.insert("typeName".to_string(), Value::String(type_name));
            }
        }

        // Inlined types have no entry of their own, so what they reference
        // belongs to the type that inlined them.
        let member_parent = if ignorable { parent } else { Some(title.as_str()) };
        let chain_parent = node_title.or(parent);

        self.depth += 1;
        let resolved = self.resolve_target(value, member_parent, chain_parent);
        self.depth -= 1;
        let resolved = Value::Object(resolved?);

        if !ignorable {
            self.graph.set_schema(&title, resolved.clone());
        }
        Ok(resolved)
    }

    /// Walk a reference target. A target that is itself a reference is
    /// expanded again under `chain_parent`; otherwise its members are
    /// resolved under `member_parent`.
    fn resolve_target(
        &mut self,
        value: Map<String, Value>,
        member_parent: Option<&str>,
        chain_parent: Option<&str>,
    ) -> Result<Map<String, Value>> {
        let chained = value
            .get("$ref")
            .and_then(Value::as_str)
            .filter(|r| !self.resolver.is_skipped(r));

        match chained {
            Some(reference) => {
                match self.expand_reference(reference, chain_parent, title_of(&value))? {
                    Value::Object(obj) => Ok(obj),
                    _ => Err(SchemaError::NotAnObject { reference: reference.to_string() }),
                }
            }
            None => self.resolve_members(&value, member_parent),
        }
    }

    /// Find the target of `reference`, trying each search path in order
    fn locate(&self, reference: &str) -> Result<Target> {
        let parts = split_reference(reference);
        let mut last_error = None;

        for search_path in &self.resolver.search_paths {
            match self.locate_in(reference, parts, search_path) {
                Ok(value) => {
                    debug!(reference, search_path = %search_path.display(), "resolved $ref");
                    return self.target_from(reference, parts, value);
                }
                Err(e) => {
                    trace!(
                        reference,
                        search_path = %search_path.display(),
                        error = %e,
                        "search path did not resolve $ref"
                    );
                    last_error = Some(Box::new(e));
                }
            }
        }

        Err(SchemaError::ReferenceNotFound {
            reference: reference.to_string(),
            source: last_error,
        })
    }

    fn locate_in(
        &self,
        reference: &str,
        parts: RefParts<'_>,
        search_path: &Path,
    ) -> Result<Map<String, Value>> {
        let fetched;
        let document = if parts.is_local() {
            self.root
        } else {
            fetched = self.resolver.locations.fetch(reference, search_path, parts.file)?;
            &fetched
        };

        let Some(pointer) = parts.pointer else {
            return as_object(document, reference);
        };

        let mut target = as_object(pointer::lookup(document, pointer, reference)?, reference)?;
        target.insert(
            "typeName".to_string(),
            Value::String(pointer::last_segment(pointer)),
        );
        Ok(target)
    }

    fn target_from(
        &self,
        reference: &str,
        parts: RefParts<'_>,
        value: Map<String, Value>,
    ) -> Result<Target> {
        let title = title_of(&value)
            .ok_or_else(|| SchemaError::MissingTitle { reference: reference.to_string() })?
            .to_string();
        Ok(Target {
            value,
            title,
            file_name: parts.file.to_string(),
        })
    }
}

fn title_of(obj: &Map<String, Value>) -> Option<&str> {
    obj.get("title").and_then(Value::as_str)
}

fn as_object(value: &Value, reference: &str) -> Result<Map<String, Value>> {
    value
        .as_object()
        .cloned()
        .ok_or_else(|| SchemaError::NotAnObject { reference: reference.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_local_pointer_against_root() {
        let root = json!({
            "title": "root",
            "definitions": {"Bar": {"title": "bar", "type": "string"}},
            "properties": {"b": {"$ref": "#/definitions/Bar"}}
        });

        let out = RefResolver::new().search_paths(["."]).resolve(&root).unwrap();
        assert_eq!(
            out.schema["properties"]["b"],
            json!({"title": "bar", "type": "string", "typeName": "Bar"})
        );

        let bar = out.graph.get("bar").unwrap();
        assert_eq!(bar.file_name.as_deref(), Some(""));
        assert_eq!(bar.parents, vec!["root"]);
        assert_eq!(out.graph.get("root").unwrap().children, vec!["bar"]);
    }

    #[test]
    fn test_no_search_paths_means_not_found() {
        let root = json!({"properties": {"b": {"$ref": "#/definitions/Bar"}}});
        let err = RefResolver::new().resolve(&root).unwrap_err();
        match err {
            SchemaError::ReferenceNotFound { reference, source } => {
                assert_eq!(reference, "#/definitions/Bar");
                assert!(source.is_none());
            }
            other => panic!("Expected ReferenceNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_skip_patterns_are_configurable() {
        let root = json!({"a": {"$ref": "#/nowhere", "title": "kept"}});
        let out = RefResolver::new()
            .search_paths(["."])
            .skip_references(["nowhere"])
            .resolve(&root)
            .unwrap();
        assert_eq!(out.schema, root);
    }

    #[test]
    fn test_self_reference_hits_depth_limit() {
        let root = json!({
            "definitions": {
                "Loop": {"title": "loop", "properties": {"next": {"$ref": "#/definitions/Loop"}}}
            },
            "properties": {"start": {"$ref": "#/definitions/Loop"}}
        });
        let err = RefResolver::new()
            .search_paths(["."])
            .max_depth(8)
            .resolve(&root)
            .unwrap_err();
        assert!(matches!(err, SchemaError::ReferenceDepthExceeded { limit: 8, .. }));
    }

    #[test]
    fn test_chained_reference_is_followed() {
        let root = json!({
            "title": "root",
            "definitions": {
                "Alias": {"title": "alias", "$ref": "#/definitions/Real"},
                "Real": {"title": "real", "type": "integer"}
            },
            "properties": {"x": {"$ref": "#/definitions/Alias"}}
        });
        let out = RefResolver::new().search_paths(["."]).resolve(&root).unwrap();
        assert_eq!(out.schema["properties"]["x"]["title"], "real");

        // Once from walking definitions, once through the alias
        assert_eq!(out.graph.get("real").unwrap().parents, vec!["root", "root"]);
        let alias = out.graph.get("alias").unwrap();
        assert_eq!(alias.parents, vec!["root"]);
        assert!(alias.children.is_empty());
    }

    #[test]
    fn test_chained_reference_uses_referencing_node_title() {
        let root = json!({
            "title": "root",
            "definitions": {
                "Alias": {"title": "alias", "$ref": "#/definitions/Middle"},
                "Middle": {"title": "middle", "$ref": "#/definitions/Real"},
                "Real": {"title": "real", "type": "integer"}
            },
            "properties": {"x": {"title": "x", "$ref": "#/definitions/Alias"}}
        });
        let out = RefResolver::new().search_paths(["."]).resolve(&root).unwrap();
        assert_eq!(out.schema["properties"]["x"]["title"], "real");

        let graph = &out.graph;
        assert_eq!(graph.get("alias").unwrap().parents, vec!["root"]);
        assert_eq!(graph.get("middle").unwrap().parents, vec!["root", "x"]);
        assert_eq!(graph.get("real").unwrap().parents, vec!["alias", "root", "alias"]);
        assert!(graph.get("x").unwrap().is_placeholder());
    }
}
