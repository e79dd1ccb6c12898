//! Reference Graph
//!
//! Title-keyed registry of every schema type reached through a `$ref`, with
//! the file it came from, the titles that reference it (`parents`) and the
//! titles it references (`children`).
//!
//! A title can first appear as a parent-only placeholder (no schema, no file
//! name) and gets filled in once the type itself is resolved. Entries are
//! never removed, and parent/child lists keep duplicates: a type referenced
//! twice from the same parent lists that parent twice.
//!
//! Entries keep insertion order, which is also the serialization order.

pub mod analysis;

pub use analysis::{cycles, to_dot, to_petgraph};

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::collections::HashMap;

/// Schema title, the identity of a graph node
pub type Title = String;

/// One node of the reference graph
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEntry {
    /// Fully resolved schema, absent for parent-only placeholders
    pub schema: Option<serde_json::Value>,
    /// File part of the reference that produced the schema
    pub file_name: Option<String>,
    /// Titles of the types referencing this one
    pub parents: Vec<Title>,
    /// Titles of the types this one references
    pub children: Vec<Title>,
}

impl GraphEntry {
    fn placeholder() -> Self {
        Self {
            schema: None,
            file_name: None,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    /// True until the title has been resolved through a `$ref`
    pub fn is_placeholder(&self) -> bool {
        self.file_name.is_none()
    }
}

/// The reference graph produced by one resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceGraph {
    /// Titles in insertion order
    titles: Vec<Title>,

    /// Entries indexed by title
    entries: HashMap<Title, GraphEntry>,
}

impl ReferenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `parent` references the type `title` loaded from `file_name`
    ///
    /// Existing entries get their file name replaced and `parent` appended;
    /// new entries start with `parent` as their only parent. The parent entry
    /// is created as a placeholder when missing and receives `title` as a
    /// child. Without a parent only the type itself is recorded.
    pub fn record_reference(&mut self, title: &str, file_name: &str, parent: Option<&str>) {
        let entry = self.entry_mut(title);
        entry.file_name = Some(file_name.to_string());
        if let Some(parent) = parent {
            entry.parents.push(parent.to_string());
            self.entry_mut(parent).children.push(title.to_string());
        }
    }

    /// Store the resolved schema for `title`, replacing any previous one
    pub fn set_schema(&mut self, title: &str, schema: serde_json::Value) {
        self.entry_mut(title).schema = Some(schema);
    }

    fn entry_mut(&mut self, title: &str) -> &mut GraphEntry {
        if !self.entries.contains_key(title) {
            self.titles.push(title.to_string());
        }
        self.entries
            .entry(title.to_string())
            .or_insert_with(GraphEntry::placeholder)
    }

    pub fn get(&self, title: &str) -> Option<&GraphEntry> {
        self.entries.get(title)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.entries.contains_key(title)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Titles in insertion order
    pub fn titles(&self) -> impl Iterator<Item = &Title> {
        self.titles.iter()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Title, &GraphEntry)> {
        self.titles
            .iter()
            .filter_map(|title| self.entries.get(title).map(|entry| (title, entry)))
    }

    /// Titles that were resolved (not parent-only placeholders)
    pub fn resolved_titles(&self) -> impl Iterator<Item = &Title> {
        self.iter()
            .filter(|(_, entry)| !entry.is_placeholder())
            .map(|(title, _)| title)
    }

    /// Total number of recorded parent -> child references
    pub fn reference_count(&self) -> usize {
        self.entries.values().map(|e| e.children.len()).sum()
    }
}

impl Serialize for ReferenceGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (title, entry) in self.iter() {
            map.serialize_entry(title, entry)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_creates_parent_placeholder() {
        let mut graph = ReferenceGraph::new();
        graph.record_reference("mesh", "mesh.schema.json", Some("glTF"));

        let mesh = graph.get("mesh").unwrap();
        assert_eq!(mesh.parents, vec!["glTF"]);
        assert!(mesh.children.is_empty());
        assert_eq!(mesh.file_name.as_deref(), Some("mesh.schema.json"));

        let root = graph.get("glTF").unwrap();
        assert!(root.is_placeholder());
        assert!(root.schema.is_none());
        assert_eq!(root.children, vec!["mesh"]);
    }

    #[test]
    fn test_placeholder_is_filled_later() {
        let mut graph = ReferenceGraph::new();
        graph.record_reference("primitive", "primitive.schema.json", Some("mesh"));
        assert!(graph.get("mesh").unwrap().is_placeholder());

        graph.record_reference("mesh", "mesh.schema.json", Some("glTF"));
        graph.set_schema("mesh", json!({"title": "mesh"}));

        let mesh = graph.get("mesh").unwrap();
        assert!(!mesh.is_placeholder());
        assert_eq!(mesh.children, vec!["primitive"]);
        assert_eq!(mesh.parents, vec!["glTF"]);
        assert_eq!(mesh.schema, Some(json!({"title": "mesh"})));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut graph = ReferenceGraph::new();
        graph.record_reference("id", "id.schema.json", Some("node"));
        graph.record_reference("id", "id.schema.json", Some("node"));

        assert_eq!(graph.get("id").unwrap().parents, vec!["node", "node"]);
        assert_eq!(graph.get("node").unwrap().children, vec!["id", "id"]);
        assert_eq!(graph.reference_count(), 2);
    }

    #[test]
    fn test_file_name_last_write_wins() {
        let mut graph = ReferenceGraph::new();
        graph.record_reference("id", "a/id.schema.json", Some("x"));
        graph.record_reference("id", "b/id.schema.json", Some("y"));
        assert_eq!(graph.get("id").unwrap().file_name.as_deref(), Some("b/id.schema.json"));
    }

    #[test]
    fn test_without_parent() {
        let mut graph = ReferenceGraph::new();
        graph.record_reference("lonely", "lonely.schema.json", None);
        assert_eq!(graph.len(), 1);
        assert!(graph.get("lonely").unwrap().parents.is_empty());
    }

    #[test]
    fn test_resolved_titles_skip_placeholders() {
        let mut graph = ReferenceGraph::new();
        graph.record_reference("mesh", "mesh.schema.json", Some("glTF"));
        graph.record_reference("node", "node.schema.json", Some("glTF"));

        let resolved: Vec<&Title> = graph.resolved_titles().collect();
        assert_eq!(resolved, vec!["mesh", "node"]);
        assert_eq!(graph.titles().count(), 3);
    }

    #[test]
    fn test_serialize_in_insertion_order() {
        let mut graph = ReferenceGraph::new();
        graph.record_reference("zeta", "zeta.schema.json", Some("root"));
        graph.record_reference("alpha", "", Some("root"));

        let value = serde_json::to_value(&graph).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "root", "alpha"]);
        assert_eq!(value["alpha"]["fileName"], "");
        assert_eq!(value["root"]["fileName"], serde_json::Value::Null);
        assert_eq!(value["root"]["children"], json!(["zeta", "alpha"]));
    }
}
