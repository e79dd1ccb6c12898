//! Type names derived from schema file names
//!
//! `simpleExample.type.schema.json` becomes `simpleExample.type`,
//! `descriptor.foo.schema.json` becomes `foo`, and
//! `_.ctx.runtime.bar.schema.json` becomes `CTX.bar`.

use serde::{Deserialize, Serialize};

/// Textual rules applied by [`TypeNameRules::derive`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeNameRules {
    /// Suffix dropped from schema file names
    #[serde(default = "default_schema_suffix")]
    pub schema_suffix: String,

    /// Base-type file that keeps its namespace prefix
    #[serde(default = "default_base_file")]
    pub base_file: String,

    /// Namespace prefix stripped from every other file
    #[serde(default = "default_namespace_prefix")]
    pub namespace_prefix: String,

    /// Legacy namespace marker
    #[serde(default = "default_legacy_prefix")]
    pub legacy_prefix: String,

    /// Replacement for `legacy_prefix`
    #[serde(default = "default_legacy_alias")]
    pub legacy_alias: String,
}

fn default_schema_suffix() -> String {
    ".schema.json".to_string()
}

fn default_base_file() -> String {
    "descriptor.schema.json".to_string()
}

fn default_namespace_prefix() -> String {
    "descriptor.".to_string()
}

fn default_legacy_prefix() -> String {
    "_.ctx.runtime".to_string()
}

fn default_legacy_alias() -> String {
    "CTX".to_string()
}

impl Default for TypeNameRules {
    fn default() -> Self {
        Self {
            schema_suffix: default_schema_suffix(),
            base_file: default_base_file(),
            namespace_prefix: default_namespace_prefix(),
            legacy_prefix: default_legacy_prefix(),
            legacy_alias: default_legacy_alias(),
        }
    }
}

impl TypeNameRules {
    /// Derive a type name from the file part of a reference
    pub fn derive(&self, file_name: &str) -> String {
        let mut name = file_name
            .strip_suffix(self.schema_suffix.as_str())
            .unwrap_or(file_name);

        if file_name != self.base_file && name != self.base_file {
            if let Some(rest) = name.strip_prefix(self.namespace_prefix.as_str()) {
                name = rest;
            }
        }

        match name.strip_prefix(self.legacy_prefix.as_str()) {
            Some(rest) if !self.legacy_prefix.is_empty() => {
                format!("{}{}", self.legacy_alias, rest)
            }
            _ => name.to_string(),
        }
    }
}

/// Derive a type name with the default rules
pub fn derive_type_name(file_name: &str) -> String {
    TypeNameRules::default().derive(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_schema_suffix() {
        assert_eq!(derive_type_name("widget.schema.json"), "widget");
        assert_eq!(derive_type_name("simpleExample.type.schema.json"), "simpleExample.type");
    }

    #[test]
    fn test_strips_namespace_prefix() {
        assert_eq!(derive_type_name("descriptor.foo.schema.json"), "foo");
    }

    #[test]
    fn test_base_file_keeps_its_name() {
        assert_eq!(derive_type_name("descriptor.schema.json"), "descriptor");
    }

    #[test]
    fn test_legacy_marker_alias() {
        assert_eq!(derive_type_name("_.ctx.runtime.bar.schema.json"), "CTX.bar");
    }

    #[test]
    fn test_unrecognized_names_pass_through() {
        assert_eq!(derive_type_name(""), "");
        assert_eq!(derive_type_name("plain.json"), "plain.json");
        assert_eq!(derive_type_name("sub/dir/thing.schema.json"), "sub/dir/thing");
    }

    #[test]
    fn test_custom_rules() {
        let rules = TypeNameRules {
            schema_suffix: ".json".to_string(),
            namespace_prefix: "gltf.".to_string(),
            ..TypeNameRules::default()
        };
        assert_eq!(rules.derive("gltf.mesh.json"), "mesh");
    }
}
