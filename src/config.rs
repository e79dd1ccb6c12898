//! Configuration management for the reference resolver
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (refgraph.toml)
//! - Environment variables (REFGRAPH__*)
//!
//! ## Example config file (refgraph.toml):
//! ```toml
//! [resolve]
//! search_paths = ["schema", "extensions/2.0/Khronos"]
//! ignorable_types = ["glTFProperty.schema.json", "glTFChildOfRootProperty.schema.json"]
//! skip_references = ["expression-conditional"]
//! max_depth = 64
//!
//! [naming]
//! schema_suffix = ".schema.json"
//! namespace_prefix = "descriptor."
//!
//! [output]
//! format = "compact"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::resolve::{TypeNameRules, DEFAULT_MAX_DEPTH, EXPRESSION_CONDITIONAL};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Resolution settings
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Type name derivation rules
    #[serde(default)]
    pub naming: TypeNameRules,

    /// Output settings for the CLI
    #[serde(default)]
    pub output: OutputConfig,
}

/// Resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Directories searched for relative references, in order
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// References inlined without their own graph entry
    #[serde(default)]
    pub ignorable_types: Vec<String>,

    /// Reference substrings treated as if the `$ref` were absent
    #[serde(default = "default_skip_references")]
    pub skip_references: Vec<String>,

    /// Maximum nesting of reference expansions
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

/// Output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_skip_references() -> Vec<String> {
    vec![EXPRESSION_CONDITIONAL.to_string()]
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            ignorable_types: Vec::new(),
            skip_references: default_skip_references(),
            max_depth: default_max_depth(),
        }
    }
}

impl OutputFormat {
    /// Serialize a value in this format
    pub fn render<T: Serialize>(self, value: &T) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, with `config_path` as a required extra file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["refgraph.toml", ".refgraph.toml", "config/refgraph.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        let project_dirs = directories::ProjectDirs::from("dev", "schema-refgraph", "refgraph");
        if let Some(config_dir) = project_dirs {
            let xdg_config = config_dir.config_dir().join("refgraph.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // REFGRAPH__RESOLVE__MAX_DEPTH=8 and friends
        builder = builder.add_source(
            Environment::with_prefix("REFGRAPH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert!(config.resolve.search_paths.is_empty());
        assert_eq!(config.resolve.skip_references, vec!["expression-conditional"]);
        assert_eq!(config.resolve.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.naming, TypeNameRules::default());
        assert_eq!(config.output.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_serialize_config() {
        let config = ResolverConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[resolve]"));
        assert!(toml_str.contains("[naming]"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
[resolve]
search_paths = ["schema", "extensions"]
ignorable_types = ["glTFProperty.schema.json"]

[naming]
namespace_prefix = "gltf."

[output]
format = "compact"
"#,
        )
        .unwrap();

        let config = ResolverConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(
            config.resolve.search_paths,
            vec![PathBuf::from("schema"), PathBuf::from("extensions")]
        );
        assert_eq!(config.resolve.ignorable_types, vec!["glTFProperty.schema.json"]);
        assert_eq!(config.resolve.skip_references, vec!["expression-conditional"]);
        assert_eq!(config.naming.namespace_prefix, "gltf.");
        assert_eq!(config.naming.schema_suffix, ".schema.json");
        assert_eq!(config.output.format, OutputFormat::Compact);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved.toml");

        let mut config = ResolverConfig::default();
        config.resolve.max_depth = 12;
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = ResolverConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.resolve.max_depth, 12);
    }

    #[test]
    fn test_output_format() {
        let value = serde_json::json!({"a": 1});
        assert_eq!(OutputFormat::Compact.render(&value).unwrap(), r#"{"a":1}"#);
        assert!(OutputFormat::Pretty.render(&value).unwrap().contains('\n'));
    }
}
