//! Run configuration.
//!
//! Loaded once from `config.yml`, merged with command-line overrides, and then
//! passed by reference to every stage.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::extract::Patterns;
use crate::output::OutputFormat;
use crate::workshop::{parse_collection_id, SourceKind, DEFAULT_API_URL, DEFAULT_BASE_URL};

pub const DEFAULT_CONFIG_PATH: &str = "config.yml";
pub const DEFAULT_OUTPUT_PATH: &str = "output.txt";
pub const DEFAULT_VANILLA_MAP: &str = "Muldraugh, KY";

/// Key in `collections` used when nothing else names a collection.
const DEFAULT_COLLECTION_KEY: &str = "default";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parsing error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Configuration file is empty: {0}")]
    Empty(PathBuf),

    #[error("No collection configured (set collection_id, collections.default, or pass --collection)")]
    NoCollections,

    #[error("'{0}' is neither a configured collection name nor a collection id/URL")]
    UnknownCollection(String),

    #[error("Invalid {field} pattern: {reason}")]
    InvalidPattern { field: &'static str, reason: String },
}

/// Collection ids may be written as YAML numbers or strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum IdValue {
    Number(u64),
    Text(String),
}

impl IdValue {
    fn as_string(&self) -> String {
        match self {
            IdValue::Number(n) => n.to_string(),
            IdValue::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(IdValue),
    Many(Vec<IdValue>),
}

impl OneOrMany {
    fn values(&self) -> Vec<String> {
        match self {
            OneOrMany::One(id) => vec![id.as_string()],
            OneOrMany::Many(ids) => ids.iter().map(IdValue::as_string).collect(),
        }
    }
}

/// `config.yml` as written on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct FileConfig {
    collection_id: Option<OneOrMany>,
    collections: BTreeMap<String, IdValue>,
    output_path: Option<PathBuf>,
    format: Option<OutputFormat>,
    source: Option<SourceKind>,
    /// `null` disables the vanilla map question
    vanilla_map: Option<String>,
    patterns: Patterns,
    base_url: Option<String>,
    api_url: Option<String>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            collection_id: None,
            collections: BTreeMap::new(),
            output_path: None,
            format: None,
            source: None,
            vanilla_map: Some(DEFAULT_VANILLA_MAP.to_string()),
            patterns: Patterns::default(),
            base_url: None,
            api_url: None,
        }
    }
}

/// Values given on the command line. They win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Collection names from the file's `collections` map, or literal ids/URLs
    pub collections: Vec<String>,
    pub output_path: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub source: Option<SourceKind>,
    pub non_interactive: bool,
}

/// Everything a run needs.
#[derive(Debug, Clone)]
pub struct Config {
    /// Collections to process, in order, without repeats
    pub collection_ids: Vec<String>,

    /// Output file; replaced on every run
    pub output_path: PathBuf,

    pub format: OutputFormat,

    pub source: SourceKind,

    pub patterns: Patterns,

    /// Collection page base URL (page source)
    pub base_url: String,

    /// Remote storage base URL (API source)
    pub api_url: String,

    /// Offered for the `Map=` line in INI output
    pub vanilla_map: Option<String>,

    /// Prompt on ambiguous fields instead of taking the first candidate
    pub interactive: bool,
}

impl Config {
    /// Load `path` and apply `overrides`.
    ///
    /// A missing file is only an error when the command line names no collection.
    pub fn load(path: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = match std::fs::read_to_string(path) {
            Ok(content) => parse_file(path, &content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if overrides.collections.is_empty() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                debug!("{} not found, using command-line values only", path.display());
                FileConfig::default()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::build(file, overrides)
    }

    /// Build from YAML text, as if read from `config.yml`.
    pub fn from_yaml(content: &str, overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = parse_file(Path::new(DEFAULT_CONFIG_PATH), content)?;
        Self::build(file, overrides)
    }

    fn build(file: FileConfig, overrides: &Overrides) -> Result<Self, ConfigError> {
        let requested: Vec<String> = if !overrides.collections.is_empty() {
            overrides
                .collections
                .iter()
                .map(|name| match file.collections.get(name) {
                    Some(id) => id.as_string(),
                    None => name.clone(),
                })
                .collect()
        } else if let Some(ids) = &file.collection_id {
            ids.values()
        } else if let Some(id) = file.collections.get(DEFAULT_COLLECTION_KEY) {
            vec![id.as_string()]
        } else {
            return Err(ConfigError::NoCollections);
        };

        let mut collection_ids = Vec::with_capacity(requested.len());
        for value in requested {
            let id = parse_collection_id(&value).ok_or(ConfigError::UnknownCollection(value))?;
            if !collection_ids.contains(&id) {
                collection_ids.push(id);
            }
        }
        if collection_ids.is_empty() {
            return Err(ConfigError::NoCollections);
        }

        Ok(Self {
            collection_ids,
            output_path: overrides
                .output_path
                .clone()
                .or(file.output_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            format: overrides.format.or(file.format).unwrap_or_default(),
            source: overrides.source.or(file.source).unwrap_or_default(),
            patterns: file.patterns,
            base_url: file.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_url: file.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            vanilla_map: file.vanilla_map.filter(|m| !m.trim().is_empty()),
            interactive: !overrides.non_interactive,
        })
    }
}

fn parse_file(path: &Path, content: &str) -> Result<FileConfig, ConfigError> {
    if content.trim().is_empty() {
        return Err(ConfigError::Empty(path.to_path_buf()));
    }

    let yaml_error = |source: serde_yaml::Error| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    };

    let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(yaml_error)?;
    if value.is_null() {
        return Err(ConfigError::Empty(path.to_path_buf()));
    }

    serde_yaml::from_value(value).map_err(yaml_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_collections(names: &[&str]) -> Overrides {
        Overrides {
            collections: names.iter().map(|s| s.to_string()).collect(),
            ..Overrides::default()
        }
    }

    #[test]
    fn test_minimal_config() {
        let config = Config::from_yaml("collection_id: 2875848298\n", &Overrides::default()).unwrap();
        assert_eq!(config.collection_ids, vec!["2875848298"]);
        assert_eq!(config.output_path, PathBuf::from("output.txt"));
        assert_eq!(config.format, OutputFormat::Lines);
        assert_eq!(config.source, SourceKind::Page);
        assert_eq!(config.patterns, Patterns::default());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.vanilla_map.as_deref(), Some("Muldraugh, KY"));
        assert!(config.interactive);
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
collection_id:
  - 111
  - "https://steamcommunity.com/sharedfiles/filedetails/?id=222"
  - "111"
output_path: out/servertest.txt
format: ini
source: api
vanilla_map: null
patterns:
  mod_id: 'ModID=(\S+)'
"#;
        let config = Config::from_yaml(yaml, &Overrides::default()).unwrap();
        assert_eq!(config.collection_ids, vec!["111", "222"]);
        assert_eq!(config.output_path, PathBuf::from("out/servertest.txt"));
        assert_eq!(config.format, OutputFormat::Ini);
        assert_eq!(config.source, SourceKind::Api);
        assert_eq!(config.vanilla_map, None);
        assert_eq!(config.patterns.mod_id, r"ModID=(\S+)");
        assert_eq!(config.patterns.map_folder, Patterns::default().map_folder);
    }

    #[test]
    fn test_named_collections() {
        let yaml = "collections:\n  default: 100\n  hardcore: 200\n";

        let config = Config::from_yaml(yaml, &Overrides::default()).unwrap();
        assert_eq!(config.collection_ids, vec!["100"]);

        let config = Config::from_yaml(yaml, &with_collections(&["hardcore", "300"])).unwrap();
        assert_eq!(config.collection_ids, vec!["200", "300"]);

        let err = Config::from_yaml(yaml, &with_collections(&["missing"])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCollection(name) if name == "missing"));
    }

    #[test]
    fn test_overrides_win() {
        let yaml = "collection_id: 1\noutput_path: a.txt\nformat: ini\n";
        let overrides = Overrides {
            output_path: Some(PathBuf::from("b.txt")),
            format: Some(OutputFormat::Lines),
            source: Some(SourceKind::Api),
            non_interactive: true,
            ..Overrides::default()
        };
        let config = Config::from_yaml(yaml, &overrides).unwrap();
        assert_eq!(config.output_path, PathBuf::from("b.txt"));
        assert_eq!(config.format, OutputFormat::Lines);
        assert_eq!(config.source, SourceKind::Api);
        assert!(!config.interactive);
    }

    #[test]
    fn test_no_collections() {
        let err = Config::from_yaml("output_path: x.txt\n", &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NoCollections));

        let err = Config::from_yaml("collection_id: []\n", &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NoCollections));
    }

    #[test]
    fn test_empty_and_invalid_yaml() {
        let err = Config::from_yaml("", &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Empty(_)));

        let err = Config::from_yaml("collection_id: [1, 2\n", &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn test_example_config_parses() {
        let config = Config::from_yaml(include_str!("../config.example.yml"), &Overrides::default()).unwrap();
        assert_eq!(config.collection_ids, vec!["2875848298"]);
        assert_eq!(config.output_path, PathBuf::from("mods.txt"));
        assert_eq!(config.format, OutputFormat::Lines);
        assert_eq!(config.patterns, Patterns::default());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");

        let err = Config::load(&path, &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));

        // Fine when the command line names a collection
        let config = Config::load(&path, &with_collections(&["42"])).unwrap();
        assert_eq!(config.collection_ids, vec!["42"]);
        assert_eq!(config.vanilla_map.as_deref(), Some(DEFAULT_VANILLA_MAP));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "collection_id: \"77\"\noutput_path: mods.txt\n").unwrap();

        let config = Config::load(&path, &Overrides::default()).unwrap();
        assert_eq!(config.collection_ids, vec!["77"]);
        assert_eq!(config.output_path, PathBuf::from("mods.txt"));
    }
}
