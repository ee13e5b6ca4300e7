//! Pull Mod ID and Map Folder candidates out of item descriptions.
//!
//! Authors usually end their description with lines like:
//!
//! ```text
//! Workshop ID: 2392709985
//! Mod ID: ExampleMod
//! Map Folder: ExampleMap
//! ```
//!
//! The patterns are configurable; each must have one capture group holding the value.

use regex::Regex;
use serde::Deserialize;

use crate::config::ConfigError;
use crate::workshop::ExtractedFields;

pub const DEFAULT_MOD_ID_PATTERN: &str = r"(?i)Mod ID:\s*(.+)";
pub const DEFAULT_MAP_FOLDER_PATTERN: &str = r"(?i)Map Folder:\s*(.+)";

const VALUE_SEPARATOR: char = ';';

/// BBCode fragments that trail values in Steam descriptions.
const STRIP_TOKENS: &[&str] = &["[/hr]", "\r", "\n"];

/// Regex source for each field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Patterns {
    pub mod_id: String,
    pub map_folder: String,
}

impl Default for Patterns {
    fn default() -> Self {
        Self {
            mod_id: DEFAULT_MOD_ID_PATTERN.to_string(),
            map_folder: DEFAULT_MAP_FOLDER_PATTERN.to_string(),
        }
    }
}

/// Compiled patterns.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    mod_id: Regex,
    map_folder: Regex,
}

impl FieldExtractor {
    pub fn new(patterns: &Patterns) -> Result<Self, ConfigError> {
        Ok(Self {
            mod_id: compile("mod_id", &patterns.mod_id)?,
            map_folder: compile("map_folder", &patterns.map_folder)?,
        })
    }

    /// All distinct candidates in first-seen order. No prompting happens here.
    pub fn extract(&self, description: &str) -> ExtractedFields {
        ExtractedFields {
            mod_ids: collect_candidates(&self.mod_id, description),
            map_folders: collect_candidates(&self.map_folder, description),
        }
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(&Patterns::default()).expect("default patterns compile")
    }
}

fn compile(field: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        field,
        reason: e.to_string(),
    })?;

    // Group 0 is the whole match
    if regex.captures_len() < 2 {
        return Err(ConfigError::InvalidPattern {
            field,
            reason: "pattern needs a capture group for the value".to_string(),
        });
    }

    Ok(regex)
}

fn collect_candidates(regex: &Regex, description: &str) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();

    for caps in regex.captures_iter(description) {
        let Some(value) = caps.get(1) else {
            continue;
        };
        // `a;b` lists two values, the way the server's `Mods=` line does
        for part in value.as_str().split(VALUE_SEPARATOR) {
            let cleaned = clean_value(part);
            if !cleaned.is_empty() && !candidates.contains(&cleaned) {
                candidates.push(cleaned);
            }
        }
    }

    candidates
}

fn clean_value(raw: &str) -> String {
    let mut value = raw.to_string();
    for token in STRIP_TOKENS {
        value = value.replace(token, "");
    }
    value.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(description: &str) -> ExtractedFields {
        FieldExtractor::default().extract(description)
    }

    #[test]
    fn test_single_mod_and_map() {
        let fields = extract("Mod ID: ExampleMod\nMap Folder: ExampleMap");
        assert_eq!(fields.mod_ids, vec!["ExampleMod"]);
        assert_eq!(fields.map_folders, vec!["ExampleMap"]);
        assert!(!fields.is_ambiguous());
    }

    #[test]
    fn test_multiple_mod_ids_in_order() {
        let fields = extract("Mod ID: Beta\nsome text\nMod ID: Alpha\nMod ID: Beta");
        assert_eq!(fields.mod_ids, vec!["Beta", "Alpha"]);
        assert!(fields.map_folders.is_empty());
        assert!(fields.is_ambiguous());
    }

    #[test]
    fn test_case_insensitive_and_cleanup() {
        let fields = extract("workshop id: 1\r\nMOD ID:   tsarslib [/hr]\r\nmap folder: Bedford Falls\r\n");
        assert_eq!(fields.mod_ids, vec!["tsarslib"]);
        assert_eq!(fields.map_folders, vec!["Bedford Falls"]);
    }

    #[test]
    fn test_semicolon_splits_candidates() {
        let fields = extract("Mod ID: modA;modB; modA\nMap Folder: North;");
        assert_eq!(fields.mod_ids, vec!["modA", "modB"]);
        assert_eq!(fields.map_folders, vec!["North"]);
    }

    #[test]
    fn test_no_candidates() {
        let fields = extract("A great mod with no ids at all.");
        assert_eq!(fields, ExtractedFields::default());
    }

    #[test]
    fn test_empty_value_dropped() {
        // Value is only BBCode
        let fields = extract("Mod ID: [/hr]");
        assert!(fields.mod_ids.is_empty());
    }

    #[test]
    fn test_custom_patterns() {
        let patterns = Patterns {
            mod_id: r"(?m)^ModID=(\S+)".to_string(),
            map_folder: r"Map:\s*(\w+)".to_string(),
        };
        let extractor = FieldExtractor::new(&patterns).unwrap();
        let fields = extractor.extract("ModID=first\nModID=second\nMap: Town");
        assert_eq!(fields.mod_ids, vec!["first", "second"]);
        assert_eq!(fields.map_folders, vec!["Town"]);
    }

    #[test]
    fn test_invalid_patterns() {
        let bad_regex = Patterns {
            mod_id: "(unclosed".to_string(),
            ..Patterns::default()
        };
        let err = FieldExtractor::new(&bad_regex).unwrap_err();
        assert!(err.to_string().contains("mod_id"));

        let no_group = Patterns {
            map_folder: "Map Folder:.*".to_string(),
            ..Patterns::default()
        };
        let err = FieldExtractor::new(&no_group).unwrap_err();
        assert!(err.to_string().contains("capture group"));
    }
}
