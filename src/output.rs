//! Mod list output.
//!
//! Two formats:
//! - `lines` (default): one `workshop_id;mod_id;map_folder` triple per line,
//!   readable back with [`parse_lines`]
//! - `ini`: the three keys a Project Zomboid style `servertest.ini` takes
//!   (`WorkshopItems=`, `Mods=`, `Map=`), values joined by `;`

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::workshop::ResolvedEntry;

/// Separator used inside a line and between values of an INI key.
const SEPARATOR: &str = ";";

/// Output file layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Lines,
    Ini,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ini" => Ok(OutputFormat::Ini),
            "lines" => Ok(OutputFormat::Lines),
            other => Err(format!("unknown format '{}' (expected ini or lines)", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Ini => f.write_str("ini"),
            OutputFormat::Lines => f.write_str("lines"),
        }
    }
}

/// Render one triple per line. Fails if a value would break the line layout.
pub fn render_lines(entries: &[ResolvedEntry]) -> Result<String> {
    let mut out = String::new();

    for entry in entries {
        let map_folder = entry.map_folder.as_deref().unwrap_or("");
        for value in [entry.workshop_id.as_str(), entry.mod_id.as_str(), map_folder] {
            if value.contains(SEPARATOR) || value.contains('\n') || value.contains('\r') {
                bail!(
                    "Value {:?} of workshop item {} cannot be written: it contains a separator",
                    value,
                    entry.workshop_id
                );
            }
        }

        out.push_str(&entry.workshop_id);
        out.push_str(SEPARATOR);
        out.push_str(&entry.mod_id);
        out.push_str(SEPARATOR);
        out.push_str(map_folder);
        out.push('\n');
    }

    Ok(out)
}

/// Read back the output of [`render_lines`]. Blank lines are ignored.
pub fn parse_lines(text: &str) -> Result<Vec<ResolvedEntry>> {
    let mut entries = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = line.split(SEPARATOR);
        let (Some(workshop_id), Some(mod_id), Some(map_folder), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            bail!("Line {}: expected 3 fields separated by '{}'", line_no + 1, SEPARATOR);
        };

        if workshop_id.is_empty() {
            bail!("Line {}: empty workshop id", line_no + 1);
        }

        entries.push(ResolvedEntry {
            workshop_id: workshop_id.to_string(),
            mod_id: mod_id.to_string(),
            map_folder: (!map_folder.is_empty()).then(|| map_folder.to_string()),
        });
    }

    Ok(entries)
}

/// Render the `WorkshopItems=` / `Mods=` / `Map=` block.
///
/// Blank mod ids are left out. `extra_maps` are appended after the items' map
/// folders. Repeated values are written once.
pub fn render_ini(entries: &[ResolvedEntry], extra_maps: &[String]) -> String {
    let workshop_items = join_unique(entries.iter().map(|e| e.workshop_id.as_str()));
    let mods = join_unique(
        entries
            .iter()
            .map(|e| e.mod_id.as_str())
            .filter(|id| !id.is_empty()),
    );
    let maps = join_unique(
        entries
            .iter()
            .filter_map(|e| e.map_folder.as_deref())
            .chain(extra_maps.iter().map(String::as_str)),
    );

    format!("WorkshopItems={}\nMods={}\nMap={}\n", workshop_items, mods, maps)
}

fn join_unique<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Write entries to `path`, replacing any existing file.
pub fn write_output(
    path: &Path,
    format: OutputFormat,
    entries: &[ResolvedEntry],
    extra_maps: &[String],
) -> Result<()> {
    let content = match format {
        OutputFormat::Ini => render_ini(entries, extra_maps),
        OutputFormat::Lines => render_lines(entries)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;

    info!("Wrote {} entries to {} ({})", entries.len(), path.display(), format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(workshop_id: &str, mod_id: &str, map_folder: Option<&str>) -> ResolvedEntry {
        ResolvedEntry {
            workshop_id: workshop_id.to_string(),
            mod_id: mod_id.to_string(),
            map_folder: map_folder.map(str::to_string),
        }
    }

    #[test]
    fn test_lines_round_trip() {
        let entries = vec![
            entry("2392709985", "ExampleMod", Some("ExampleMap")),
            entry("2169435993", "Hydrocraft", None),
            entry("1111", "", None),
            entry("2222", "", Some("Riverside, KY")),
        ];
        let text = render_lines(&entries).unwrap();
        assert_eq!(
            text,
            "2392709985;ExampleMod;ExampleMap\n2169435993;Hydrocraft;\n1111;;\n2222;;Riverside, KY\n"
        );
        assert_eq!(parse_lines(&text).unwrap(), entries);
    }

    #[test]
    fn test_render_lines_rejects_separator() {
        let entries = vec![entry("1", "a;b", None)];
        let err = render_lines(&entries).unwrap_err();
        assert!(err.to_string().contains("separator"));
    }

    #[test]
    fn test_parse_lines_errors() {
        assert!(parse_lines("1;2\n").is_err());
        assert!(parse_lines("1;2;3;4\n").is_err());
        assert!(parse_lines(";mod;\n").is_err());
        assert!(parse_lines("\n\n").unwrap().is_empty());
        assert_eq!(parse_lines("1;a;\r\n").unwrap(), vec![entry("1", "a", None)]);
    }

    #[test]
    fn test_render_ini() {
        let entries = vec![
            entry("100", "ModA", None),
            entry("200", "", Some("MapB")),
            entry("300", "ModA", Some("MapC")),
        ];
        let text = render_ini(&entries, &["Muldraugh, KY".to_string()]);
        assert_eq!(
            text,
            "WorkshopItems=100;200;300\nMods=ModA\nMap=MapB;MapC;Muldraugh, KY\n"
        );
    }

    #[test]
    fn test_render_ini_empty() {
        assert_eq!(render_ini(&[], &[]), "WorkshopItems=\nMods=\nMap=\n");
    }

    #[test]
    fn test_write_output_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.txt");

        write_output(&path, OutputFormat::Lines, &[entry("1", "old", None)], &[]).unwrap();
        write_output(&path, OutputFormat::Lines, &[entry("2", "new", None)], &[]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "2;new;\n");
    }

    #[test]
    fn test_default_format_is_lines() {
        assert_eq!(OutputFormat::default(), OutputFormat::Lines);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("INI".parse::<OutputFormat>().unwrap(), OutputFormat::Ini);
        assert_eq!("lines".parse::<OutputFormat>().unwrap(), OutputFormat::Lines);
        assert!("csv".parse::<OutputFormat>().is_err());
    }
}
