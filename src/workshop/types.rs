//! Data types shared by the collection pipeline.

use std::fmt;

/// One item listed in a Workshop collection, as scraped from the page or API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionEntry {
    /// Steam published file id.
    pub workshop_id: String,

    /// Item title (may be empty if the source did not provide one).
    pub title: String,

    /// Free-text description the Mod ID / Map Folder are pulled from.
    pub raw_description: String,
}

impl CollectionEntry {
    pub fn new(
        workshop_id: impl Into<String>,
        title: impl Into<String>,
        raw_description: impl Into<String>,
    ) -> Self {
        Self {
            workshop_id: workshop_id.into(),
            title: title.into(),
            raw_description: raw_description.into(),
        }
    }

    /// Public Workshop page for this item.
    pub fn workshop_url(&self) -> String {
        format!(
            "https://steamcommunity.com/sharedfiles/filedetails/?id={}",
            self.workshop_id
        )
    }

    /// Title if known, otherwise the workshop id.
    pub fn display_name(&self) -> &str {
        if self.title.is_empty() {
            &self.workshop_id
        } else {
            &self.title
        }
    }
}

/// Candidates found in a description.
///
/// Both lists are insertion-ordered sets: no duplicates, first-seen order kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub mod_ids: Vec<String>,
    pub map_folders: Vec<String>,
}

impl ExtractedFields {
    /// True when either field has more than one candidate.
    pub fn is_ambiguous(&self) -> bool {
        self.mod_ids.len() > 1 || self.map_folders.len() > 1
    }
}

/// Final (workshop id, mod id, map folder) triple after disambiguation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub workshop_id: String,

    /// Empty when no Mod ID could be found.
    pub mod_id: String,

    /// `None` for items that are not maps.
    pub map_folder: Option<String>,
}

/// Which description field is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    ModId,
    MapFolder,
}

impl FieldKind {
    pub fn label(self) -> &'static str {
        match self {
            FieldKind::ModId => "Mod ID",
            FieldKind::MapFolder => "Map Folder",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
