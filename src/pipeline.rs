//! Runs the stages for every configured collection.
//!
//! All collections are fetched before anything is extracted or asked. A failed
//! fetch ends the run before the first prompt and before the output is touched.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::extract::FieldExtractor;
use crate::output::{write_output, OutputFormat};
use crate::resolve::{Disambiguator, Resolver};
use crate::workshop::{CollectionEntry, CollectionSource, FetchError, ResolvedEntry};

/// Fatal pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{}", describe_fetch_failures(.0))]
    Fetch(Vec<(String, FetchError)>),
}

fn describe_fetch_failures(failures: &[(String, FetchError)]) -> String {
    let details: Vec<String> = failures
        .iter()
        .map(|(id, e)| format!("collection {}: {}", id, e))
        .collect();
    format!(
        "Failed to fetch {} collection(s), no output written: {}",
        failures.len(),
        details.join("; ")
    )
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub collections: usize,
    pub entries: usize,
    pub prompts: usize,
    pub missing_mod_ids: usize,
    pub output_path: PathBuf,
}

/// Wires config, source and resolver together.
pub struct Collector<'a, S: CollectionSource + ?Sized, R: Resolver + ?Sized> {
    config: &'a Config,
    source: &'a S,
    resolver: &'a mut R,
}

impl<'a, S: CollectionSource + ?Sized, R: Resolver + ?Sized> Collector<'a, S, R> {
    pub fn new(config: &'a Config, source: &'a S, resolver: &'a mut R) -> Self {
        Self {
            config,
            source,
            resolver,
        }
    }

    pub fn run(&mut self) -> Result<RunSummary> {
        let extractor = FieldExtractor::new(&self.config.patterns)?;
        let entries = self.collect_entries()?;

        let mut disambiguator = Disambiguator::new(&mut *self.resolver);
        let mut resolved = Vec::with_capacity(entries.len());
        for entry in &entries {
            let fields = extractor.extract(&entry.raw_description);
            debug!(
                "{}: mod ids {:?}, map folders {:?}",
                entry.workshop_id, fields.mod_ids, fields.map_folders
            );
            resolved.push(disambiguator.resolve(entry, &fields)?);
        }
        let prompts = disambiguator.prompts();
        let missing_mod_ids = disambiguator.missing_mod_ids();

        let extra_maps = self.extra_maps(&resolved)?;
        write_output(
            &self.config.output_path,
            self.config.format,
            &resolved,
            &extra_maps,
        )?;

        Ok(RunSummary {
            collections: self.config.collection_ids.len(),
            entries: resolved.len(),
            prompts,
            missing_mod_ids,
            output_path: self.config.output_path.clone(),
        })
    }

    /// Entries of every collection, first occurrence of each workshop id only.
    fn collect_entries(&self) -> Result<Vec<CollectionEntry>, PipelineError> {
        let mut failures = Vec::new();
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for collection_id in &self.config.collection_ids {
            match self.source.entries(collection_id) {
                Ok(items) => {
                    if items.is_empty() {
                        warn!(
                            "Collection {} has no recognizable items (empty collection or changed page layout)",
                            collection_id
                        );
                    } else {
                        info!("Collection {}: {} items", collection_id, items.len());
                    }

                    for item in items {
                        if seen.insert(item.workshop_id.clone()) {
                            entries.push(item);
                        } else {
                            debug!("Workshop item {} already listed, skipping", item.workshop_id);
                        }
                    }
                }
                Err(e) => {
                    error!("Failed to fetch collection {}: {}", collection_id, e);
                    failures.push((collection_id.clone(), e));
                }
            }
        }

        if !failures.is_empty() {
            return Err(PipelineError::Fetch(failures));
        }
        Ok(entries)
    }

    /// The vanilla map, if configured, wanted, and not already listed.
    fn extra_maps(&mut self, resolved: &[ResolvedEntry]) -> Result<Vec<String>> {
        if self.config.format != OutputFormat::Ini {
            return Ok(Vec::new());
        }
        let Some(map) = &self.config.vanilla_map else {
            return Ok(Vec::new());
        };
        if resolved.iter().any(|e| e.map_folder.as_deref() == Some(map.as_str())) {
            return Ok(Vec::new());
        }

        let question = format!(
            "Do you want to add '{}' to the Map Folders? (vanilla map)",
            map
        );
        if self.resolver.confirm(&question, true)? {
            Ok(vec![map.clone()])
        } else {
            Ok(Vec::new())
        }
    }
}
