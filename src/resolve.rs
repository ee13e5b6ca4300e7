//! Disambiguation of Mod ID / Map Folder candidates.
//!
//! A single candidate is taken as-is. Several candidates go to a [`Resolver`],
//! which is the only place the pipeline can block on the user.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use crate::workshop::{CollectionEntry, ExtractedFields, FieldKind, ResolvedEntry};

/// Picks between candidates and answers yes/no questions.
pub trait Resolver {
    /// Return the value to use for `field`. `candidates` has at least two items.
    fn choose(
        &mut self,
        entry: &CollectionEntry,
        field: FieldKind,
        candidates: &[String],
    ) -> Result<String>;

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;
}

/// Prompts on a terminal (or any reader/writer pair).
pub struct ConsoleResolver<R, W> {
    input: R,
    output: W,
}

impl ConsoleResolver<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read one trimmed line; `None` on EOF.
    fn read_answer(&mut self) -> Result<Option<String>> {
        self.output.flush()?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> Resolver for ConsoleResolver<R, W> {
    fn choose(
        &mut self,
        entry: &CollectionEntry,
        field: FieldKind,
        candidates: &[String],
    ) -> Result<String> {
        writeln!(self.output, "-----")?;
        writeln!(
            self.output,
            "Multiple {}s found for {}, please make a choice.",
            field,
            entry.display_name()
        )?;
        writeln!(self.output, "Mod link: {}", entry.workshop_url())?;
        for (i, candidate) in candidates.iter().enumerate() {
            writeln!(self.output, "  {}. {}", i + 1, candidate)?;
        }

        loop {
            write!(self.output, "Select a {} [1-{}]: ", field, candidates.len())?;
            let Some(answer) = self.read_answer()? else {
                bail!(
                    "Input closed while choosing a {} for workshop item {}",
                    field,
                    entry.workshop_id
                );
            };

            match answer.parse::<usize>() {
                Ok(n) if (1..=candidates.len()).contains(&n) => {
                    return Ok(candidates[n - 1].clone());
                }
                _ => writeln!(
                    self.output,
                    "Invalid choice, enter a number between 1 and {}.",
                    candidates.len()
                )?,
            }
        }
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };

        loop {
            write!(self.output, "{} {} ", question, hint)?;
            let Some(answer) = self.read_answer()? else {
                bail!("Input closed while waiting for an answer");
            };

            match answer.to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer 'yes' or 'no' (or 'y' / 'n').")?,
            }
        }
    }
}

/// Never prompts: takes the first candidate and the default answer.
#[derive(Debug, Default)]
pub struct FirstCandidate;

impl Resolver for FirstCandidate {
    fn choose(
        &mut self,
        entry: &CollectionEntry,
        field: FieldKind,
        candidates: &[String],
    ) -> Result<String> {
        let Some(first) = candidates.first() else {
            bail!("No {} candidates for workshop item {}", field, entry.workshop_id);
        };
        info!(
            "{}: {} candidates for {}, using '{}'",
            entry.display_name(),
            candidates.len(),
            field,
            first
        );
        Ok(first.clone())
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        debug!("Answering '{}' with default {}", question, default);
        Ok(default)
    }
}

/// A question a [`ScriptedResolver`] was asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceRequest {
    pub workshop_id: String,
    pub field: FieldKind,
    pub candidates: Vec<String>,
}

/// Answers from a fixed script, recording every request.
#[derive(Debug, Default)]
pub struct ScriptedResolver {
    choices: VecDeque<String>,
    confirms: VecDeque<bool>,
    pub asked: Vec<ChoiceRequest>,
    pub questions: Vec<String>,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values returned by successive `choose` calls.
    pub fn with_choices(mut self, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.choices.extend(choices.into_iter().map(Into::into));
        self
    }

    /// Answers returned by successive `confirm` calls.
    pub fn with_confirms(mut self, confirms: impl IntoIterator<Item = bool>) -> Self {
        self.confirms.extend(confirms);
        self
    }
}

impl Resolver for ScriptedResolver {
    fn choose(
        &mut self,
        entry: &CollectionEntry,
        field: FieldKind,
        candidates: &[String],
    ) -> Result<String> {
        self.asked.push(ChoiceRequest {
            workshop_id: entry.workshop_id.clone(),
            field,
            candidates: candidates.to_vec(),
        });
        self.choices
            .pop_front()
            .with_context(|| format!("No scripted {} answer for {}", field, entry.workshop_id))
    }

    fn confirm(&mut self, question: &str, _default: bool) -> Result<bool> {
        self.questions.push(question.to_string());
        self.confirms
            .pop_front()
            .with_context(|| format!("No scripted answer for '{}'", question))
    }
}

/// Turns extracted candidates into final entries.
pub struct Disambiguator<'a, R: Resolver + ?Sized> {
    resolver: &'a mut R,
    prompts: usize,
    missing_mod_ids: usize,
}

impl<'a, R: Resolver + ?Sized> Disambiguator<'a, R> {
    pub fn new(resolver: &'a mut R) -> Self {
        Self {
            resolver,
            prompts: 0,
            missing_mod_ids: 0,
        }
    }

    /// Number of times the resolver was asked to choose.
    pub fn prompts(&self) -> usize {
        self.prompts
    }

    /// Entries written with a blank Mod ID so far.
    pub fn missing_mod_ids(&self) -> usize {
        self.missing_mod_ids
    }

    pub fn resolve(
        &mut self,
        entry: &CollectionEntry,
        fields: &ExtractedFields,
    ) -> Result<ResolvedEntry> {
        if fields.is_ambiguous() {
            debug!(
                "{} needs a choice: mod ids {:?}, map folders {:?}",
                entry.workshop_id, fields.mod_ids, fields.map_folders
            );
        }

        let mod_id = match self.resolve_field(entry, FieldKind::ModId, &fields.mod_ids)? {
            Some(id) => id,
            None => {
                warn!(
                    "No Mod ID found for {} ({}), leaving it blank",
                    entry.display_name(),
                    entry.workshop_url()
                );
                self.missing_mod_ids += 1;
                String::new()
            }
        };

        let map_folder = self.resolve_field(entry, FieldKind::MapFolder, &fields.map_folders)?;
        if map_folder.is_none() {
            debug!("{} has no Map Folder", entry.workshop_id);
        }

        Ok(ResolvedEntry {
            workshop_id: entry.workshop_id.clone(),
            mod_id,
            map_folder,
        })
    }

    fn resolve_field(
        &mut self,
        entry: &CollectionEntry,
        field: FieldKind,
        candidates: &[String],
    ) -> Result<Option<String>> {
        match candidates {
            [] => Ok(None),
            [only] => Ok(Some(only.clone())),
            _ => {
                self.prompts += 1;
                let chosen = self.resolver.choose(entry, field, candidates)?;
                debug!("{} {} chosen: {}", entry.workshop_id, field, chosen);
                Ok(Some(chosen))
            }
        }
    }
}
