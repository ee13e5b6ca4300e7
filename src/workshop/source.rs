//! Where collection entries come from.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::Deserialize;

use super::api::SteamApi;
use super::fetch::{FetchError, Fetcher};
use super::parse::parse_collection_page;
use super::types::CollectionEntry;

/// Produces the entries of one collection.
pub trait CollectionSource {
    fn entries(&self, collection_id: &str) -> Result<Vec<CollectionEntry>, FetchError>;
}

/// Which source implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Scrape the public collection page.
    #[default]
    Page,
    /// Query the Steam Web API.
    Api,
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "page" => Ok(SourceKind::Page),
            "api" => Ok(SourceKind::Api),
            other => Err(format!("unknown source '{}' (expected page or api)", other)),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Page => f.write_str("page"),
            SourceKind::Api => f.write_str("api"),
        }
    }
}

/// Collection page scraping: one GET, then HTML parsing.
pub struct PageSource {
    fetcher: Fetcher,
}

impl PageSource {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }
}

impl CollectionSource for PageSource {
    fn entries(&self, collection_id: &str) -> Result<Vec<CollectionEntry>, FetchError> {
        let html = self.fetcher.fetch_page(collection_id)?;
        Ok(parse_collection_page(&html))
    }
}

/// Steam Web API lookups.
pub struct ApiSource {
    api: SteamApi,
}

impl ApiSource {
    pub fn new(api: SteamApi) -> Self {
        Self { api }
    }
}

impl CollectionSource for ApiSource {
    fn entries(&self, collection_id: &str) -> Result<Vec<CollectionEntry>, FetchError> {
        self.api.collection_entries(collection_id)
    }
}

/// Build the source selected by `kind`.
pub fn build_source(
    kind: SourceKind,
    base_url: &str,
    api_url: &str,
) -> Result<Box<dyn CollectionSource>> {
    Ok(match kind {
        SourceKind::Page => Box::new(PageSource::new(Fetcher::new(base_url)?)),
        SourceKind::Api => Box::new(ApiSource::new(SteamApi::new(api_url)?)),
    })
}
