//! Steam Workshop collection access.
//!
//! Two ways to list a collection's items:
//! - [`PageSource`]: scrape the public collection page (one GET)
//! - [`ApiSource`]: query the Steam Web API (full descriptions)
//!
//! Both sit behind [`CollectionSource`] so the pipeline never sees HTML or JSON.

pub mod api;
pub mod fetch;
pub mod parse;
pub mod source;
mod types;

#[cfg(test)]
pub(crate) mod mock_steam;

pub use api::{SteamApi, DEFAULT_API_URL};
pub use fetch::{parse_collection_id, FetchError, Fetcher, DEFAULT_BASE_URL};
pub use parse::parse_collection_page;
pub use source::{build_source, ApiSource, CollectionSource, PageSource, SourceKind};
pub use types::{CollectionEntry, ExtractedFields, FieldKind, ResolvedEntry};
