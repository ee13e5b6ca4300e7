//! Steam Web API source.
//!
//! The collection page only carries a truncated description per item. The
//! `ISteamRemoteStorage` endpoints return the full BBCode description, at the
//! cost of one extra request per 100 items. No API key is needed.

use std::time::Duration;

use anyhow::Result;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use super::fetch::{build_client, FetchError};
use super::types::CollectionEntry;

/// Base URL for the remote storage interface.
pub const DEFAULT_API_URL: &str = "https://api.steampowered.com/ISteamRemoteStorage/";

/// `GetPublishedFileDetails` accepts at most this many ids per call
const BATCH_SIZE: usize = 100;

/// Pause between detail batches
const BATCH_DELAY: Duration = Duration::from_millis(500);

/// Children with this file type are items; others are nested collections
const FILETYPE_ITEM: i32 = 0;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: T,
}

#[derive(Debug, Deserialize)]
struct CollectionDetailsResponse {
    #[serde(default)]
    collectiondetails: Vec<CollectionDetails>,
}

#[derive(Debug, Deserialize)]
struct CollectionDetails {
    #[serde(default)]
    children: Vec<CollectionChild>,
}

#[derive(Debug, Deserialize)]
struct CollectionChild {
    publishedfileid: String,
    #[serde(default)]
    filetype: i32,
}

#[derive(Debug, Deserialize)]
struct FileDetailsResponse {
    publishedfiledetails: Vec<FileDetails>,
}

#[derive(Debug, Deserialize)]
struct FileDetails {
    publishedfileid: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

/// Client for the two remote storage calls.
pub struct SteamApi {
    client: Client,
    base_url: String,
    batch_delay: Duration,
}

impl SteamApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into(),
            batch_delay: BATCH_DELAY,
        })
    }

    /// Override the pause between detail batches.
    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    /// Item ids of a collection, in collection order. Nested collections are skipped.
    pub fn collection_children(&self, collection_id: &str) -> Result<Vec<String>, FetchError> {
        let url = format!("{}GetCollectionDetails/v1/", self.base_url);
        let form = vec![
            ("collectioncount".to_string(), "1".to_string()),
            ("publishedfileids[0]".to_string(), collection_id.to_string()),
        ];

        let response: Envelope<CollectionDetailsResponse> = self.post_form(&url, &form)?;
        let details = response
            .response
            .collectiondetails
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::Malformed {
                url: url.clone(),
                reason: "no collection details in response".to_string(),
            })?;

        let ids: Vec<String> = details
            .children
            .into_iter()
            .filter(|child| child.filetype == FILETYPE_ITEM)
            .map(|child| child.publishedfileid)
            .collect();

        info!("Collection {} lists {} items", collection_id, ids.len());
        Ok(ids)
    }

    /// Title and description for each id, fetched in batches.
    pub fn file_details(&self, ids: &[String]) -> Result<Vec<CollectionEntry>, FetchError> {
        let url = format!("{}GetPublishedFileDetails/v1/", self.base_url);
        let mut entries = Vec::with_capacity(ids.len());

        for (batch_index, batch) in ids.chunks(BATCH_SIZE).enumerate() {
            if batch_index > 0 && !self.batch_delay.is_zero() {
                std::thread::sleep(self.batch_delay);
            }

            let mut form = vec![("itemcount".to_string(), batch.len().to_string())];
            for (i, id) in batch.iter().enumerate() {
                form.push((format!("publishedfileids[{}]", i), id.clone()));
            }

            debug!("Requesting details for {} items", batch.len());
            let response: Envelope<FileDetailsResponse> = self.post_form(&url, &form)?;

            entries.extend(response.response.publishedfiledetails.into_iter().map(|file| {
                CollectionEntry {
                    workshop_id: file.publishedfileid,
                    title: file.title,
                    raw_description: file.description,
                }
            }));
        }

        Ok(entries)
    }

    /// Collection children followed by their details.
    pub fn collection_entries(&self, collection_id: &str) -> Result<Vec<CollectionEntry>, FetchError> {
        let ids = self.collection_children(collection_id)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.file_details(&ids)
    }

    fn post_form<T: DeserializeOwned>(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<T, FetchError> {
        let body = serde_urlencoded::to_string(form).map_err(|e| FetchError::Malformed {
            url: url.to_string(),
            reason: format!("could not encode form: {}", e),
        })?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let text = response.text().map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|e| FetchError::Malformed {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
