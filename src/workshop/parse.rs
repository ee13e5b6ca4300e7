//! Parse Steam Workshop collection pages.
//!
//! A collection page lists each item as:
//!
//! ```html
//! <div class="collectionItem" id="sharedfile_2392709985">
//!   <a href="https://steamcommunity.com/sharedfiles/filedetails/?id=2392709985">
//!     <div class="workshopItemTitle">Title</div>
//!   </a>
//!   <div class="workshopItemShortDesc">Mod ID: Foo<br>Map Folder: Bar</div>
//! </div>
//! ```
//!
//! Steam can change this markup at any time. An unrecognized page produces an
//! empty list rather than an error.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::fetch::parse_collection_id;
use super::types::CollectionEntry;

const ITEM_SELECTOR: &str = "div.collectionItem";
const TITLE_SELECTOR: &str = ".workshopItemTitle";
const DESCRIPTION_SELECTOR: &str = ".workshopItemShortDesc";
const LINK_SELECTOR: &str = "a[href*=\"id=\"]";

/// Elements that start a new line when flattened to text
const BLOCK_ELEMENTS: &[&str] = &["p", "div", "li", "tr", "h1", "h2", "h3", "h4"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Extract the listed items from a collection page, in page order.
pub fn parse_collection_page(html: &str) -> Vec<CollectionEntry> {
    let document = Html::parse_document(html);
    let item_selector = selector(ITEM_SELECTOR);
    let title_selector = selector(TITLE_SELECTOR);
    let description_selector = selector(DESCRIPTION_SELECTOR);
    let link_selector = selector(LINK_SELECTOR);

    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for item in document.select(&item_selector) {
        let Some(workshop_id) = item_workshop_id(&item, &link_selector) else {
            debug!("Skipping collection item without a workshop id");
            continue;
        };

        if !seen.insert(workshop_id.clone()) {
            debug!("Skipping repeated item {}", workshop_id);
            continue;
        }

        let title = item
            .select(&title_selector)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let raw_description = item
            .select(&description_selector)
            .next()
            .map(|e| flatten_text(&e))
            .unwrap_or_default();

        entries.push(CollectionEntry {
            workshop_id,
            title,
            raw_description,
        });
    }

    debug!("Parsed {} collection items", entries.len());
    entries
}

/// `sharedfile_<id>` on the item, else the id in its first item link.
fn item_workshop_id(item: &ElementRef<'_>, link_selector: &Selector) -> Option<String> {
    if let Some(id) = item
        .value()
        .id()
        .and_then(|id| id.strip_prefix("sharedfile_"))
        .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
    {
        return Some(id.to_string());
    }

    item.select(link_selector)
        .filter_map(|a| a.value().attr("href"))
        .find_map(parse_collection_id)
}

/// Text content with `<br>` and block boundaries turned into newlines.
fn flatten_text(element: &ElementRef<'_>) -> String {
    let mut out = String::new();

    for node in element.descendants().skip(1) {
        if let Some(text) = node.value().as_text() {
            out.push_str(text);
        } else if let Some(el) = node.value().as_element() {
            let name = el.name();
            if name == "br" || (BLOCK_ELEMENTS.contains(&name) && !out.is_empty() && !out.ends_with('\n')) {
                out.push('\n');
            }
        }
    }

    out.trim().to_string()
}
