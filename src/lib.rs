//! workshop-export - Steam Workshop collection exporter
//!
//! Reads a Workshop collection, finds each item's Mod ID and Map Folder in its
//! description, and writes the mod list a dedicated server expects.

pub mod config;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod resolve;
pub mod workshop;
