//! Fixture file handling
//!
//! The replay command reads three JSON files:
//! - a page (`PageSpec`): viewport plus the body's element tree
//! - a configuration object, injected as the page's data island
//! - a script of environment steps

use anyhow::{Context, Result};
use masthead_dom::{el, ElementId, MemoryDocument, PageSpec};
use masthead_engine::config::CONFIG_ISLAND_ID;
use masthead_engine::Script;
use std::fs;
use std::path::Path;

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Load a page fixture and build the document
pub fn load_page(path: &Path) -> Result<MemoryDocument> {
    let content = read(path)?;
    let page: PageSpec = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse page fixture {}", path.display()))?;
    Ok(MemoryDocument::from_page(&page))
}

/// Load a configuration file as raw JSON
///
/// The value is not validated here; the engine decodes it leniently.
pub fn load_config(path: &Path) -> Result<serde_json::Value> {
    let content = read(path)?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse configuration {}", path.display()))
}

pub fn load_script(path: &Path) -> Result<Script> {
    let content = read(path)?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse script {}", path.display()))
}

/// Embed the configuration as the `#bsh-config` data island
pub fn inject_config(doc: &mut MemoryDocument, config: &serde_json::Value) -> ElementId {
    doc.append_to_body(
        el("script")
            .id(CONFIG_ISLAND_ID)
            .attr("type", "application/json")
            .text(config.to_string()),
    )
}
