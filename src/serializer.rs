//! Serialization of application documents to YAML or JSON.
//!
//! Element and attribute names follow the WADL vocabulary (`resource`, `method`, `param`,
//! `mediaType`, ...); type tags are written in their `prefix:local` form.

use crate::wadl_builder::Application;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes an application document to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &Application) -> Result<String> {
    debug!("Serializing application document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize application document to YAML")
}

/// Serializes an application document to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(doc: &Application) -> Result<String> {
    debug!("Serializing application document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize application document to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
