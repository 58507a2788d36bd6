//! Loading a Rust project's source files for route discovery.
//!
//! [`ProjectSources::load`] walks a project directory, parses every `.rs` file into a `syn`
//! syntax tree and remembers the module path each file declares, which route discovery uses as
//! the owning group of the handlers found in it. Files that cannot be read or parsed are
//! reported as warnings and skipped so a single broken file does not prevent generation.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Module path used for crate roots (`main.rs`, `lib.rs`)
pub const CRATE_MODULE: &str = "crate";

/// One parsed source file
#[derive(Debug)]
pub struct SourceFile {
    /// Path to the file on disk
    pub path: PathBuf,
    /// Module path of the file, e.g. `handlers::users`
    pub module: String,
    /// The parsed syntax tree
    pub syntax_tree: syn::File,
}

impl SourceFile {
    /// Parse `content` as the source of `module`
    pub fn parse(path: PathBuf, module: impl Into<String>, content: &str) -> crate::error::Result<Self> {
        let syntax_tree = syn::parse_file(content).map_err(|e| crate::error::Error::ParseError {
            file: path.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            path,
            module: module.into(),
            syntax_tree,
        })
    }
}

/// All parsed source files of a project
#[derive(Debug, Default)]
pub struct ProjectSources {
    pub files: Vec<SourceFile>,
    /// Files or directories that were skipped, with the reason
    pub warnings: Vec<String>,
}

impl ProjectSources {
    pub fn from_files(files: Vec<SourceFile>) -> Self {
        Self {
            files,
            warnings: Vec::new(),
        }
    }

    /// Walk `root` and parse every `.rs` file below it, skipping `target` and hidden directories.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` itself cannot be read.
    pub fn load(root: &Path) -> Result<Self> {
        fs::read_dir(root)
            .with_context(|| format!("Failed to read project directory: {}", root.display()))?;

        let mut sources = Self::default();

        let walker = WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(|e| {
            if e.path() == root {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && name != "target"
        });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    sources.warn(format!("Failed to access path: {}", e));
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().and_then(|s| s.to_str()) != Some("rs") {
                continue;
            }

            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    sources.warn(format!("Failed to read {}: {}", path.display(), e));
                    continue;
                }
            };

            match SourceFile::parse(path.to_path_buf(), module_path(root, path), &content) {
                Ok(file) => {
                    debug!("Parsed {} as module {}", path.display(), file.module);
                    sources.files.push(file);
                }
                Err(e) => sources.warn(e.to_string()),
            }
        }

        debug!(
            "Loaded {} source files ({} skipped)",
            sources.files.len(),
            sources.warnings.len()
        );
        Ok(sources)
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Module path of `file` relative to the project `root`.
///
/// `src/handlers/users.rs` becomes `handlers::users`, `src/handlers/mod.rs` becomes `handlers`
/// and crate roots become [`CRATE_MODULE`].
pub fn module_path(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file).with_extension("");

    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.first().map(String::as_str) == Some("src") {
        segments.remove(0);
    }
    if matches!(segments.last().map(String::as_str), Some("mod" | "lib" | "main")) {
        segments.pop();
    }

    if segments.is_empty() {
        CRATE_MODULE.to_string()
    } else {
        segments.join("::")
    }
}
