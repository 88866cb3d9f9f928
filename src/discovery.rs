//! Directory enumerator: one task per numbered source file in a directory.

use crate::error::DiscoveryError;
use crate::pipeline::{Enumerator, Selection, TaskId, TaskReference};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Task selection convention for a directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Directory holding the task files, relative to the workspace
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// File extension that marks a task (without the dot)
    #[serde(default = "default_extension")]
    pub extension: String,

    /// File names that carry the extension but are not tasks
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Whether the walker resolves symbolic links. Links that point at regular
    /// files are listed either way; dangling links never are.
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_extension() -> String {
    "go".to_string()
}

fn default_exclude() -> Vec<String> {
    vec!["validate.go".to_string()]
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            extension: default_extension(),
            exclude: default_exclude(),
            follow_symlinks: false,
        }
    }
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.extension.is_empty() {
            return Err("extension cannot be empty".to_string());
        }
        if self.extension.starts_with('.') {
            return Err(format!(
                "extension '{}' must not start with a dot",
                self.extension
            ));
        }
        Ok(())
    }
}

/// Lists the immediate files of a directory and selects `<number>.<extension>`.
///
/// References are file names relative to the root, so the executor is expected to
/// run inside the root directory.
pub struct DirectoryEnumerator {
    root: PathBuf,
    config: DiscoveryConfig,
}

impl DirectoryEnumerator {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: DiscoveryConfig::default(),
        }
    }

    pub fn with_config(root: PathBuf, config: DiscoveryConfig) -> Self {
        Self { root, config }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Enumerator for DirectoryEnumerator {
    fn list(&self) -> Result<Vec<String>, DiscoveryError> {
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        let mut names = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| DiscoveryError::Unreadable {
                path: self.root.clone(),
                source: e.into(),
            })?;

            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if is_file {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        Ok(names)
    }

    fn select(&self, entry: &str) -> Option<Selection> {
        let path = Path::new(entry);
        if path.extension()?.to_str()? != self.config.extension {
            return None;
        }
        if self.config.exclude.iter().any(|excluded| excluded == entry) {
            return None;
        }

        let stem = path.file_stem()?.to_str()?;
        let Some(id) = stem.parse::<u32>().ok().and_then(TaskId::new) else {
            debug!(entry, "Skipping task file without a positive numeric name");
            return None;
        };

        Some(Selection {
            id: Some(id),
            reference: TaskReference::new(entry),
        })
    }
}
