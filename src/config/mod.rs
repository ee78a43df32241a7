pub mod settings;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::catalog::DEFAULT_CATEGORIES;
use crate::core::{ContentMatcherRegistry, ExtensionCatalog, SearchEngine};

/// A named group of extensions as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryConfig {
    pub name: String,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Directory searched when none is chosen explicitly.
    pub search_directory: Option<PathBuf>,
    pub categories: Vec<CategoryConfig>,
    /// Quiet period before a keystroke-triggered search starts.
    pub debounce_ms: u64,
    /// Files larger than this are never content-searched.
    pub max_content_file_size_mb: u64,
    pub follow_links: bool,
    pub preview_max_lines: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        settings::load_config(None)
    }

    /// A fresh catalog with every extension enabled.
    pub fn catalog(&self) -> ExtensionCatalog {
        ExtensionCatalog::new(
            self.categories
                .iter()
                .map(|c| (c.name.as_str(), c.extensions.iter())),
        )
    }

    pub fn search_engine(&self) -> SearchEngine {
        let registry = ContentMatcherRegistry::with_defaults()
            .with_max_file_size(self.max_content_file_size_mb.saturating_mul(1024 * 1024));
        SearchEngine::new(registry, self.follow_links)
    }

    /// The configured directory, else `~/Documents`, else the home directory.
    pub fn default_search_directory(&self) -> PathBuf {
        self.search_directory
            .clone()
            .or_else(dirs::document_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let categories = DEFAULT_CATEGORIES
            .iter()
            .map(|(name, extensions)| CategoryConfig {
                name: name.to_string(),
                extensions: extensions.iter().map(|e| e.to_string()).collect(),
            })
            .collect();

        Self {
            search_directory: None,
            categories,
            debounce_ms: 250,
            max_content_file_size_mb: 50,
            follow_links: false,
            preview_max_lines: 500,
        }
    }
}
