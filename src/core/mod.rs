pub mod catalog;
pub mod content;
pub mod error;
pub mod filter;
pub mod opener;
pub mod preview;
pub mod scanner;
pub mod search;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whether a search matches file names or subdirectory names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    File,
    Directory,
}

/// Immutable input of a single search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub root_directory: PathBuf,
    pub search_type: SearchType,
    /// Empty (or whitespace only) lists everything that passes the filter.
    pub search_term: String,
    /// Category whose enabled extensions restrict file matches, or `All`.
    pub category: String,
}

impl SearchConfig {
    pub fn new(root_directory: impl Into<PathBuf>) -> Self {
        Self {
            root_directory: root_directory.into(),
            search_type: SearchType::File,
            search_term: String::new(),
            category: catalog::ALL_CATEGORY.to_string(),
        }
    }

    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// The lower-cased, trimmed term; empty means list-all mode.
    pub fn normalized_term(&self) -> String {
        self.search_term.trim().to_lowercase()
    }
}

/// Priority bucket of a match. `Partial` and `Content` share a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchTier {
    Exact,
    Partial,
    Content,
}

impl MatchTier {
    pub fn rank(self) -> u8 {
        match self {
            MatchTier::Exact => 0,
            MatchTier::Partial | MatchTier::Content => 1,
        }
    }
}

/// One search hit. Lives only for the duration of one search and render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// Base name with its original case.
    pub name: String,
    pub full_path: PathBuf,
    pub tier: MatchTier,
}

pub use catalog::{normalize_extension, ExtensionCatalog, ALL_CATEGORY};
pub use content::{ContentMatcher, ContentMatcherRegistry};
pub use error::CoreError;
pub use filter::FilterResolver;
pub use preview::{Preview, PreviewProducer, PreviewRegistry};
pub use scanner::{DirectoryScanner, ScanEntry};
pub use search::SearchEngine;
