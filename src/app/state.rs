//! Defines the session state owned by the UI layer.

use crate::config::AppConfig;
use crate::core::{
    normalize_extension, CoreError, DirectoryScanner, ExtensionCatalog, SearchConfig,
    SearchEngine, SearchType, ALL_CATEGORY,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Holds everything the user can change between searches.
///
/// This struct is wrapped in an `Arc<Mutex<...>>` so the input handlers and
/// the background search task can share it. Searches never read it while
/// running; they work on a [`snapshot`](Self::snapshot).
pub struct SearchSession {
    /// The application's configuration settings.
    pub config: AppConfig,
    /// The category table with the user's current toggles.
    pub catalog: ExtensionCatalog,
    /// Root of the next search.
    pub search_directory: PathBuf,
    pub search_type: SearchType,
    /// Currently selected category, or `All`.
    pub selected_category: String,
    /// Raw text of the search box.
    pub search_term: String,
    /// Shared engine built from the configuration.
    pub engine: Arc<SearchEngine>,
    /// Incremented for every started search; stale results are dropped.
    pub generation: u64,
    /// A handle to the currently running search task, allowing it to be aborted.
    pub search_task: Option<JoinHandle<()>>,
    /// A flag used to signal cancellation to the running search.
    pub search_cancellation_flag: Arc<AtomicBool>,
}

impl SearchSession {
    pub fn new(config: AppConfig) -> Self {
        Self {
            catalog: config.catalog(),
            search_directory: config.default_search_directory(),
            engine: Arc::new(config.search_engine()),
            config,
            search_type: SearchType::File,
            selected_category: ALL_CATEGORY.to_string(),
            search_term: String::new(),
            generation: 0,
            search_task: None,
            search_cancellation_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Changes the search root. Non-directories are rejected and the previous
    /// root is kept.
    pub fn set_directory(&mut self, path: impl Into<PathBuf>) -> Result<(), CoreError> {
        let path = path.into();
        DirectoryScanner::ensure_readable(&path)?;
        tracing::info!("Search directory set to {}", path.display());
        self.search_directory = path;
        Ok(())
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn set_search_type(&mut self, search_type: SearchType) {
        self.search_type = search_type;
    }

    pub fn select_category(&mut self, category: &str) -> Result<(), CoreError> {
        if !self.catalog.has_category(category) {
            return Err(CoreError::UnknownCategory(category.to_string()));
        }
        self.selected_category = category.to_string();
        Ok(())
    }

    /// Toggles one extension. Under `All` the extension is toggled in every
    /// category that lists it.
    pub fn toggle_extension(
        &mut self,
        category: &str,
        extension: &str,
        enabled: bool,
    ) -> Result<(), CoreError> {
        if category != ALL_CATEGORY {
            return self.catalog.toggle(category, extension, enabled);
        }

        let extension = normalize_extension(extension);
        let owners: Vec<String> = self
            .catalog
            .categories()
            .into_iter()
            .filter(|name| {
                self.catalog
                    .extensions_of(name)
                    .is_ok_and(|exts| exts.contains(&extension))
            })
            .map(str::to_string)
            .collect();
        if owners.is_empty() {
            return Err(CoreError::InvalidExtension {
                category: category.to_string(),
                extension,
            });
        }
        for owner in &owners {
            self.catalog.toggle(owner, &extension, enabled)?;
        }
        Ok(())
    }

    /// Clears the term and every filter; the search directory is kept.
    pub fn reset_filters(&mut self) {
        self.search_term.clear();
        self.search_type = SearchType::File;
        self.selected_category = ALL_CATEGORY.to_string();
        self.catalog.reset();
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::new(self.search_directory.clone())
            .with_search_type(self.search_type)
            .with_term(self.search_term.trim())
            .with_category(self.selected_category.clone())
    }

    /// Immutable copies of the search input, taken when a search starts.
    pub fn snapshot(&self) -> (SearchConfig, ExtensionCatalog) {
        (self.search_config(), self.catalog.clone())
    }

    /// Cancels the in-flight search, if any.
    pub fn cancel_current_search(&mut self) {
        self.search_cancellation_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.search_task.take() {
            handle.abort();
        }
    }
}

impl Default for SearchSession {
    /// Creates a session from the configuration on disk.
    fn default() -> Self {
        Self::new(AppConfig::load().unwrap_or_default())
    }
}
