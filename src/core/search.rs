//! The search-and-filter engine: one walk, tiered classification, a
//! deterministic sort.

use rayon::prelude::*;
use regex::Regex;
use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use super::{
    ContentMatcherRegistry, CoreError, DirectoryScanner, ExtensionCatalog, FilterResolver,
    MatchRecord, MatchTier, ScanEntry, SearchConfig, SearchType,
};

/// Runs searches against the file system.
///
/// The engine keeps no state between calls: every run walks the tree again
/// and returns a fresh list.
pub struct SearchEngine {
    scanner: DirectoryScanner,
    content: ContentMatcherRegistry,
}

impl SearchEngine {
    pub fn new(content: ContentMatcherRegistry, follow_links: bool) -> Self {
        Self {
            scanner: DirectoryScanner::new(follow_links),
            content,
        }
    }

    /// Runs a search to completion.
    pub fn run(
        &self,
        config: &SearchConfig,
        catalog: &ExtensionCatalog,
    ) -> Result<Vec<MatchRecord>, CoreError> {
        self.run_with_cancel(config, catalog, &AtomicBool::new(false))
    }

    /// Runs a search that stops with `Cancelled` once `cancel_flag` is raised.
    ///
    /// The flag is checked at each directory entry and before each content
    /// read.
    pub fn run_with_cancel(
        &self,
        config: &SearchConfig,
        catalog: &ExtensionCatalog,
        cancel_flag: &AtomicBool,
    ) -> Result<Vec<MatchRecord>, CoreError> {
        if config.root_directory.as_os_str().is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let term = config.normalized_term();
        let extensions = FilterResolver::resolve(config.search_type, &config.category, catalog);
        let any_extension =
            FilterResolver::matches_any_extension(config.search_type, &config.category, catalog);

        tracing::info!(
            "Searching {} for {:?} (type {:?}, category {}, {} extensions)",
            config.root_directory.display(),
            term,
            config.search_type,
            config.category,
            extensions.len()
        );

        let entries = self
            .scanner
            .scan(&config.root_directory, config.search_type, cancel_flag)?;

        let mut records = match config.search_type {
            SearchType::Directory => Self::classify_directories(entries, &term)?,
            SearchType::File => {
                let candidates: Vec<ScanEntry> = entries
                    .into_iter()
                    .filter(|entry| {
                        any_extension
                            || FilterResolver::name_matches(&entry.name.to_lowercase(), &extensions)
                    })
                    .collect();
                self.classify_files(candidates, &term, cancel_flag)?
            }
        };

        sort_records(&mut records);

        tracing::info!(
            "Search finished in {:?}: {} results",
            start.elapsed(),
            records.len()
        );
        Ok(records)
    }

    fn classify_directories(
        entries: Vec<ScanEntry>,
        term: &str,
    ) -> Result<Vec<MatchRecord>, CoreError> {
        let pattern = literal_pattern(term)?;
        Ok(entries
            .into_iter()
            .filter(|entry| term.is_empty() || pattern.is_match(&entry.name.to_lowercase()))
            .map(|entry| MatchRecord {
                name: entry.name,
                full_path: entry.path,
                tier: MatchTier::Partial,
            })
            .collect())
    }

    /// Name checks come first; the content reader only runs for files whose
    /// name matched neither exactly nor partially.
    fn classify_files(
        &self,
        candidates: Vec<ScanEntry>,
        term: &str,
        cancel_flag: &AtomicBool,
    ) -> Result<Vec<MatchRecord>, CoreError> {
        if term.is_empty() {
            return Ok(candidates
                .into_iter()
                .map(|entry| MatchRecord {
                    name: entry.name,
                    full_path: entry.path,
                    tier: MatchTier::Partial,
                })
                .collect());
        }

        let pattern = literal_pattern(term)?;
        let records: Vec<MatchRecord> = candidates
            .into_par_iter()
            .filter_map(|entry| {
                let name_lower = entry.name.to_lowercase();
                let tier = if name_lower == term {
                    MatchTier::Exact
                } else if pattern.is_match(&name_lower) {
                    MatchTier::Partial
                } else if cancel_flag.load(Ordering::Relaxed) {
                    return None;
                } else if self.content.check(&entry.path, &name_lower, term) {
                    MatchTier::Content
                } else {
                    return None;
                };

                tracing::debug!("{} matched as {:?}", entry.path.display(), tier);
                Some(MatchRecord {
                    name: entry.name,
                    full_path: entry.path,
                    tier,
                })
            })
            .collect();

        if cancel_flag.load(Ordering::Relaxed) {
            return Err(CoreError::Cancelled);
        }
        Ok(records)
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(ContentMatcherRegistry::with_defaults(), false)
    }
}

/// A regex matching `term` literally; metacharacters in the term are escaped.
fn literal_pattern(term: &str) -> Result<Regex, CoreError> {
    Ok(Regex::new(&regex::escape(term))?)
}

/// Orders records by `(tier rank, lower-cased name)`, then by full path so
/// identical names in different folders still come out in a fixed order.
pub fn sort_records(records: &mut [MatchRecord]) {
    records.sort_by(compare_records);
}

fn compare_records(a: &MatchRecord, b: &MatchRecord) -> CmpOrdering {
    a.tier
        .rank()
        .cmp(&b.tier.rank())
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.full_path.cmp(&b.full_path))
}
