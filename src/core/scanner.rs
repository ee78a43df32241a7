use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use super::{CoreError, SearchType};

/// A file or directory found below the search root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Walks a directory tree once and yields entries of one kind.
///
/// Every reachable subdirectory is visited; hidden files and ignore files
/// get no special treatment. Unreadable entries below the root are logged
/// and skipped.
pub struct DirectoryScanner {
    follow_links: bool,
}

impl DirectoryScanner {
    /// With `follow_links`, symlinked directories are entered and loops are
    /// detected by the walker and skipped.
    pub fn new(follow_links: bool) -> Self {
        Self { follow_links }
    }

    /// Fails with `DirectoryUnreadable` when `root` is not a listable directory.
    pub fn ensure_readable(root: &Path) -> Result<(), CoreError> {
        if !root.is_dir() {
            return Err(CoreError::DirectoryUnreadable(root.to_path_buf()));
        }
        fs::read_dir(root)
            .map(|_| ())
            .map_err(|_| CoreError::DirectoryUnreadable(root.to_path_buf()))
    }

    /// Collects every file (or every directory) below `root`, excluding
    /// `root` itself. The cancel flag is checked at every entry.
    pub fn scan(
        &self,
        root: &Path,
        kind: SearchType,
        cancel_flag: &AtomicBool,
    ) -> Result<Vec<ScanEntry>, CoreError> {
        Self::ensure_readable(root)?;

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(self.follow_links)
            .build();

        let mut entries = Vec::new();
        let mut visited = 0usize;
        let mut skipped = 0usize;

        for result in walker {
            if cancel_flag.load(Ordering::Relaxed) {
                tracing::debug!("Scan cancelled after {} entries", visited);
                return Err(CoreError::Cancelled);
            }

            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    skipped += 1;
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            visited += 1;

            if entry.depth() == 0 {
                continue;
            }
            let Some(file_type) = entry.file_type() else {
                continue;
            };

            // Unfollowed symlinks are listed by what they point at but never
            // entered. A dangling link counts as a file.
            let is_dir = if file_type.is_symlink() {
                entry.path().metadata().map(|m| m.is_dir()).unwrap_or(false)
            } else {
                file_type.is_dir()
            };
            let wanted = match kind {
                SearchType::File => !is_dir,
                SearchType::Directory => is_dir,
            };
            if !wanted {
                continue;
            }

            entries.push(ScanEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path().to_path_buf(),
            });
        }

        tracing::debug!(
            "Walked {}: {} entries visited, {} kept, {} skipped",
            root.display(),
            visited,
            entries.len(),
            skipped
        );
        Ok(entries)
    }
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self::new(false)
    }
}
