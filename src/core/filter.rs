//! Resolves the extension set a search matches file names against.

use std::collections::BTreeSet;

use super::catalog::{ExtensionCatalog, ALL_CATEGORY};
use super::SearchType;

/// Stateless resolver; recomputed for every search so toggles made since
/// the previous run always take effect.
pub struct FilterResolver;

impl FilterResolver {
    /// Returns the effective extensions for `category`.
    ///
    /// Directory searches always get the empty set: extensions mean nothing
    /// for folder names and the engine matches every directory.
    pub fn resolve(
        search_type: SearchType,
        category: &str,
        catalog: &ExtensionCatalog,
    ) -> BTreeSet<String> {
        match search_type {
            SearchType::Directory => BTreeSet::new(),
            SearchType::File => catalog.effective_extensions(category),
        }
    }

    /// Whether a file search should accept every file regardless of
    /// extension. Only the degenerate "All over an empty catalog" case does.
    pub fn matches_any_extension(
        search_type: SearchType,
        category: &str,
        catalog: &ExtensionCatalog,
    ) -> bool {
        search_type == SearchType::File && category == ALL_CATEGORY && catalog.is_empty()
    }

    /// Case-insensitive suffix check of a file name against the set.
    pub fn name_matches(name_lower: &str, extensions: &BTreeSet<String>) -> bool {
        extensions.iter().any(|ext| name_lower.ends_with(ext.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_search_resolves_to_empty_set() {
        let catalog = ExtensionCatalog::with_defaults();
        assert!(FilterResolver::resolve(SearchType::Directory, "Images", &catalog).is_empty());
        assert!(FilterResolver::resolve(SearchType::Directory, ALL_CATEGORY, &catalog).is_empty());
    }

    #[test]
    fn file_search_uses_current_toggles() {
        let mut catalog = ExtensionCatalog::with_defaults();
        let before = FilterResolver::resolve(SearchType::File, "Images", &catalog);
        assert!(before.contains(".png"));

        catalog.toggle("Images", ".png", false).unwrap();
        let after = FilterResolver::resolve(SearchType::File, "Images", &catalog);
        assert!(!after.contains(".png"));
        assert!(after.contains(".jpg"));
    }

    #[test]
    fn all_unions_every_category() {
        let catalog = ExtensionCatalog::with_defaults();
        let all = FilterResolver::resolve(SearchType::File, ALL_CATEGORY, &catalog);
        assert!(all.contains(".pdf"));
        assert!(all.contains(".mkv"));
        assert!(all.contains(".pptx"));
    }

    #[test]
    fn only_empty_catalog_matches_any_extension() {
        let empty = ExtensionCatalog::default();
        assert!(FilterResolver::matches_any_extension(SearchType::File, ALL_CATEGORY, &empty));

        let catalog = ExtensionCatalog::with_defaults();
        assert!(!FilterResolver::matches_any_extension(SearchType::File, ALL_CATEGORY, &catalog));
        assert!(!FilterResolver::matches_any_extension(SearchType::Directory, ALL_CATEGORY, &empty));
    }

    #[test]
    fn suffix_matching_is_on_lowercase_names() {
        let exts: BTreeSet<String> = [".jpg".to_string()].into_iter().collect();
        assert!(FilterResolver::name_matches("holiday.jpg", &exts));
        assert!(!FilterResolver::name_matches("holiday.jpg.bak", &exts));
        assert!(!FilterResolver::name_matches("jpg", &exts));
    }
}
