//! The category -> extension table and its per-extension toggle state.

use std::collections::BTreeSet;

use super::CoreError;

/// Sentinel category that stands for the union of every category.
pub const ALL_CATEGORY: &str = "All";

/// The compiled-in category table used when no configuration overrides it.
pub const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    ("Documents", &[".pdf", ".docx", ".txt"]),
    ("Images", &[".png", ".jpg", ".jpeg", ".gif", ".bmp"]),
    ("Videos", &[".mp4", ".avi", ".mkv", ".mov"]),
    (
        "Code",
        &[".py", ".cpp", ".c", ".java", ".js", ".html", ".css"],
    ),
    ("Spreadsheets", &[".xls", ".xlsx", ".csv"]),
    ("Presentations", &[".ppt", ".pptx"]),
];

/// Lower-cases an extension and makes sure it carries its leading dot.
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().to_lowercase();
    if trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{}", trimmed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ExtensionState {
    extension: String,
    enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Category {
    name: String,
    extensions: Vec<ExtensionState>,
}

/// An ordered set of named categories, each holding unique extensions with
/// an enabled flag.
///
/// The catalog is a plain value owned by the session; searches receive a
/// clone so later toggles never leak into a search already running.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensionCatalog {
    categories: Vec<Category>,
}

impl ExtensionCatalog {
    /// Builds a catalog from `(name, extensions)` pairs.
    ///
    /// Extensions are normalized and de-duplicated per category. A repeated
    /// category name merges into the first occurrence, and the reserved
    /// name `All` is skipped.
    pub fn new<I, N, E, X>(table: I) -> Self
    where
        I: IntoIterator<Item = (N, E)>,
        N: AsRef<str>,
        E: IntoIterator<Item = X>,
        X: AsRef<str>,
    {
        let mut catalog = ExtensionCatalog::default();
        for (name, extensions) in table {
            let name = name.as_ref().trim();
            if name.is_empty() || name == ALL_CATEGORY {
                tracing::warn!("Skipping reserved or empty category name '{}'", name);
                continue;
            }

            let index = match catalog.position(name) {
                Some(index) => index,
                None => {
                    catalog.categories.push(Category {
                        name: name.to_string(),
                        extensions: Vec::new(),
                    });
                    catalog.categories.len() - 1
                }
            };

            let category = &mut catalog.categories[index];
            for extension in extensions {
                let extension = normalize_extension(extension.as_ref());
                if extension.len() < 2 {
                    continue;
                }
                if !category.extensions.iter().any(|e| e.extension == extension) {
                    category.extensions.push(ExtensionState {
                        extension,
                        enabled: true,
                    });
                }
            }
        }
        catalog
    }

    /// The compiled-in default table with every extension enabled.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_CATEGORIES.iter().map(|(name, exts)| (*name, exts.iter())))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name == name)
    }

    fn category(&self, name: &str) -> Result<&Category, CoreError> {
        self.position(name)
            .map(|index| &self.categories[index])
            .ok_or_else(|| CoreError::UnknownCategory(name.to_string()))
    }

    /// Category names in table order, without the `All` sentinel.
    pub fn categories(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// `true` for `All` and for every registered category.
    pub fn has_category(&self, name: &str) -> bool {
        name == ALL_CATEGORY || self.position(name).is_some()
    }

    /// Every extension registered under `category`, enabled or not.
    ///
    /// For `All` this is the union over every category.
    pub fn extensions_of(&self, category: &str) -> Result<BTreeSet<String>, CoreError> {
        if category == ALL_CATEGORY {
            return Ok(self
                .categories
                .iter()
                .flat_map(|c| c.extensions.iter().map(|e| e.extension.clone()))
                .collect());
        }
        Ok(self
            .category(category)?
            .extensions
            .iter()
            .map(|e| e.extension.clone())
            .collect())
    }

    /// Whether `extension` is currently enabled inside `category`.
    pub fn is_enabled(&self, category: &str, extension: &str) -> Result<bool, CoreError> {
        let extension = normalize_extension(extension);
        self.category(category)?
            .extensions
            .iter()
            .find(|e| e.extension == extension)
            .map(|e| e.enabled)
            .ok_or_else(|| CoreError::InvalidExtension {
                category: category.to_string(),
                extension,
            })
    }

    /// Enables or disables one extension of one category.
    ///
    /// Fails with `InvalidExtension` when the extension is not registered
    /// under that category; the catalog is left untouched in that case.
    pub fn toggle(
        &mut self,
        category: &str,
        extension: &str,
        enabled: bool,
    ) -> Result<(), CoreError> {
        let extension = normalize_extension(extension);
        let index = self
            .position(category)
            .ok_or_else(|| CoreError::UnknownCategory(category.to_string()))?;

        let state = self.categories[index]
            .extensions
            .iter_mut()
            .find(|e| e.extension == extension)
            .ok_or_else(|| CoreError::InvalidExtension {
                category: category.to_string(),
                extension: extension.clone(),
            })?;

        state.enabled = enabled;
        tracing::debug!(
            "Extension {} in category {} is now {}",
            extension,
            category,
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    /// The currently enabled extensions of `category`, or of every category
    /// for `All`. Unknown categories resolve to the empty set.
    pub fn effective_extensions(&self, category: &str) -> BTreeSet<String> {
        let enabled = |c: &Category| {
            c.extensions
                .iter()
                .filter(|e| e.enabled)
                .map(|e| e.extension.clone())
                .collect::<Vec<_>>()
        };

        if category == ALL_CATEGORY {
            return self.categories.iter().flat_map(enabled).collect();
        }
        match self.category(category) {
            Ok(c) => enabled(c).into_iter().collect(),
            Err(_) => BTreeSet::new(),
        }
    }

    /// Re-enables every extension in every category.
    pub fn reset(&mut self) {
        for category in &mut self.categories {
            for extension in &mut category.extensions {
                extension.enabled = true;
            }
        }
    }
}
