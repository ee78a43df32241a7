//! Per-format content readers used as a fallback when a file name does not
//! match the search term.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use docx_rs::{read_docx, DocumentChild, Docx, Paragraph, ParagraphChild, RunChild};
use lopdf::Document as PdfDocument;

use super::CoreError;

const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024; // 50MB

/// A reader that decides whether a file's text contains a term.
///
/// `term_lower` is already lower-cased. Implementations must release every
/// handle they open before returning, on success and on failure.
pub trait ContentMatcher: Send + Sync {
    /// Name of this reader, used in diagnostics.
    fn name(&self) -> &str;

    fn matches(&self, path: &Path, term_lower: &str) -> Result<bool, CoreError>;
}

/// Whole-file UTF-8 text.
pub struct PlainTextMatcher;

impl ContentMatcher for PlainTextMatcher {
    fn name(&self) -> &str {
        "text"
    }

    fn matches(&self, path: &Path, term_lower: &str) -> Result<bool, CoreError> {
        let bytes = fs::read(path).map_err(|e| CoreError::Io(e, path.to_path_buf()))?;
        let content = String::from_utf8(bytes).map_err(|e| CoreError::content(path, e))?;
        Ok(content.to_lowercase().contains(term_lower))
    }
}

/// PDF documents, checked page by page.
pub struct PdfMatcher;

impl ContentMatcher for PdfMatcher {
    fn name(&self) -> &str {
        "pdf"
    }

    fn matches(&self, path: &Path, term_lower: &str) -> Result<bool, CoreError> {
        let doc = load_pdf(path)?;
        for page_number in doc.get_pages().keys() {
            let text = pdf_page_text(&doc, path, *page_number)?;
            if text.to_lowercase().contains(term_lower) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Word documents, checked paragraph by paragraph.
pub struct DocxMatcher;

impl ContentMatcher for DocxMatcher {
    fn name(&self) -> &str {
        "docx"
    }

    fn matches(&self, path: &Path, term_lower: &str) -> Result<bool, CoreError> {
        let docx = load_docx(path)?;
        let found = body_paragraphs(&docx)
            .any(|para| paragraph_text(para).to_lowercase().contains(term_lower));
        Ok(found)
    }
}

fn load_pdf(path: &Path) -> Result<PdfDocument, CoreError> {
    PdfDocument::load(path).map_err(|e| CoreError::content(path, e))
}

fn pdf_page_text(doc: &PdfDocument, path: &Path, page_number: u32) -> Result<String, CoreError> {
    doc.extract_text(&[page_number])
        .map_err(|e| CoreError::content(path, format!("page {}: {}", page_number, e)))
}

/// Text of every page of a PDF, in page order.
pub fn pdf_pages(path: &Path) -> Result<Vec<String>, CoreError> {
    let doc = load_pdf(path)?;
    doc.get_pages()
        .keys()
        .map(|page_number| pdf_page_text(&doc, path, *page_number))
        .collect()
}

fn load_docx(path: &Path) -> Result<Docx, CoreError> {
    let data = fs::read(path).map_err(|e| CoreError::Io(e, path.to_path_buf()))?;
    read_docx(&data).map_err(|e| CoreError::content(path, e))
}

fn body_paragraphs(docx: &Docx) -> impl Iterator<Item = &Paragraph> + '_ {
    docx.document.children.iter().filter_map(|child| match child {
        DocumentChild::Paragraph(para) => Some(para.as_ref()),
        _ => None,
    })
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    for child in &para.children {
        if let ParagraphChild::Run(run) = child {
            for child in &run.children {
                if let RunChild::Text(t) = child {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}

/// Text of every body paragraph of a `.docx` file, in document order.
pub fn docx_paragraphs(path: &Path) -> Result<Vec<String>, CoreError> {
    let docx = load_docx(path)?;
    Ok(body_paragraphs(&docx).map(paragraph_text).collect())
}

/// Table of extension -> content reader, built once at startup.
///
/// Only files whose lower-cased name ends with a registered extension are
/// ever content-searched; everything else silently stays name-only.
#[derive(Clone)]
pub struct ContentMatcherRegistry {
    matchers: HashMap<String, Arc<dyn ContentMatcher>>,
    max_file_size: u64,
}

impl ContentMatcherRegistry {
    /// A registry with no readers at all.
    pub fn empty() -> Self {
        Self {
            matchers: HashMap::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// `.txt`, `.pdf` and `.docx`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(".txt", Arc::new(PlainTextMatcher));
        registry.register(".pdf", Arc::new(PdfMatcher));
        registry.register(".docx", Arc::new(DocxMatcher));
        registry
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn register(&mut self, extension: &str, matcher: Arc<dyn ContentMatcher>) {
        let extension = super::catalog::normalize_extension(extension);
        self.matchers.insert(extension, matcher);
    }

    /// The reader registered for the longest extension suffix of the name.
    pub fn matcher_for(&self, name_lower: &str) -> Option<&Arc<dyn ContentMatcher>> {
        self.matchers
            .iter()
            .filter(|(ext, _)| name_lower.ends_with(ext.as_str()))
            .max_by_key(|(ext, _)| ext.len())
            .map(|(_, matcher)| matcher)
    }

    /// Runs the matching reader, if any, swallowing failures.
    ///
    /// Read and parse errors are logged and count as "no match" so a single
    /// broken file never aborts a search.
    pub fn check(&self, path: &Path, name_lower: &str, term_lower: &str) -> bool {
        let Some(matcher) = self.matcher_for(name_lower) else {
            return false;
        };

        match fs::metadata(path) {
            Ok(metadata) if metadata.len() > self.max_file_size => {
                tracing::debug!(
                    "Skipping content search for {} ({} bytes over limit)",
                    path.display(),
                    metadata.len()
                );
                return false;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Cannot stat {}: {}", path.display(), e);
                return false;
            }
        }

        match matcher.matches(path, term_lower) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Content reader '{}' failed: {}", matcher.name(), e);
                false
            }
        }
    }
}

impl Default for ContentMatcherRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
