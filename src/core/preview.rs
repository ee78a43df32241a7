//! Preview producers, selected purely by file extension.
//!
//! The registry only hands back data; drawing it is the UI's job. Images
//! and videos are returned as `Preview::External` so the UI can pick its
//! own renderer.

use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::catalog::normalize_extension;
use super::content::{docx_paragraphs, pdf_pages};
use super::CoreError;
use crate::utils::file_detection::{looks_like_text, lower_file_name};

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".bmp"];
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".avi", ".mkv", ".mov"];
const CODE_EXTENSIONS: &[&str] = &[".py", ".cpp", ".c", ".java", ".js", ".html", ".css"];

/// Kinds of media the UI renders itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// What a preview producer hands back to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Preview {
    Text {
        content: String,
        /// `true` for source code, so the UI can pick a monospace font.
        monospace: bool,
        truncated: bool,
    },
    /// Pages of a PDF or paragraphs of a Word file.
    Document { sections: Vec<String> },
    External { kind: MediaKind, path: PathBuf },
    Binary { size: u64 },
    Directory,
}

pub trait PreviewProducer: Send + Sync {
    fn name(&self) -> &str;

    fn produce(&self, path: &Path) -> Result<Preview, CoreError>;
}

/// First lines of a UTF-8 text file.
pub struct TextPreview {
    max_lines: usize,
    monospace: bool,
}

impl TextPreview {
    pub fn new(max_lines: usize, monospace: bool) -> Self {
        Self {
            max_lines,
            monospace,
        }
    }
}

impl PreviewProducer for TextPreview {
    fn name(&self) -> &str {
        if self.monospace {
            "code"
        } else {
            "text"
        }
    }

    fn produce(&self, path: &Path) -> Result<Preview, CoreError> {
        let file = fs::File::open(path).map_err(|e| CoreError::Io(e, path.to_path_buf()))?;
        let (content, truncated) = read_lines(BufReader::new(file), self.max_lines, path)?;
        Ok(Preview::Text {
            content,
            monospace: self.monospace,
            truncated,
        })
    }
}

fn read_lines<R: BufRead>(
    reader: R,
    max_lines: usize,
    path: &Path,
) -> Result<(String, bool), CoreError> {
    let mut content = String::new();
    for (index, line) in reader.lines().enumerate() {
        if index >= max_lines {
            return Ok((content, true));
        }
        let line = line.map_err(|e| CoreError::content(path, e))?;
        content.push_str(&line);
        content.push('\n');
    }
    Ok((content, false))
}

/// Extracted text of PDF and Word documents.
pub struct DocumentPreview;

impl PreviewProducer for DocumentPreview {
    fn name(&self) -> &str {
        "document"
    }

    fn produce(&self, path: &Path) -> Result<Preview, CoreError> {
        let name = lower_file_name(path);
        let sections = if name.ends_with(".pdf") {
            pdf_pages(path)?
        } else {
            docx_paragraphs(path)?
        };
        Ok(Preview::Document { sections })
    }
}

/// Media rendered by the UI from the path alone.
pub struct MediaPreview(pub MediaKind);

impl PreviewProducer for MediaPreview {
    fn name(&self) -> &str {
        match self.0 {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    fn produce(&self, path: &Path) -> Result<Preview, CoreError> {
        Ok(Preview::External {
            kind: self.0,
            path: path.to_path_buf(),
        })
    }
}

/// Fallback for unregistered extensions: lossy text if the file looks
/// textual, otherwise just its size.
pub struct GenericPreview {
    max_lines: usize,
}

impl PreviewProducer for GenericPreview {
    fn name(&self) -> &str {
        "generic"
    }

    fn produce(&self, path: &Path) -> Result<Preview, CoreError> {
        let metadata = fs::metadata(path).map_err(|e| CoreError::Io(e, path.to_path_buf()))?;
        if !looks_like_text(path).unwrap_or(false) {
            return Ok(Preview::Binary {
                size: metadata.len(),
            });
        }

        let bytes = fs::read(path).map_err(|e| CoreError::Io(e, path.to_path_buf()))?;
        let text = String::from_utf8_lossy(&bytes);
        let (content, truncated) = read_lines(text.as_bytes(), self.max_lines, path)?;
        Ok(Preview::Text {
            content,
            monospace: false,
            truncated,
        })
    }
}

/// Extension -> preview producer table, built once at startup.
pub struct PreviewRegistry {
    producers: HashMap<String, Arc<dyn PreviewProducer>>,
    fallback: Arc<dyn PreviewProducer>,
}

impl PreviewRegistry {
    /// A registry that only knows the generic fallback.
    pub fn new(max_lines: usize) -> Self {
        Self {
            producers: HashMap::new(),
            fallback: Arc::new(GenericPreview { max_lines }),
        }
    }

    pub fn with_defaults(max_lines: usize) -> Self {
        let mut registry = Self::new(max_lines);

        let image: Arc<dyn PreviewProducer> = Arc::new(MediaPreview(MediaKind::Image));
        let video: Arc<dyn PreviewProducer> = Arc::new(MediaPreview(MediaKind::Video));
        let code: Arc<dyn PreviewProducer> = Arc::new(TextPreview::new(max_lines, true));
        let document: Arc<dyn PreviewProducer> = Arc::new(DocumentPreview);

        for ext in IMAGE_EXTENSIONS {
            registry.register(ext, image.clone());
        }
        for ext in VIDEO_EXTENSIONS {
            registry.register(ext, video.clone());
        }
        for ext in CODE_EXTENSIONS {
            registry.register(ext, code.clone());
        }
        registry.register(".txt", Arc::new(TextPreview::new(max_lines, false)));
        registry.register(".pdf", document.clone());
        registry.register(".docx", document);
        registry
    }

    pub fn register(&mut self, extension: &str, producer: Arc<dyn PreviewProducer>) {
        self.producers
            .insert(normalize_extension(extension), producer);
    }

    /// The producer for the longest registered suffix of the file name.
    pub fn producer_for(&self, path: &Path) -> &Arc<dyn PreviewProducer> {
        let name = lower_file_name(path);
        self.producers
            .iter()
            .filter(|(ext, _)| name.ends_with(ext.as_str()))
            .max_by_key(|(ext, _)| ext.len())
            .map(|(_, producer)| producer)
            .unwrap_or(&self.fallback)
    }

    pub fn preview(&self, path: &Path) -> Result<Preview, CoreError> {
        if path.is_dir() {
            return Ok(Preview::Directory);
        }
        let producer = self.producer_for(path);
        tracing::debug!("Previewing {} with '{}'", path.display(), producer.name());
        producer.produce(path)
    }
}
