//! Text Extraction Adapter: PDF, DOCX and plain-text files to cleaned plain text.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::config::Config;
use crate::documents::sections::clean_text;
use crate::documents::CandidateDocument;

const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("File does not exist: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported file format: .{0}")]
    Unsupported(String),

    #[error("File {path} is {size_bytes} bytes, above the {limit_bytes} byte limit")]
    TooLarge {
        path: PathBuf,
        size_bytes: u64,
        limit_bytes: u64,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to extract text from PDF: {0}")]
    Pdf(String),

    #[error("Failed to extract text from DOCX: {0}")]
    Docx(String),

    #[error("No text could be extracted from {0}")]
    Empty(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Pdf,
    Docx,
    Txt,
}

impl FileKind {
    fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "pdf" => Some(FileKind::Pdf),
            "docx" => Some(FileKind::Docx),
            "txt" => Some(FileKind::Txt),
            _ => None,
        }
    }
}

/// Converts CV and job description files into cleaned plain text.
///
/// Cheap to clone, so each blocking extraction task can own a copy.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    allowed_extensions: Vec<String>,
    max_file_size_bytes: u64,
}

impl TextExtractor {
    pub fn new(allowed_extensions: Vec<String>, max_file_size_bytes: u64) -> Self {
        Self {
            allowed_extensions,
            max_file_size_bytes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.allowed_extensions.clone(),
            config.max_file_size_bytes(),
        )
    }

    /// Extracts the raw (uncleaned) text of a file.
    pub fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let kind = FileKind::from_extension(&extension)
            .filter(|_| self.allowed_extensions.contains(&extension))
            .ok_or_else(|| ExtractionError::Unsupported(extension.clone()))?;

        let metadata = std::fs::metadata(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ExtractionError::NotFound(path.to_path_buf())
            } else {
                ExtractionError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        if metadata.len() > self.max_file_size_bytes {
            return Err(ExtractionError::TooLarge {
                path: path.to_path_buf(),
                size_bytes: metadata.len(),
                limit_bytes: self.max_file_size_bytes,
            });
        }

        let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Extracting {:?} text from {}", kind, path.display());

        match kind {
            FileKind::Pdf => pdf_extract::extract_text_from_mem(&bytes)
                .map_err(|e| ExtractionError::Pdf(e.to_string())),
            FileKind::Docx => extract_docx(&bytes),
            FileKind::Txt => Ok(decode_plain_text(bytes)),
        }
    }

    /// Extracts and cleans a file, failing if nothing printable is left.
    pub fn extract_clean(&self, path: &Path) -> Result<String, ExtractionError> {
        let text = clean_text(&self.extract(path)?);
        if text.is_empty() {
            return Err(ExtractionError::Empty(path.to_path_buf()));
        }
        Ok(text)
    }

    /// Turns one CV file into a [`CandidateDocument`]. Never fails: extraction errors
    /// are recorded on the document instead.
    pub fn process_cv(&self, path: &Path) -> CandidateDocument {
        let filename = display_name(path);
        info!("Processing CV: {}", path.display());

        match self.extract_clean(path) {
            Ok(text) => CandidateDocument::from_text(filename, &text),
            Err(e) => {
                warn!("Error processing CV {}: {e}", path.display());
                CandidateDocument::failed(filename, format!("Error processing CV {}: {e}", path.display()))
            }
        }
    }
}

/// File name component of `path`, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// UTF-8, falling back to Latin-1 (every byte is a code point) for legacy files.
fn decode_plain_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| ExtractionError::Docx(format!("{DOCX_BODY}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Docx(e.to_string()))?;

    docx_body_text(&xml)
}

/// Collects `<w:t>` runs; paragraphs and breaks become newlines, tabs stay tabs.
/// Table cells are paragraphs too, so their text comes out one cell per line.
fn docx_body_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_run_text => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| ExtractionError::Docx(e.to_string()))?;
                text.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractionError::Docx(e.to_string())),
            _ => {}
        }
    }

    Ok(text)
}
