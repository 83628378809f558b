//! Candidate documents: the plain-text form of a CV that the evaluation pipeline consumes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod extract;
pub mod sections;

/// Heuristic CV section a line of text was assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Skills,
    Experience,
    Education,
    Other,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Skills,
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Other,
    ];
}

/// One CV, created once per input file and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateDocument {
    pub filename: String,
    /// Cleaned full text. Empty means the document cannot be evaluated.
    pub text: String,
    pub sections: BTreeMap<SectionKind, String>,
    pub extraction_error: Option<String>,
}

impl CandidateDocument {
    /// Builds a document from already-extracted text: cleans it and segments it.
    pub fn from_text(filename: impl Into<String>, raw_text: &str) -> Self {
        let text = sections::clean_text(raw_text);
        let sections = sections::extract_sections(&text);
        Self {
            filename: filename.into(),
            text,
            sections,
            extraction_error: None,
        }
    }

    /// A document whose extraction failed. It still occupies a slot in the ranking.
    pub fn failed(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: String::new(),
            sections: BTreeMap::new(),
            extraction_error: Some(error.into()),
        }
    }

    /// Why this document cannot be sent for evaluation, if it can't.
    pub fn invalid_reason(&self) -> Option<String> {
        if let Some(error) = &self.extraction_error {
            return Some(format!(
                "Skipping evaluation due to CV processing error: {error}"
            ));
        }
        if self.text.trim().is_empty() {
            return Some("No CV text available for evaluation".to_string());
        }
        None
    }

    pub fn section(&self, kind: SectionKind) -> &str {
        self.sections.get(&kind).map(String::as_str).unwrap_or("")
    }
}
