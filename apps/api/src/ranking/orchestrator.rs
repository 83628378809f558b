//! Batch Orchestrator: drives extraction, evaluation and ranking for one run.
//!
//! A run takes one job description and a list of CVs and produces a
//! [`ReportSummary`]. Each input file yields exactly one ranked entry: files that
//! cannot be extracted become failed documents and are ranked with score 0.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{error, info};

use crate::documents::extract::{display_name, ExtractionError, TextExtractor};
use crate::documents::sections::clean_text;
use crate::documents::CandidateDocument;
use crate::ranking::engine::RankingEngine;
use crate::ranking::report::{build_report, ReportSummary};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Job description is empty")]
    EmptyJobDescription,

    #[error("Could not read job description: {0}")]
    JobDescription(#[from] ExtractionError),

    #[error("Invalid file name '{0}': must be a relative path inside the CV directory")]
    InvalidPath(String),

    #[error("Job description extraction task failed: {0}")]
    Task(String),
}

/// Where the job description comes from.
#[derive(Debug, Clone)]
pub enum JobDescriptionSource {
    Text(String),
    File(PathBuf),
}

/// Cleaned job description text. Empty input is an error, nothing is evaluated.
pub async fn load_job_description(
    extractor: &TextExtractor,
    source: JobDescriptionSource,
) -> Result<String, OrchestratorError> {
    let text = match source {
        JobDescriptionSource::Text(raw) => clean_text(&raw),
        JobDescriptionSource::File(path) => {
            let extractor = extractor.clone();
            tokio::task::spawn_blocking(move || extractor.extract_clean(&path))
                .await
                .map_err(|e| OrchestratorError::Task(e.to_string()))??
        }
    };

    if text.is_empty() {
        return Err(OrchestratorError::EmptyJobDescription);
    }
    Ok(text)
}

/// Extracts every CV file, in input order, off the async runtime.
///
/// A panic inside a PDF decoder is contained to its own task and recorded as an
/// extraction failure for that file.
pub async fn load_documents(extractor: &TextExtractor, paths: &[PathBuf]) -> Vec<CandidateDocument> {
    let mut documents = Vec::with_capacity(paths.len());

    for path in paths {
        let extractor = extractor.clone();
        let task_path = path.clone();
        let document = tokio::task::spawn_blocking(move || extractor.process_cv(&task_path))
            .await
            .unwrap_or_else(|e| {
                error!("Extraction task for {} failed: {e}", path.display());
                CandidateDocument::failed(
                    display_name(path),
                    format!("Error processing CV {}: extraction aborted", path.display()),
                )
            });
        documents.push(document);
    }

    documents
}

/// Builds documents from text supplied directly; cleaned and segmented like file input.
pub fn documents_from_text<I>(candidates: I) -> Vec<CandidateDocument>
where
    I: IntoIterator<Item = (String, String)>,
{
    candidates
        .into_iter()
        .map(|(filename, text)| CandidateDocument::from_text(filename, &text))
        .collect()
}

/// Evaluates and ranks already-built documents and summarises the run.
pub async fn rank_documents(
    engine: &RankingEngine,
    job_description: &str,
    documents: &[CandidateDocument],
) -> ReportSummary {
    info!(
        "Ranking {} CVs (batch size {})",
        documents.len(),
        engine.settings().batch_size
    );

    let ranked = engine.rank(job_description, documents).await;
    let report = build_report(ranked, engine.settings().weights, engine.model());

    info!(
        "Ranking run {} complete: {} evaluated, {} failed, average score {:.2}",
        report.run_id,
        report.successful_evaluations,
        report.failed_evaluations,
        report.average_score
    );
    report
}

/// Full file pipeline: extract every CV, then evaluate, rank and summarise.
pub async fn rank_files(
    engine: &RankingEngine,
    extractor: &TextExtractor,
    job_description: &str,
    paths: &[PathBuf],
) -> ReportSummary {
    let documents = load_documents(extractor, paths).await;
    rank_documents(engine, job_description, &documents).await
}

/// Joins `name` onto `base`, refusing absolute paths and any `..` component.
pub fn resolve_input_path(base: &Path, name: &str) -> Result<PathBuf, OrchestratorError> {
    let relative = Path::new(name);
    let is_plain = !name.trim().is_empty()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));

    if !is_plain {
        return Err(OrchestratorError::InvalidPath(name.to_string()));
    }
    Ok(base.join(relative))
}
