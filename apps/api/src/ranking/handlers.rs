use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::ranking::engine::{RankingEngine, RankingSettings};
use crate::ranking::export::{to_csv, to_json};
use crate::ranking::orchestrator::{
    documents_from_text, load_job_description, rank_documents, rank_files, resolve_input_path,
    JobDescriptionSource,
};
use crate::ranking::report::ReportSummary;
use crate::ranking::weights::EvaluationWeights;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Deserialize)]
pub struct CandidateInput {
    pub filename: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct RankTextRequest {
    pub job_description: String,
    pub candidates: Vec<CandidateInput>,
    pub weights: Option<EvaluationWeights>,
}

#[derive(Debug, Deserialize)]
pub struct RankFilesRequest {
    pub job_description: Option<String>,
    /// File name inside the CV input directory.
    pub job_description_file: Option<String>,
    pub cv_files: Vec<String>,
    pub weights: Option<EvaluationWeights>,
}

/// POST /api/v1/rankings
pub async fn handle_rank_text(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
    Json(req): Json<RankTextRequest>,
) -> Result<Response, AppError> {
    if req.candidates.is_empty() {
        return Err(AppError::Validation(
            "At least one candidate is required".to_string(),
        ));
    }
    let engine = build_engine(&state, req.weights)?;
    let job_description = load_job_description(
        &state.extractor,
        JobDescriptionSource::Text(req.job_description),
    )
    .await?;

    let documents = documents_from_text(
        req.candidates
            .into_iter()
            .map(|candidate| (candidate.filename, candidate.text)),
    );
    let report = rank_documents(&engine, &job_description, &documents).await;
    render_report(report, query.format)
}

/// POST /api/v1/rankings/files
pub async fn handle_rank_files(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
    Json(req): Json<RankFilesRequest>,
) -> Result<Response, AppError> {
    if req.cv_files.is_empty() {
        return Err(AppError::Validation(
            "At least one CV file is required".to_string(),
        ));
    }
    let engine = build_engine(&state, req.weights)?;

    let base = &state.config.cv_input_dir;
    let paths = req
        .cv_files
        .iter()
        .map(|name| resolve_input_path(base, name))
        .collect::<Result<Vec<_>, _>>()?;

    let source = match (req.job_description, req.job_description_file) {
        (Some(text), None) => JobDescriptionSource::Text(text),
        (None, Some(name)) => JobDescriptionSource::File(resolve_input_path(base, &name)?),
        (Some(_), Some(_)) => {
            return Err(AppError::Validation(
                "Provide either job_description or job_description_file, not both".to_string(),
            ))
        }
        (None, None) => {
            return Err(AppError::Validation(
                "job_description or job_description_file is required".to_string(),
            ))
        }
    };
    let job_description = load_job_description(&state.extractor, source).await?;

    let report = rank_files(&engine, &state.extractor, &job_description, &paths).await;
    render_report(report, query.format)
}

/// Engine for one request: configuration snapshot plus any weight override.
fn build_engine(
    state: &AppState,
    weights: Option<EvaluationWeights>,
) -> Result<RankingEngine, AppError> {
    let mut settings = RankingSettings::from_config(&state.config);
    if let Some(weights) = weights {
        weights.validate().map_err(AppError::Validation)?;
        settings = settings.with_weights(weights);
    }
    Ok(RankingEngine::new(state.evaluator.clone(), settings))
}

fn render_report(report: ReportSummary, format: ExportFormat) -> Result<Response, AppError> {
    match format {
        ExportFormat::Json => Ok((
            [(header::CONTENT_TYPE, "application/json")],
            to_json(&report)?,
        )
            .into_response()),
        ExportFormat::Csv => {
            let csv = to_csv(&report.all_rankings)?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"cv_rankings.csv\"",
                    ),
                ],
                csv,
            )
                .into_response())
        }
    }
}
