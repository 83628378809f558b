use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::ranking::outcome::{EvaluationStatus, RankedResult};
use crate::ranking::weights::EvaluationWeights;

/// Number of candidates listed in `top_candidates`.
pub const TOP_CANDIDATES: usize = 5;

/// Summary of one ranking run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub total_cvs: usize,
    /// Success and Warning results.
    pub successful_evaluations: usize,
    pub failed_evaluations: usize,
    /// Mean weighted score over every result, failures included; 0 for an empty run.
    pub average_score: f64,
    pub top_candidates: Vec<RankedResult>,
    pub all_rankings: Vec<RankedResult>,
    pub weights: EvaluationWeights,
    pub model: String,
}

/// Builds the run summary from results already in rank order.
pub fn build_report(
    results: Vec<RankedResult>,
    weights: EvaluationWeights,
    model: impl Into<String>,
) -> ReportSummary {
    let total_cvs = results.len();
    let failed_evaluations = results
        .iter()
        .filter(|r| r.status() == EvaluationStatus::Failed)
        .count();
    let average_score = if total_cvs == 0 {
        0.0
    } else {
        results.iter().map(RankedResult::weighted_score).sum::<f64>() / total_cvs as f64
    };
    let top_candidates = results
        .iter()
        .filter(|r| r.status() != EvaluationStatus::Failed)
        .take(TOP_CANDIDATES)
        .cloned()
        .collect();

    ReportSummary {
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        total_cvs,
        successful_evaluations: total_cvs - failed_evaluations,
        failed_evaluations,
        average_score,
        top_candidates,
        all_rankings: results,
        weights,
        model: model.into(),
    }
}
