//! Ranking Engine: evaluates CVs one at a time and orders them by weighted score.
//!
//! Per CV the engine walks a small state machine:
//!
//! ```text
//! Invalid ──────────────────────────────────────────► Failed
//! Requesting ──(retries exhausted)──────────────────► Failed
//! Requesting ──► Parsing ──(ParseFailure)───────────► Warning (fallback record)
//!                        └─(record decoded)─► Scored ► Success
//! ```
//!
//! No per-CV failure escapes: every input document yields exactly one result.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::documents::{CandidateDocument, SectionKind};
use crate::evaluation::parser::{self, parse_evaluation};
use crate::evaluation::prompts::{build_evaluation_prompt, EVALUATION_SYSTEM};
use crate::llm_client::retry::{evaluate_with_retry, RetryPolicy};
use crate::llm_client::Evaluator;
use crate::ranking::outcome::{CandidateResult, EvaluationOutcome, RankedResult};
use crate::ranking::weights::{weighted_score, EvaluationWeights};

/// Read-only snapshot of everything a run needs from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingSettings {
    pub weights: EvaluationWeights,
    pub batch_size: usize,
    pub retry: RetryPolicy,
    pub temperature: f32,
}

impl RankingSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            weights: config.weights,
            batch_size: config.batch_size.max(1),
            retry: config.retry_policy(),
            temperature: config.temperature,
        }
    }

    /// Same settings with different category weights.
    pub fn with_weights(self, weights: EvaluationWeights) -> Self {
        Self { weights, ..self }
    }
}

pub struct RankingEngine {
    evaluator: Arc<dyn Evaluator>,
    settings: RankingSettings,
}

impl RankingEngine {
    pub fn new(evaluator: Arc<dyn Evaluator>, settings: RankingSettings) -> Self {
        Self {
            evaluator,
            settings,
        }
    }

    pub fn settings(&self) -> &RankingSettings {
        &self.settings
    }

    pub fn model(&self) -> &str {
        self.evaluator.model()
    }

    /// Evaluates a single CV against the job description. Never fails.
    pub async fn evaluate_cv(
        &self,
        job_description: &str,
        document: &CandidateDocument,
    ) -> CandidateResult {
        let filename = document.filename.as_str();
        info!("Starting evaluation of CV: {filename}");

        if let Some(reason) = document.invalid_reason() {
            warn!("{filename}: {reason}");
            return CandidateResult::failed(filename, reason);
        }

        let user_prompt = build_evaluation_prompt(job_description, &document.text);
        debug!(
            "CV text length: {} chars, prompt length: {} chars, sections: {}",
            document.text.chars().count(),
            user_prompt.chars().count(),
            section_summary(document)
        );

        let response = match evaluate_with_retry(
            self.evaluator.as_ref(),
            EVALUATION_SYSTEM,
            &user_prompt,
            self.settings.temperature,
            &self.settings.retry,
        )
        .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("API error for {filename}: {e}");
                return CandidateResult::failed(filename, format!("API error: {e}"));
            }
        };

        let raw_preview = parser::preview(&response.content);
        debug!("Raw reply for {filename}: {raw_preview}");

        let outcome = match parse_evaluation(&response.content) {
            Ok(parsed) => {
                debug!("Parsed {filename} with strategy {:?}", parsed.strategy);
                EvaluationOutcome::Success {
                    evaluation: parsed.record,
                }
            }
            Err(failure) => {
                warn!("Using fallback evaluation for {filename}: {failure}");
                EvaluationOutcome::Warning {
                    diagnostic: failure.to_string(),
                    evaluation: failure.fallback,
                }
            }
        };

        let score = outcome
            .evaluation()
            .map(|record| weighted_score(record, &self.settings.weights))
            .unwrap_or(0.0);

        info!("Evaluated CV {filename} with score {score:.2} ({})", outcome.status());

        CandidateResult {
            filename: filename.to_string(),
            weighted_score: score,
            outcome,
            raw_response: Some(raw_preview),
        }
    }

    /// Evaluates every document in batches of `batch_size`, then ranks the results.
    pub async fn rank(
        &self,
        job_description: &str,
        documents: &[CandidateDocument],
    ) -> Vec<RankedResult> {
        let batch_size = self.settings.batch_size.max(1);
        let total_batches = documents.len().div_ceil(batch_size);
        let mut results = Vec::with_capacity(documents.len());

        for (index, batch) in documents.chunks(batch_size).enumerate() {
            info!(
                "Processing batch {}/{} ({} CVs)",
                index + 1,
                total_batches,
                batch.len()
            );
            for document in batch {
                results.push(self.evaluate_cv(job_description, document).await);
            }
            info!(
                "Completed batch {}/{} ({}/{} CVs evaluated)",
                index + 1,
                total_batches,
                results.len(),
                documents.len()
            );
        }

        rank_results(results)
    }
}

/// Per-section character counts, e.g. `Skills=120 Experience=0 ...`.
fn section_summary(document: &CandidateDocument) -> String {
    SectionKind::ALL
        .iter()
        .map(|kind| format!("{kind:?}={}", document.section(*kind).chars().count()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stable sort by weighted score, highest first, then 1-based ranks.
/// Equal scores keep their input order.
pub fn rank_results(mut results: Vec<CandidateResult>) -> Vec<RankedResult> {
    results.sort_by(|a, b| b.weighted_score.total_cmp(&a.weighted_score));
    results
        .into_iter()
        .enumerate()
        .map(|(index, result)| result.with_rank(index + 1))
        .collect()
}
