//! Per-CV evaluation outcomes, before and after rank assignment.

use std::fmt;

use serde::Serialize;

use crate::evaluation::models::EvaluationRecord;

/// Result of evaluating one CV. Serialized with a lowercase `status` tag next to
/// whichever of `evaluation` / `diagnostic` the variant carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EvaluationOutcome {
    Success {
        evaluation: EvaluationRecord,
    },
    /// The reply could not be parsed; `evaluation` is the zero-filled fallback.
    Warning {
        evaluation: EvaluationRecord,
        diagnostic: String,
    },
    Failed {
        diagnostic: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStatus {
    Success,
    Warning,
    Failed,
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EvaluationStatus::Success => "success",
            EvaluationStatus::Warning => "warning",
            EvaluationStatus::Failed => "failed",
        })
    }
}

impl EvaluationOutcome {
    pub fn status(&self) -> EvaluationStatus {
        match self {
            EvaluationOutcome::Success { .. } => EvaluationStatus::Success,
            EvaluationOutcome::Warning { .. } => EvaluationStatus::Warning,
            EvaluationOutcome::Failed { .. } => EvaluationStatus::Failed,
        }
    }

    pub fn evaluation(&self) -> Option<&EvaluationRecord> {
        match self {
            EvaluationOutcome::Success { evaluation }
            | EvaluationOutcome::Warning { evaluation, .. } => Some(evaluation),
            EvaluationOutcome::Failed { .. } => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            EvaluationOutcome::Success { .. } => None,
            EvaluationOutcome::Warning { diagnostic, .. }
            | EvaluationOutcome::Failed { diagnostic } => Some(diagnostic),
        }
    }
}

/// An evaluated CV that has not been ranked yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateResult {
    pub filename: String,
    pub weighted_score: f64,
    #[serde(flatten)]
    pub outcome: EvaluationOutcome,
    /// Model reply truncated for debugging; absent when no reply was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl CandidateResult {
    pub fn failed(filename: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            weighted_score: 0.0,
            outcome: EvaluationOutcome::Failed {
                diagnostic: diagnostic.into(),
            },
            raw_response: None,
        }
    }

    pub fn status(&self) -> EvaluationStatus {
        self.outcome.status()
    }

    pub(crate) fn with_rank(self, rank: usize) -> RankedResult {
        RankedResult {
            rank,
            candidate: self,
        }
    }
}

/// A CV result with its 1-based position in the final ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub rank: usize,
    #[serde(flatten)]
    pub candidate: CandidateResult,
}

impl RankedResult {
    pub fn filename(&self) -> &str {
        &self.candidate.filename
    }

    pub fn weighted_score(&self) -> f64 {
        self.candidate.weighted_score
    }

    pub fn status(&self) -> EvaluationStatus {
        self.candidate.status()
    }

    pub fn evaluation(&self) -> Option<&EvaluationRecord> {
        self.candidate.outcome.evaluation()
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.candidate.outcome.diagnostic()
    }
}
