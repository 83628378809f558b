use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::evaluation::models::EvaluationRecord;

/// Category weights for the weighted score. Expected in [0, 1] and to sum to 1.0,
/// but only negative or non-finite values are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationWeights {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
}

impl Default for EvaluationWeights {
    fn default() -> Self {
        Self {
            skills: 0.4,
            experience: 0.4,
            education: 0.2,
        }
    }
}

impl EvaluationWeights {
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("skills", self.skills),
            ("experience", self.experience),
            ("education", self.education),
        ] {
            if !value.is_finite() {
                return Err(format!("{name} weight must be a finite number"));
            }
            if value < 0.0 {
                return Err(format!("{name} weight must not be negative, got {value}"));
            }
        }
        Ok(())
    }
}

/// `skills*w.skills + experience*w.experience + education*w.education`, unclamped.
///
/// A non-finite result (e.g. a model returning `1e308` scores) is logged and scored 0.0.
pub fn weighted_score(record: &EvaluationRecord, weights: &EvaluationWeights) -> f64 {
    let score = record.skills.score * weights.skills
        + record.experience.score * weights.experience
        + record.education.score * weights.education;

    if score.is_finite() {
        score
    } else {
        warn!("Error calculating weighted score: result {score} is not finite, using 0.0");
        0.0
    }
}
