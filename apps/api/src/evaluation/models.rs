use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Reasoning text used for every category of a fallback record.
pub const FALLBACK_REASONING: &str = "Error parsing response";

/// One scored dimension of a CV evaluation.
///
/// `score` is expected in [0, 10] but is never range-checked. The inner fields are
/// read leniently: anything the model omits or sends as `null` defaults to empty / zero,
/// and a list sent as one comma-separated string is split into items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryEvaluation {
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub reasoning: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub gaps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallEvaluation {
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub reasoning: String,
}

/// A complete structured evaluation. All four sub-records are required on decode:
/// a reply missing any of them does not produce a record at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub skills: CategoryEvaluation,
    pub experience: CategoryEvaluation,
    pub education: CategoryEvaluation,
    pub overall: OverallEvaluation,
}

impl EvaluationRecord {
    /// Zero-filled record substituted when a reply cannot be parsed.
    pub fn fallback() -> Self {
        let category = CategoryEvaluation {
            score: 0.0,
            reasoning: FALLBACK_REASONING.to_string(),
            strengths: vec![],
            gaps: vec![],
        };
        Self {
            skills: category.clone(),
            experience: category.clone(),
            education: category,
            overall: OverallEvaluation {
                score: 0.0,
                reasoning: FALLBACK_REASONING.to_string(),
            },
        }
    }
}

/// Accepts `7`, `7.5`, `"7.5"`, `"7/10"` and `null` (as 0).
fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Number(f64),
        Text(String),
        Null(()),
    }

    match RawScore::deserialize(deserializer)? {
        RawScore::Number(n) => Ok(n),
        RawScore::Null(()) => Ok(0.0),
        RawScore::Text(text) => {
            let numerator = text.split('/').next().unwrap_or_default().trim();
            numerator
                .parse::<f64>()
                .map_err(|_| de::Error::custom(format!("invalid score '{text}'")))
        }
    }
}

/// `null` becomes empty; numbers and other scalars keep their JSON text.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Accepts an array, `null` (empty) or a single string split on `,` / `;`.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(value_text).collect(),
        Value::String(text) => text
            .split([',', ';'])
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        other => value_text(other).into_iter().collect(),
    })
}

fn value_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_full_deserializes_correctly() {
        let json = r#"{
            "skills": {"score": 8, "reasoning": "Strong Rust", "strengths": ["Rust", "Tokio"], "gaps": ["Kafka"]},
            "experience": {"score": 6.5, "reasoning": "Mid-level", "strengths": [], "gaps": []},
            "education": {"score": 10, "reasoning": "CS degree", "strengths": ["MSc"], "gaps": []},
            "overall": {"score": 7, "reasoning": "Good fit"}
        }"#;

        let record: EvaluationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.skills.score, 8.0);
        assert_eq!(record.skills.strengths, vec!["Rust", "Tokio"]);
        assert_eq!(record.skills.gaps, vec!["Kafka"]);
        assert_eq!(record.experience.score, 6.5);
        assert_eq!(record.education.reasoning, "CS degree");
        assert_eq!(record.overall.score, 7.0);
    }

    #[test]
    fn test_missing_category_is_rejected() {
        let json = r#"{
            "skills": {"score": 8},
            "experience": {"score": 6},
            "overall": {"score": 7}
        }"#;
        assert!(serde_json::from_str::<EvaluationRecord>(json).is_err());
    }

    #[test]
    fn test_inner_fields_default_when_omitted() {
        let json = r#"{
            "skills": {},
            "experience": {"score": 3},
            "education": {"score": null},
            "overall": {}
        }"#;
        let record: EvaluationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.skills, CategoryEvaluation::default());
        assert_eq!(record.experience.score, 3.0);
        assert_eq!(record.education.score, 0.0);
        assert!(record.overall.reasoning.is_empty());
    }

    #[test]
    fn test_string_scores_are_accepted() {
        let json = r#"{
            "skills": {"score": "7.5"},
            "experience": {"score": "8/10"},
            "education": {"score": 9},
            "overall": {"score": "8"}
        }"#;
        let record: EvaluationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.skills.score, 7.5);
        assert_eq!(record.experience.score, 8.0);
        assert_eq!(record.overall.score, 8.0);
    }

    #[test]
    fn test_non_numeric_score_is_rejected() {
        let json = r#"{
            "skills": {"score": "excellent"},
            "experience": {"score": 1},
            "education": {"score": 1},
            "overall": {"score": 1}
        }"#;
        assert!(serde_json::from_str::<EvaluationRecord>(json).is_err());
    }

    #[test]
    fn test_out_of_range_scores_pass_through() {
        let json = r#"{
            "skills": {"score": 42},
            "experience": {"score": -3},
            "education": {"score": 0},
            "overall": {"score": 11}
        }"#;
        let record: EvaluationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.skills.score, 42.0);
        assert_eq!(record.experience.score, -3.0);
    }

    #[test]
    fn test_fallback_shape() {
        let record = EvaluationRecord::fallback();
        for category in [&record.skills, &record.experience, &record.education] {
            assert_eq!(category.score, 0.0);
            assert_eq!(category.reasoning, FALLBACK_REASONING);
            assert!(category.strengths.is_empty());
            assert!(category.gaps.is_empty());
        }
        assert_eq!(record.overall.score, 0.0);
        assert_eq!(record.overall.reasoning, FALLBACK_REASONING);
    }

    #[test]
    fn test_null_text_and_lists_default_to_empty() {
        let json = r#"{
            "skills": {"score": 8, "reasoning": null, "strengths": null, "gaps": [null, "Kafka"]},
            "experience": {"score": 6, "reasoning": "ok", "gaps": null},
            "education": {"score": 10},
            "overall": {"score": 7, "reasoning": null}
        }"#;
        let record: EvaluationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.skills.score, 8.0);
        assert!(record.skills.reasoning.is_empty());
        assert!(record.skills.strengths.is_empty());
        assert_eq!(record.skills.gaps, vec!["Kafka"]);
        assert!(record.experience.gaps.is_empty());
        assert!(record.overall.reasoning.is_empty());
    }

    #[test]
    fn test_string_list_is_split_into_items() {
        let json = r#"{
            "skills": {"score": 8, "strengths": "Rust, Go; Tokio", "gaps": "Kafka"},
            "experience": {"score": 6, "strengths": ["Acme", 5]},
            "education": {"score": 10, "reasoning": 42},
            "overall": {"score": 7}
        }"#;
        let record: EvaluationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.skills.strengths, vec!["Rust", "Go", "Tokio"]);
        assert_eq!(record.skills.gaps, vec!["Kafka"]);
        assert_eq!(record.experience.strengths, vec!["Acme", "5"]);
        assert_eq!(record.education.reasoning, "42");
    }
}
