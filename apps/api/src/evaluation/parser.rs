//! Response Parser: turns a free-form model reply into an [`EvaluationRecord`].
//!
//! The reply is expected to contain a JSON object but may wrap it in prose or code
//! fences, or mangle it entirely. Each strategy below is a pure function tried in a
//! fixed order; the first one that decodes a complete record wins. A reply that no
//! strategy can decode yields a [`ParseFailure`] carrying a zero-filled fallback
//! record, so the caller can still score the CV (as zero) and surface a warning.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::evaluation::models::EvaluationRecord;

/// Number of characters of the raw reply kept for diagnostics.
pub const PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    /// Greedy `{...}` substrings of the reply.
    BraceScan,
    /// The body of the first ```` ```json ```` fence.
    LabeledFence,
    /// Every fenced block, in order.
    AnyFence,
    /// The reply verbatim.
    WholeReply,
    /// First `{` through last `}` of the reply.
    OuterBraces,
}

type Strategy = fn(&str) -> Option<EvaluationRecord>;

const STRATEGIES: [(ParseStrategy, Strategy); 5] = [
    (ParseStrategy::BraceScan, brace_scan),
    (ParseStrategy::LabeledFence, labeled_fence),
    (ParseStrategy::AnyFence, any_fence),
    (ParseStrategy::WholeReply, whole_reply),
    (ParseStrategy::OuterBraces, outer_braces),
];

/// A successfully decoded reply and the strategy that decoded it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub record: EvaluationRecord,
    pub strategy: ParseStrategy,
}

/// No strategy could decode the reply. `fallback` is a usable zero-filled record.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Could not parse JSON from response. Raw response: {preview}...")]
pub struct ParseFailure {
    pub preview: String,
    pub fallback: EvaluationRecord,
}

impl ParseFailure {
    fn new(content: &str) -> Self {
        Self {
            preview: preview(content),
            fallback: EvaluationRecord::fallback(),
        }
    }
}

/// Runs every strategy in order and returns the first complete record.
pub fn parse_evaluation(content: &str) -> Result<ParsedReply, ParseFailure> {
    STRATEGIES
        .iter()
        .find_map(|(strategy, run)| {
            run(content).map(|record| ParsedReply {
                record,
                strategy: *strategy,
            })
        })
        .ok_or_else(|| ParseFailure::new(content))
}

/// First [`PREVIEW_CHARS`] characters of `content`.
pub fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_CHARS).collect()
}

fn decode(candidate: &str) -> Option<EvaluationRecord> {
    serde_json::from_str(candidate.trim()).ok()
}

fn brace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid brace pattern"))
}

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```(?:\w*\n)?([\s\S]*?)```").expect("valid fence pattern"))
}

fn brace_scan(content: &str) -> Option<EvaluationRecord> {
    brace_regex()
        .find_iter(content)
        .find_map(|candidate| decode(candidate.as_str()))
}

fn labeled_fence(content: &str) -> Option<EvaluationRecord> {
    let (_, after) = content.split_once("```json")?;
    let body = after.split("```").next().unwrap_or(after);
    decode(body)
}

fn any_fence(content: &str) -> Option<EvaluationRecord> {
    fence_regex()
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .find_map(|block| decode(block.as_str()))
}

fn whole_reply(content: &str) -> Option<EvaluationRecord> {
    decode(content)
}

fn outer_braces(content: &str) -> Option<EvaluationRecord> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    decode(&content[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::models::FALLBACK_REASONING;

    const VALID: &str = r#"{
        "skills": {"score": 8, "reasoning": "Rust", "strengths": ["Rust"], "gaps": []},
        "experience": {"score": 6, "reasoning": "Some", "strengths": [], "gaps": ["Leadership"]},
        "education": {"score": 10, "reasoning": "MSc", "strengths": [], "gaps": []},
        "overall": {"score": 8, "reasoning": "Good"}
    }"#;

    fn assert_fallback(failure: &ParseFailure) {
        assert_eq!(failure.fallback, EvaluationRecord::fallback());
        assert_eq!(failure.fallback.skills.reasoning, FALLBACK_REASONING);
    }

    #[test]
    fn test_bare_json_uses_brace_scan() {
        let parsed = parse_evaluation(VALID).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::BraceScan);
        assert_eq!(parsed.record.skills.score, 8.0);
        assert_eq!(parsed.record.experience.gaps, vec!["Leadership"]);
    }

    #[test]
    fn test_json_surrounded_by_prose_uses_brace_scan() {
        let reply = format!("Here is my evaluation:\n{VALID}\nLet me know if you need more.");
        let parsed = parse_evaluation(&reply).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::BraceScan);
        assert_eq!(parsed.record.education.score, 10.0);
    }

    #[test]
    fn test_labeled_fence_alone_is_won_by_brace_scan() {
        // The only braces in the reply are the fenced object, so the first strategy
        // already validates it.
        let reply = format!("Evaluation:\n```json\n{VALID}\n```\nDone.");
        let parsed = parse_evaluation(&reply).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::BraceScan);
    }

    #[test]
    fn test_falls_through_to_labeled_fence() {
        // Trailing prose with braces makes the greedy brace match undecodable.
        let reply = format!("```json\n{VALID}\n```\nNote: scores use the {{0-10}} scale.");
        let parsed = parse_evaluation(&reply).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::LabeledFence);
        assert_eq!(parsed.record.overall.score, 8.0);
    }

    #[test]
    fn test_falls_through_to_unlabeled_fence() {
        let reply = format!("```\n{VALID}\n```\nScale is {{0-10}}.");
        let parsed = parse_evaluation(&reply).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::AnyFence);
    }

    #[test]
    fn test_unlabeled_fences_tried_in_order() {
        let reply = format!("```\nnot json {{\n```\nthen\n```text\n{VALID}\n```\n}} trailing");
        let parsed = parse_evaluation(&reply).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::AnyFence);
        assert_eq!(parsed.record.skills.strengths, vec!["Rust"]);
    }

    #[test]
    fn test_missing_education_is_parse_failure() {
        let reply = r#"{
            "skills": {"score": 8},
            "experience": {"score": 6},
            "overall": {"score": 7}
        }"#;
        let failure = parse_evaluation(reply).unwrap_err();
        assert_fallback(&failure);
    }

    #[test]
    fn test_empty_reply_is_parse_failure() {
        let failure = parse_evaluation("").unwrap_err();
        assert!(failure.preview.is_empty());
        assert_fallback(&failure);
    }

    #[test]
    fn test_malformed_braces_never_panic() {
        for reply in ["}{", "{", "}", "{{{{", "} text {", "```json", "```", "``````json```"] {
            let failure = parse_evaluation(reply).unwrap_err();
            assert_fallback(&failure);
        }
    }

    #[test]
    fn test_deep_nesting_never_panics() {
        let reply = format!("{}{}", "{\"a\":".repeat(10_000), "}".repeat(10_000));
        assert!(parse_evaluation(&reply).is_err());
    }

    #[test]
    fn test_binary_garbage_is_parse_failure() {
        let bytes: Vec<u8> = (0..=255u8).cycle().take(2048).collect();
        let reply = String::from_utf8_lossy(&bytes);
        let failure = parse_evaluation(&reply).unwrap_err();
        assert_eq!(failure.preview.chars().count(), PREVIEW_CHARS);
        assert_fallback(&failure);
    }

    #[test]
    fn test_failure_message_carries_truncated_preview() {
        let reply = "x".repeat(2_000);
        let failure = parse_evaluation(&reply).unwrap_err();
        assert_eq!(failure.preview.len(), PREVIEW_CHARS);
        let message = failure.to_string();
        assert!(message.starts_with("Could not parse JSON from response. Raw response: xxx"));
        assert!(message.ends_with("..."));
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let reply = "é".repeat(600);
        assert_eq!(preview(&reply).chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn test_outer_braces_rejects_reversed_braces() {
        assert!(outer_braces("} nothing {").is_none());
    }

    #[test]
    fn test_each_strategy_alone() {
        assert!(brace_scan(VALID).is_some());
        assert!(labeled_fence(&format!("```json\n{VALID}\n```")).is_some());
        assert!(any_fence(&format!("```\n{VALID}\n```")).is_some());
        assert!(whole_reply(VALID).is_some());
        assert!(outer_braces(&format!("prefix {VALID} suffix")).is_some());
        assert!(labeled_fence(VALID).is_none());
        assert!(any_fence(VALID).is_none());
    }

    #[test]
    fn test_null_and_string_fields_still_parse() {
        let replies = [
            r#"{"skills": {"score": 8, "reasoning": null}, "experience": {"score": 6}, "education": {"score": 10}, "overall": {"score": 8}}"#,
            r#"{"skills": {"score": 8, "gaps": null}, "experience": {"score": 6}, "education": {"score": 10}, "overall": {"score": 8}}"#,
            r#"{"skills": {"score": 8, "strengths": "Rust, Go"}, "experience": {"score": 6}, "education": {"score": 10}, "overall": {"score": 8}}"#,
        ];
        for reply in replies {
            let parsed = parse_evaluation(reply).unwrap();
            assert_eq!(parsed.strategy, ParseStrategy::BraceScan);
            assert_eq!(parsed.record.skills.score, 8.0);
            assert_eq!(parsed.record.education.score, 10.0);
        }
    }
}

