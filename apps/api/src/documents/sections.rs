//! Text cleaning and heuristic section segmentation for CVs.
//!
//! Segmentation is line based: a short line that looks like a section header switches
//! the current section; every other line is appended to the current section, which
//! starts as `other`. When a CV has no recognizable skills or education header, those
//! sections are backfilled from keyword-bearing lines of `other`.

use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::documents::SectionKind;

/// Lines longer than this are content, never headers.
const MAX_HEADER_WORDS: usize = 6;

const SKILLS_HEADERS: &[&str] = &[
    r"\b(?:technical\s+)?skills\b",
    r"\bcompetenc(?:y|ies)\b",
    r"\bproficienc(?:y|ies)\b",
    r"\bqualifications\b",
    r"\bcore\s+abilities\b",
    r"\bareas\s+of\s+expertise\b",
];

const EXPERIENCE_HEADERS: &[&str] = &[
    r"\bwork\s+experience\b",
    r"\bemployment\s+(?:history|record)\b",
    r"\bprofessional\s+experience\b",
    r"\bcareer\s+history\b",
    r"\b(?:job|work)\s+history\b",
    r"\bexperience\b",
];

const EDUCATION_HEADERS: &[&str] = &[
    r"\beducation(?:al)?\b",
    r"\bacademic\s+(?:background|history|qualifications|record)\b",
    r"\bdegrees?\b",
];

const EDUCATION_KEYWORDS: &[&str] = &[
    "degree",
    "university",
    "college",
    "school",
    "bachelor",
    "master",
    "phd",
    "diploma",
];

const SKILL_KEYWORDS: &[&str] = &[
    "python", "java", "javascript", "typescript", "rust", "go", "sql", "html", "css", "react",
    "angular", "vue", "node", "django", "flask", "spring", "git", "aws", "azure", "gcp", "docker",
    "kubernetes", "jenkins", "terraform", "agile", "scrum", "kanban", "jira", "linux", "unix",
    "android", "ios", "swift", "kotlin", "c", "c++", "c#", ".net", "ruby", "rails", "php", "excel",
    "powerpoint", "mongodb", "mysql", "postgresql", "oracle", "redis", "elasticsearch", "kafka",
    "figma", "photoshop", "seo", "communication", "teamwork", "leadership", "negotiation",
    "analytical", "research", "writing", "presentation",
    // multi-word keywords are matched as phrases
    "machine learning", "problem solving", "critical thinking", "time management",
    "public speaking", "sql server", "google ads",
];

fn header_patterns() -> &'static [(SectionKind, Regex); 3] {
    static PATTERNS: OnceLock<[(SectionKind, Regex); 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let build = |patterns: &[&str]| {
            Regex::new(&format!("(?i){}", patterns.join("|"))).expect("valid header pattern")
        };
        [
            (SectionKind::Skills, build(SKILLS_HEADERS)),
            (SectionKind::Experience, build(EXPERIENCE_HEADERS)),
            (SectionKind::Education, build(EDUCATION_HEADERS)),
        ]
    })
}

/// Strips control characters, collapses horizontal whitespace, trims every line and
/// folds runs of blank lines into one.
pub fn clean_text(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    for line in raw.lines() {
        let printable: String = line
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        let collapsed = printable.split_whitespace().collect::<Vec<_>>().join(" ");

        if collapsed.is_empty() {
            if lines.last().is_some_and(|last| !last.is_empty()) {
                lines.push(String::new());
            }
        } else {
            lines.push(collapsed);
        }
    }

    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

/// Section header this line introduces, if it is one.
pub fn detect_header(line: &str) -> Option<SectionKind> {
    if line.split_whitespace().count() > MAX_HEADER_WORDS {
        return None;
    }
    header_patterns()
        .iter()
        .find(|(_, pattern)| pattern.is_match(line))
        .map(|(kind, _)| *kind)
}

/// Splits cleaned CV text into sections. Every [`SectionKind`] is present in the map,
/// possibly with an empty string.
pub fn extract_sections(text: &str) -> BTreeMap<SectionKind, String> {
    let mut buckets: BTreeMap<SectionKind, Vec<&str>> =
        SectionKind::ALL.iter().map(|kind| (*kind, Vec::new())).collect();
    let mut current = SectionKind::Other;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match detect_header(line) {
            Some(kind) => current = kind,
            None => buckets.entry(current).or_default().push(line),
        }
    }

    let mut sections: BTreeMap<SectionKind, String> = buckets
        .into_iter()
        .map(|(kind, lines)| (kind, lines.join("\n")))
        .collect();

    backfill_from_other(&mut sections);
    sections
}

fn backfill_from_other(sections: &mut BTreeMap<SectionKind, String>) {
    let other = sections.get(&SectionKind::Other).cloned().unwrap_or_default();
    if other.is_empty() {
        return;
    }

    if section_is_empty(sections, SectionKind::Skills) {
        let skills = lines_matching(&other, contains_skill);
        if !skills.is_empty() {
            sections.insert(SectionKind::Skills, skills);
        }
    }

    if section_is_empty(sections, SectionKind::Education) {
        let education = lines_matching(&other, |line| {
            let lower = line.to_lowercase();
            EDUCATION_KEYWORDS.iter().any(|kw| lower.contains(kw))
        });
        if !education.is_empty() {
            sections.insert(SectionKind::Education, education);
        }
    }
}

fn section_is_empty(sections: &BTreeMap<SectionKind, String>, kind: SectionKind) -> bool {
    sections.get(&kind).map_or(true, |s| s.is_empty())
}

fn lines_matching(text: &str, predicate: impl Fn(&str) -> bool) -> String {
    text.lines()
        .filter(|line| predicate(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whole-token match for single words, phrase match for multi-word keywords.
fn contains_skill(line: &str) -> bool {
    let lower = line.to_lowercase();
    let tokens: HashSet<&str> = lower
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|token| token.trim_end_matches('.'))
        .filter(|token| !token.is_empty())
        .collect();

    SKILL_KEYWORDS.iter().any(|keyword| {
        if keyword.contains(' ') {
            lower.contains(keyword)
        } else {
            tokens.contains(keyword)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace_and_blank_runs() {
        let raw = "  Jane   Doe \r\n\r\n\r\n\tSenior\u{0007}Engineer  \n\n";
        assert_eq!(clean_text(raw), "Jane Doe\n\nSenior Engineer");
    }

    #[test]
    fn test_clean_text_of_whitespace_is_empty() {
        assert_eq!(clean_text("\n \t \n\u{000C}\n"), "");
    }

    #[test]
    fn test_detect_header_variants() {
        assert_eq!(detect_header("TECHNICAL SKILLS"), Some(SectionKind::Skills));
        assert_eq!(detect_header("Work Experience"), Some(SectionKind::Experience));
        assert_eq!(detect_header("Employment History"), Some(SectionKind::Experience));
        assert_eq!(detect_header("Education"), Some(SectionKind::Education));
        assert_eq!(detect_header("Academic Background"), Some(SectionKind::Education));
        assert_eq!(detect_header("Jane Doe"), None);
    }

    #[test]
    fn test_long_lines_are_never_headers() {
        let line = "Gained seven years of experience building distributed systems in Rust";
        assert_eq!(detect_header(line), None);
    }

    #[test]
    fn test_extract_sections_assigns_lines_under_headers() {
        let text = "Jane Doe\njane@example.com\nSkills\nRust, Go\nExperience\nAcme Corp 2019-2024\nLed platform team\nEducation\nMSc Computer Science";
        let sections = extract_sections(text);
        assert_eq!(sections[&SectionKind::Other], "Jane Doe\njane@example.com");
        assert_eq!(sections[&SectionKind::Skills], "Rust, Go");
        assert_eq!(
            sections[&SectionKind::Experience],
            "Acme Corp 2019-2024\nLed platform team"
        );
        assert_eq!(sections[&SectionKind::Education], "MSc Computer Science");
    }

    #[test]
    fn test_every_section_present_even_when_empty() {
        let sections = extract_sections("");
        for kind in SectionKind::ALL {
            assert_eq!(sections[&kind], "");
        }
    }

    #[test]
    fn test_backfills_skills_and_education_from_other() {
        let text = "John Smith\nBuilt services in Python and Docker\nBachelor of Arts, State University\nLikes hiking";
        let sections = extract_sections(text);
        assert_eq!(
            sections[&SectionKind::Skills],
            "Built services in Python and Docker"
        );
        assert_eq!(
            sections[&SectionKind::Education],
            "Bachelor of Arts, State University"
        );
        assert_eq!(sections[&SectionKind::Experience], "");
    }

    #[test]
    fn test_skill_match_is_whole_token() {
        assert!(contains_skill("Fluent in C++ and C#"));
        assert!(contains_skill("Strong problem solving"));
        assert!(!contains_skill("Enjoys cycling and cooking"));
    }

    #[test]
    fn test_no_backfill_when_sections_found() {
        let text = "Skills\nRust\nEducation\nBSc\nBachelor thesis on compilers";
        let sections = extract_sections(text);
        assert_eq!(sections[&SectionKind::Education], "BSc\nBachelor thesis on compilers");
        assert_eq!(sections[&SectionKind::Other], "");
    }
}
