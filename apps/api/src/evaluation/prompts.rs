// Prompt constants for CV evaluation.

/// System prompt for CV evaluation.
pub const EVALUATION_SYSTEM: &str = "You are an expert HR recruiter with deep experience in CV evaluation. \
    Your task is to evaluate CVs against job descriptions and provide detailed scoring on \
    skills, experience, and education match. Be objective and thorough in your assessment.\n\n\
    Follow these guidelines:\n\
    1. Analyze the CV against the job description systematically\n\
    2. Provide numerical scores for each category (skills, experience, education)\n\
    3. Justify each score with specific evidence from the CV\n\
    4. Identify both strengths and gaps for each category\n\
    5. Provide your assessment in the exact JSON format requested";

/// Evaluation prompt template. Replace `{job_description}` and `{cv_text}` before sending.
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"# Job Description
{job_description}

# CV to Evaluate
{cv_text}

# Evaluation Criteria
Evaluate this CV against the job description using the following criteria:
1. Skills Match (0-10): How well do the candidate's skills align with job requirements?
2. Experience Match (0-10): How relevant is the candidate's work experience?
3. Education Match (0-10): How suitable is the candidate's educational background?
4. Overall Fit (0-10): Overall assessment of candidate suitability

For each criterion, provide:
- Score (0-10)
- Detailed reasoning for your score
- Specific strengths and gaps identified

# Output Format
Provide your evaluation in the following JSON format:
```json
{
  "skills": {
    "score": 0-10,
    "reasoning": "detailed explanation",
    "strengths": ["strength1", "strength2"],
    "gaps": ["gap1", "gap2"]
  },
  "experience": {
    "score": 0-10,
    "reasoning": "detailed explanation",
    "strengths": ["strength1", "strength2"],
    "gaps": ["gap1", "gap2"]
  },
  "education": {
    "score": 0-10,
    "reasoning": "detailed explanation",
    "strengths": ["strength1", "strength2"],
    "gaps": ["gap1", "gap2"]
  },
  "overall": {
    "score": 0-10,
    "reasoning": "detailed explanation"
  }
}
```"#;

/// Builds the user prompt for one CV.
///
/// The CV text is substituted last so a CV containing the literal
/// `{job_description}` cannot pull the job description into itself.
pub fn build_evaluation_prompt(job_description: &str, cv_text: &str) -> String {
    let (head, tail) = EVALUATION_PROMPT_TEMPLATE
        .split_once("{cv_text}")
        .unwrap_or((EVALUATION_PROMPT_TEMPLATE, ""));
    format!(
        "{}{}{}",
        head.replace("{job_description}", job_description),
        cv_text,
        tail
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_both_inputs() {
        let prompt = build_evaluation_prompt("Senior Rust Engineer", "Ten years of Rust");
        assert!(prompt.contains("# Job Description\nSenior Rust Engineer"));
        assert!(prompt.contains("# CV to Evaluate\nTen years of Rust"));
        assert!(!prompt.contains("{job_description}"));
        assert!(!prompt.contains("{cv_text}"));
    }

    #[test]
    fn test_placeholders_inside_cv_are_not_expanded() {
        let prompt = build_evaluation_prompt("JD", "I wrote {job_description} templates");
        assert!(prompt.contains("I wrote {job_description} templates"));
    }

    #[test]
    fn test_template_requests_all_categories() {
        for key in ["\"skills\"", "\"experience\"", "\"education\"", "\"overall\""] {
            assert!(EVALUATION_PROMPT_TEMPLATE.contains(key), "missing {key}");
        }
    }
}
