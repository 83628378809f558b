//! Result export: one CSV row per ranked CV, or the full report as JSON.

use csv::Writer;
use thiserror::Error;

use crate::ranking::outcome::RankedResult;
use crate::ranking::report::ReportSummary;

pub const CSV_HEADER: [&str; 9] = [
    "Rank",
    "Filename",
    "Weighted Score",
    "Skills Score",
    "Experience Score",
    "Education Score",
    "Overall Score",
    "Status",
    "Diagnostic",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Export produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Ranked results as CSV. Category columns are blank for failed CVs.
pub fn to_csv(results: &[RankedResult]) -> Result<String, ExportError> {
    let mut wtr = Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;

    for result in results {
        let scores = match result.evaluation() {
            Some(e) => [
                e.skills.score,
                e.experience.score,
                e.education.score,
                e.overall.score,
            ]
            .map(|score| score.to_string()),
            None => Default::default(),
        };

        wtr.write_record([
            result.rank.to_string(),
            result.filename().to_string(),
            format!("{:.2}", result.weighted_score()),
            scores[0].clone(),
            scores[1].clone(),
            scores[2].clone(),
            scores[3].clone(),
            result.status().to_string(),
            result.diagnostic().unwrap_or_default().to_string(),
        ])?;
    }

    wtr.flush()?;
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Every field of the report, pretty-printed.
pub fn to_json(report: &ReportSummary) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(report)?)
}
