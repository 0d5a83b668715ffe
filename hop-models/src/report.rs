//! The report format: one line, `"traceroutes":` followed by a JSON array of records.

use thiserror::Error;

use crate::record::TracerouteRecord;

pub const REPORT_PREFIX: &str = "\"traceroutes\":";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("report does not start with the `\"traceroutes\":` prefix")]
    MissingPrefix,

    #[error("report body is not a valid list of traceroutes: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn render(records: &[TracerouteRecord]) -> Result<String, ReportError> {
    let body = serde_json::to_string(records)?;
    Ok(format!("{}{}", REPORT_PREFIX, body))
}

pub fn parse(report: &str) -> Result<Vec<TracerouteRecord>, ReportError> {
    let body = report
        .trim_end()
        .strip_prefix(REPORT_PREFIX)
        .ok_or(ReportError::MissingPrefix)?;
    Ok(serde_json::from_str(body)?)
}
