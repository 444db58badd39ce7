use super::types::RunReport;
use anyhow::Result;

/// Pretty JSON rendering of a run
pub fn render(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
