use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::runner::state::{RunSummary, TestResult};

/// Everything known about a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: String,
    pub base_url: String,
    pub generated_at: DateTime<Local>,
    pub summary: ReportSummary,
    pub results: Vec<TestResult>,
}

/// Case tally plus the derived figures printed in the summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub passed: u32,
    pub failed: u32,
    pub total: u32,
    pub success_rate: f64,
}

impl From<RunSummary> for ReportSummary {
    fn from(summary: RunSummary) -> Self {
        Self {
            passed: summary.passed,
            failed: summary.failed,
            total: summary.total(),
            success_rate: summary.success_rate(),
        }
    }
}

impl RunReport {
    pub fn new(run_id: &str, base_url: &str, summary: RunSummary, results: Vec<TestResult>) -> Self {
        Self {
            run_id: run_id.to_string(),
            base_url: base_url.to_string(),
            generated_at: Local::now(),
            summary: summary.into(),
            results,
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.summary.failed == 0 {
            0
        } else {
            1
        }
    }
}
