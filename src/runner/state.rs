use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One recorded outcome. Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Local>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl TestResult {
    pub fn new(name: &str, success: bool, message: &str, details: Option<Value>) -> Self {
        Self {
            name: name.to_string(),
            success,
            message: message.to_string(),
            timestamp: Local::now(),
            details,
        }
    }
}

/// Per-case tally produced by the runner
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub passed: u32,
    pub failed: u32,
}

impl RunSummary {
    pub fn record(&mut self, passed: bool) {
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> u32 {
        self.passed + self.failed
    }

    /// Percentage of passing cases; 0.0 when nothing ran
    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.passed as f64 / self.total() as f64 * 100.0
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Process exit status for this run
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}
