use colored::Colorize;
use serde_json::Value;

use super::state::TestResult;

/// Where live result lines are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    Stdout,
    /// Keeps stdout free for machine-readable reports
    Stderr,
    Silent,
}

/// Append-only, ordered log of results for one run
#[derive(Debug)]
pub struct ResultRecorder {
    results: Vec<TestResult>,
    echo: Echo,
}

impl ResultRecorder {
    pub fn new(echo: Echo) -> Self {
        Self {
            results: Vec::new(),
            echo,
        }
    }

    /// Append a result and print it immediately. Returns `success` so cases
    /// can end with `return ctx.recorder.record(...)`.
    pub fn record(&mut self, name: &str, success: bool, message: &str, details: Option<Value>) -> bool {
        let result = TestResult::new(name, success, message, details);
        self.emit(&format_result_line(&result));
        if let Some(details) = result.details.as_ref().filter(|_| !success) {
            self.emit(&format!("   Details: {}", render_details(details)));
        }
        self.results.push(result);
        success
    }

    /// Header printed before a case starts
    pub fn section(&self, title: &str) {
        self.emit(&format!("\n{}", format!("=== Testing {} ===", title).blue().bold()));
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<TestResult> {
        self.results
    }

    fn emit(&self, line: &str) {
        match self.echo {
            Echo::Stdout => println!("{}", line),
            Echo::Stderr => eprintln!("{}", line),
            Echo::Silent => {}
        }
    }
}

pub fn format_result_line(result: &TestResult) -> String {
    let status = if result.success {
        "✓ PASS".green().bold()
    } else {
        "✗ FAIL".red().bold()
    };
    format!("{}: {} - {}", status, result.name, result.message)
}

/// Strings print bare, everything else as compact JSON
pub fn render_details(details: &Value) -> String {
    match details {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
