pub mod console;
pub mod json;
pub mod junit;
pub mod types;

use anyhow::Result;

pub use types::{ReportSummary, RunReport};

/// Output format for the end-of-run report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Colored summary and result log
    #[default]
    Text,
    /// Pretty-printed JSON document
    Json,
    /// JUnit XML
    Junit,
}

impl ReportFormat {
    /// Machine-readable formats own stdout; live lines move to stderr
    pub fn is_machine_readable(self) -> bool {
        !matches!(self, ReportFormat::Text)
    }
}

/// Render the report in the requested format
pub fn render(report: &RunReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(console::render_summary(report)),
        ReportFormat::Json => json::render(report),
        ReportFormat::Junit => junit::generate_junit_xml(report),
    }
}
