use colored::Colorize;

use super::types::RunReport;

const RULE_WIDTH: usize = 60;

/// Final summary block followed by the full ordered result log
pub fn render_summary(report: &RunReport) -> String {
    let summary = &report.summary;
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", rule));
    out.push_str(&format!("{}\n", "■ TEST SUMMARY".blue().bold()));
    out.push_str(&format!("{}\n", rule));
    out.push_str(&format!(
        "  {} {}\n",
        "✓ Passed:".green(),
        summary.passed
    ));
    out.push_str(&format!("  {} {}\n", "✗ Failed:".red(), summary.failed));
    out.push_str(&format!("  Total: {}\n", summary.total));
    out.push_str(&format!("  Success Rate: {:.1}%\n", summary.success_rate));

    out.push_str(&format!("\n{}\n", "DETAILED RESULTS:".bold()));
    for result in &report.results {
        let mark = if result.success {
            "✓".green()
        } else {
            "✗".red()
        };
        out.push_str(&format!("{} {}: {}\n", mark, result.name, result.message));
    }

    out
}

/// Opening banner for a run
pub fn render_banner(base_url: &str) -> String {
    format!(
        "{} Starting ExpertBridge Backend API Tests\nBase URL: {}\n{}",
        "▶".green().bold(),
        base_url.cyan(),
        "=".repeat(RULE_WIDTH)
    )
}
