use clap::Parser;
use colored::Colorize;
use std::time::Duration;

use expertbridge_tester::cases::{build_suite, select};
use expertbridge_tester::report::{self, console, ReportFormat};
use expertbridge_tester::runner::{run_suite, Echo};
use expertbridge_tester::utils::config::{Config, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

#[derive(Parser)]
#[command(name = "expertbridge-tester")]
#[command(version = "0.1.0")]
#[command(about = "End-to-end tests for the ExpertBridge marketplace API", long_about = None)]
struct Cli {
    /// API root every request path is appended to
    #[arg(long, env = "EXPERTBRIDGE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Report format printed after the run
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Run only cases whose name matches (case-insensitive, prefix allowed).
    /// Can be specified multiple times.
    #[arg(long)]
    only: Vec<String>,

    /// Also run the review, contact and current-user cases
    #[arg(long, default_value = "false")]
    extended: bool,

    /// List case names in run order and exit
    #[arg(long, default_value = "false")]
    list: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut config = Config::with_base_url(&cli.base_url);
    config.timeout = Duration::from_secs(cli.timeout_secs);
    config.extended = cli.extended;

    if cli.list {
        for case in build_suite(config.extended) {
            println!("{}", case.name());
        }
        return Ok(());
    }

    let suite = match select(build_suite(config.extended), &cli.only) {
        Ok(suite) => suite,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(2);
        }
    };

    let echo = if cli.format.is_machine_readable() {
        eprintln!("{}", console::render_banner(&config.base_url));
        Echo::Stderr
    } else {
        println!("{}", console::render_banner(&config.base_url));
        Echo::Stdout
    };

    let report = run_suite(config, suite, echo).await?;
    println!("{}", report::render(&report, cli.format)?);

    std::process::exit(report.exit_code());
}
