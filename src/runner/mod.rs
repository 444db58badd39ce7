pub mod error;
pub mod recorder;
pub mod session;
pub mod state;

use anyhow::Result;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;

use crate::cases::{CaseContext, Suite, TestCase};
use crate::client::ApiClient;
use crate::report::RunReport;
use crate::utils::config::Config;

pub use error::CaseError;
pub use recorder::{Echo, ResultRecorder};
pub use session::SessionState;
pub use state::{RunSummary, TestResult};

/// Executes a suite in order against one API root
pub struct Runner {
    client: ApiClient,
    config: Config,
    session: SessionState,
    recorder: ResultRecorder,
    cases: Suite,
}

impl Runner {
    pub fn new(config: Config, cases: Suite, echo: Echo) -> Result<Self> {
        let client = ApiClient::new(&config)?;
        let session = SessionState::new(client.base_url());
        Ok(Self {
            client,
            config,
            session,
            recorder: ResultRecorder::new(echo),
            cases,
        })
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn results(&self) -> &[TestResult] {
        self.recorder.results()
    }

    pub fn into_results(self) -> Vec<TestResult> {
        self.recorder.into_results()
    }

    /// Run every case once, sequentially. A failing or faulting case never
    /// stops the ones after it.
    pub async fn run_all(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();

        for case in &self.cases {
            self.recorder.section(case.name());

            let mut ctx = CaseContext {
                client: &self.client,
                config: &self.config,
                session: &mut self.session,
                recorder: &mut self.recorder,
            };
            let passed = run_guarded(case.as_ref(), &mut ctx).await;
            summary.record(passed);
        }

        log::info!(
            "run finished: {} passed, {} failed",
            summary.passed,
            summary.failed
        );
        summary
    }
}

/// Run `cases` against the configured API and collect the report
pub async fn run_suite(config: Config, cases: Suite, echo: Echo) -> Result<RunReport> {
    let run_id = uuid::Uuid::new_v4().to_string();
    log::info!("run {} against {} ({} cases)", run_id, config.base_url, cases.len());

    let mut runner = Runner::new(config, cases, echo)?;
    let summary = runner.run_all().await;
    let base_url = runner.session().base_url.clone();

    Ok(RunReport::new(&run_id, &base_url, summary, runner.into_results()))
}

/// Fault boundary: an `Err` or a panic out of a case becomes a failure
/// record under the case's name.
async fn run_guarded(case: &dyn TestCase, ctx: &mut CaseContext<'_>) -> bool {
    let outcome = AssertUnwindSafe(case.run(ctx)).catch_unwind().await;

    let fault = match outcome {
        Ok(Ok(passed)) => return passed,
        Ok(Err(e)) => match e {
            CaseError::Unhandled(_) => e,
            other => CaseError::Unhandled(other.to_string()),
        },
        Err(panic) => CaseError::Unhandled(panic_message(panic.as_ref())),
    };

    log::warn!("{} aborted: {}", case.name(), fault);
    ctx.recorder.record(case.name(), false, &fault.to_string(), None)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
