//! Marketplace API test cases and the ordered suites built from them.
//!
//! Each case follows the same shape: check the session for anything it
//! depends on, issue one or two requests, validate status and JSON shape,
//! then record exactly one result. The composite error case is the only one
//! that records several.

pub mod admin;
pub mod auth;
pub mod errors;
pub mod expect;
pub mod extended;
pub mod public;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::client::{ApiClient, ApiResponse, RequestSpec};
use crate::runner::error::CaseError;
use crate::runner::recorder::ResultRecorder;
use crate::runner::session::SessionState;
use crate::utils::config::Config;

/// Everything a case may touch while it runs
pub struct CaseContext<'a> {
    pub client: &'a ApiClient,
    pub config: &'a Config,
    pub session: &'a mut SessionState,
    pub recorder: &'a mut ResultRecorder,
}

impl CaseContext<'_> {
    pub async fn send(&self, spec: &RequestSpec) -> Result<ApiResponse, CaseError> {
        Ok(self.client.send(spec).await?)
    }

    /// Send, require `expected` status, and parse the body as JSON
    pub async fn fetch_json(&self, spec: &RequestSpec, expected: u16) -> Result<Value, CaseError> {
        let res = self.send(spec).await?;
        expect::status(&res, expected)?;
        expect::json(&res)
    }

    /// Record the outcome of a simple case and return whether it passed
    pub fn settle(&mut self, name: &str, outcome: Result<String, CaseError>) -> bool {
        match outcome {
            Ok(message) => self.recorder.record(name, true, &message, None),
            Err(e) => {
                log::debug!("{} failed with {}", name, e.kind());
                self.recorder.record(name, false, &e.to_string(), e.details())
            }
        }
    }
}

#[async_trait]
pub trait TestCase: Send + Sync {
    /// Name used in result records
    fn name(&self) -> &'static str;

    /// Returns whether the case passed. An `Err` is an unexpected fault; the
    /// runner records it against `name()` and moves on.
    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError>;
}

pub type Suite = Vec<Box<dyn TestCase>>;

/// Core cases in dependency order: registration before anything that needs
/// the professional, admin login before the admin-only routes.
pub fn core_suite() -> Suite {
    vec![
        Box::new(public::RootEndpoint),
        Box::new(public::CategoriesEndpoint),
        Box::new(auth::ProfessionalRegistration),
        Box::new(auth::ProfessionalLogin),
        Box::new(auth::AdminLogin),
        Box::new(public::ListProfessionals),
        Box::new(public::SearchProfessionals),
        Box::new(admin::AdminPendingApprovals),
        Box::new(admin::AdminApproveProfessional),
        Box::new(admin::AdminStats),
        Box::new(public::ProfileViewTracking),
        Box::new(errors::ErrorCases),
    ]
}

/// Additional routes of the marketplace, run after the core suite
pub fn extended_cases() -> Suite {
    vec![
        Box::new(extended::CurrentUser),
        Box::new(extended::UpdateProfile),
        Box::new(extended::ProfileUpdateAuthorization),
        Box::new(extended::ContactClickTracking),
        Box::new(extended::SubmitReview),
        Box::new(extended::AdminPendingReviews),
        Box::new(extended::AdminApproveReview),
        Box::new(extended::ProfessionalReviews),
        Box::new(extended::AdminAllProfessionals),
        Box::new(extended::AdminRejectProfessional),
    ]
}

pub fn build_suite(extended: bool) -> Suite {
    let mut suite = core_suite();
    if extended {
        suite.extend(extended_cases());
    }
    suite
}

#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("Test case '{name}' not found. Available cases: {}", .available.join(", "))]
    UnknownCase { name: String, available: Vec<String> },
}

/// Keep only cases matching one of `filters` (case-insensitive exact name or
/// prefix), preserving suite order. An empty filter list keeps everything.
pub fn select(suite: Suite, filters: &[String]) -> Result<Suite, SuiteError> {
    if filters.is_empty() {
        return Ok(suite);
    }

    let matches = |case: &dyn TestCase, filter: &str| {
        let name = case.name().to_lowercase();
        let filter = filter.to_lowercase();
        name == filter || name.starts_with(&filter)
    };

    for filter in filters {
        if !suite.iter().any(|case| matches(case.as_ref(), filter.as_str())) {
            return Err(SuiteError::UnknownCase {
                name: filter.clone(),
                available: suite.iter().map(|c| c.name().to_string()).collect(),
            });
        }
    }

    Ok(suite
        .into_iter()
        .filter(|case| filters.iter().any(|f| matches(case.as_ref(), f.as_str())))
        .collect())
}
