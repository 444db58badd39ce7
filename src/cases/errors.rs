//! Negative checks: the API must reject bad input with the right status.
//! One case, three records.

use async_trait::async_trait;
use serde_json::json;

use super::{CaseContext, TestCase};
use crate::client::RequestSpec;
use crate::runner::error::CaseError;

struct ErrorProbe {
    name: &'static str,
    expected: u16,
    passed: &'static str,
    failed: &'static str,
}

pub struct ErrorCases;

impl ErrorCases {
    fn probes() -> [(ErrorProbe, RequestSpec); 3] {
        [
            (
                ErrorProbe {
                    name: "Error Case - Missing Fields",
                    expected: 400,
                    passed: "Correctly rejected registration with missing fields",
                    failed: "Should reject registration with missing fields",
                },
                RequestSpec::post("/auth/register", json!({ "email": "test@test.com" })),
            ),
            (
                ErrorProbe {
                    name: "Error Case - Invalid Login",
                    expected: 401,
                    passed: "Correctly rejected invalid login",
                    failed: "Should reject invalid login credentials",
                },
                RequestSpec::post(
                    "/auth/login",
                    json!({ "email": "invalid@test.com", "password": "wrong" }),
                ),
            ),
            (
                ErrorProbe {
                    name: "Error Case - Unauthorized Admin",
                    expected: 401,
                    passed: "Correctly rejected unauthorized admin access",
                    failed: "Should reject unauthorized admin access",
                },
                RequestSpec::get("/admin/pending"),
            ),
        ]
    }
}

#[async_trait]
impl TestCase for ErrorCases {
    fn name(&self) -> &'static str {
        "Error Cases"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let mut all_passed = true;

        for (probe, spec) in Self::probes() {
            let status = ctx.send(&spec).await.ok().map(|res| res.status);
            let passed = status == Some(probe.expected);

            if passed {
                ctx.recorder.record(probe.name, true, probe.passed, None);
            } else {
                let got = status.map_or_else(|| "None".to_string(), |s| s.to_string());
                let message = format!("{}. Got status: {}", probe.failed, got);
                ctx.recorder.record(probe.name, false, &message, None);
            }
            all_passed &= passed;
        }

        Ok(all_passed)
    }
}
