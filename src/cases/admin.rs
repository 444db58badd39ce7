//! Admin-only moderation and analytics routes. All of them need the token
//! produced by the admin login case.

use async_trait::async_trait;

use super::{expect, CaseContext, TestCase};
use crate::client::RequestSpec;
use crate::runner::error::CaseError;

pub struct AdminPendingApprovals;

#[async_trait]
impl TestCase for AdminPendingApprovals {
    fn name(&self) -> &'static str {
        "Admin Pending Approvals"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = pending(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn pending(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    let token = ctx.session.require_admin_token()?;
    let body = ctx
        .fetch_json(&RequestSpec::get("/admin/pending").bearer(&token), 200)
        .await?;
    let pending = expect::list(&body, "pending", "Missing pending field")?;
    Ok(format!("Found {} pending approvals", pending.len()))
}

pub struct AdminApproveProfessional;

#[async_trait]
impl TestCase for AdminApproveProfessional {
    fn name(&self) -> &'static str {
        "Admin Approve Professional"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = approve(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn approve(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    let token = ctx.session.require_admin_token()?;
    let id = ctx.session.require_professional_id()?;

    let spec = RequestSpec::put(format!("/admin/approve/{}", id)).bearer(&token);
    let body = ctx.fetch_json(&spec, 200).await?;
    expect::keys(&body, &["message"], "Missing message field")?;
    Ok(format!(
        "Professional approved: {}",
        expect::text(&body, "message")
    ))
}

pub struct AdminStats;

#[async_trait]
impl TestCase for AdminStats {
    fn name(&self) -> &'static str {
        "Admin Stats"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = stats(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn stats(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    let token = ctx.session.require_admin_token()?;
    let body = ctx
        .fetch_json(&RequestSpec::get("/admin/stats").bearer(&token), 200)
        .await?;
    expect::keys(
        &body,
        &["stats", "categoryBreakdown"],
        "Missing stats or categoryBreakdown",
    )?;

    let total = expect::lookup(&body, "stats.totalProfessionals")
        .and_then(|v| v.as_u64())
        .unwrap_or(0);
    Ok(format!("Stats retrieved. Total professionals: {}", total))
}
