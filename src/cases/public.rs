//! Read-only public routes: root, categories, listing, search and profile views.

use async_trait::async_trait;

use super::{expect, CaseContext, TestCase};
use crate::client::RequestSpec;
use crate::runner::error::CaseError;

pub struct RootEndpoint;

#[async_trait]
impl TestCase for RootEndpoint {
    fn name(&self) -> &'static str {
        "Root Endpoint"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = root(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn root(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    let body = ctx.fetch_json(&RequestSpec::get("/"), 200).await?;
    expect::keys(&body, &["message", "categories"], "Missing expected fields in response")?;
    Ok(format!(
        "Root endpoint working. Message: {}",
        expect::text(&body, "message")
    ))
}

pub struct CategoriesEndpoint;

#[async_trait]
impl TestCase for CategoriesEndpoint {
    fn name(&self) -> &'static str {
        "Categories Endpoint"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = categories(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn categories(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    let body = ctx.fetch_json(&RequestSpec::get("/categories"), 200).await?;
    let categories = expect::list(&body, "categories", "Missing or invalid categories field")?;
    Ok(format!(
        "Categories endpoint working. Found {} categories",
        categories.len()
    ))
}

pub struct ListProfessionals;

#[async_trait]
impl TestCase for ListProfessionals {
    fn name(&self) -> &'static str {
        "Get Professionals"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = list_professionals(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn list_professionals(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    const MISSING: &str = "Missing professionals or pagination data";

    let body = ctx
        .fetch_json(&RequestSpec::get("/professionals?limit=10"), 200)
        .await?;
    expect::keys(&body, &["pagination.total"], MISSING)?;
    let professionals = expect::list(&body, "professionals", MISSING)?;
    Ok(format!(
        "Found {} professionals (total: {})",
        professionals.len(),
        expect::text(&body, "pagination.total")
    ))
}

pub struct SearchProfessionals;

/// Filters the search case queries with
pub const SEARCH_CATEGORY: &str = "Psychologist";
pub const SEARCH_COUNTRY: &str = "Nigeria";

#[async_trait]
impl TestCase for SearchProfessionals {
    fn name(&self) -> &'static str {
        "Search Professionals"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = search(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn search(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    let path = format!(
        "/search?category={}&country={}",
        SEARCH_CATEGORY, SEARCH_COUNTRY
    );
    let body = ctx.fetch_json(&RequestSpec::get(path), 200).await?;
    expect::keys(
        &body,
        &["professionals", "filters", "pagination"],
        "Missing expected fields in search response",
    )?;
    let found = body["professionals"].as_array().map_or(0, Vec::len);
    Ok(format!(
        "Search working. Found {} professionals with filters: {}",
        found, body["filters"]
    ))
}

/// Reads the registered profile twice and expects the view counter to grow
pub struct ProfileViewTracking;

#[async_trait]
impl TestCase for ProfileViewTracking {
    fn name(&self) -> &'static str {
        "Professional Profile View"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = profile_views(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

const PROFILE_VIEWS: &str = "professional.analytics.profileViews";

async fn profile_views(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    let id = ctx.session.require_professional_id()?;
    let spec = RequestSpec::get(format!("/professionals/{}", id));

    let initial = read_views(ctx, &spec)
        .await
        .map_err(|e| relabel(e, "initial profile"))?;

    tokio::time::sleep(ctx.config.view_settle_delay).await;

    let current = read_views(ctx, &spec)
        .await
        .map_err(|e| relabel(e, "second profile view"))?;

    if current > initial {
        Ok(format!(
            "View tracking working. Views: {} → {}",
            initial, current
        ))
    } else {
        Err(CaseError::ShapeMismatch {
            message: format!(
                "View count not incremented. Views: {} → {}",
                initial, current
            ),
            detail: serde_json::json!({ "initial": initial, "current": current }),
        })
    }
}

async fn read_views(ctx: &CaseContext<'_>, spec: &RequestSpec) -> Result<i64, CaseError> {
    let body = ctx.fetch_json(spec, 200).await?;
    expect::lookup(&body, PROFILE_VIEWS)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| CaseError::shape("Missing profileViews", &body))
}

/// Name which of the two reads went wrong
fn relabel(err: CaseError, which: &str) -> CaseError {
    match err {
        CaseError::Transport(_) | CaseError::StatusMismatch { .. } => CaseError::ShapeMismatch {
            message: format!("Failed to get {}", which),
            detail: err.details().unwrap_or_default(),
        },
        CaseError::InvalidJson { detail } | CaseError::ShapeMismatch { detail, .. } => {
            CaseError::ShapeMismatch {
                message: format!("Invalid {} response", which),
                detail,
            }
        }
        other => other,
    }
}
