//! Remaining marketplace routes: session introspection, profile updates,
//! contact tracking, reviews and the rest of moderation. Enabled with
//! `--extended`; they rely on the same session state as the core suite.

use async_trait::async_trait;
use serde_json::json;

use super::{expect, CaseContext, TestCase};
use crate::client::RequestSpec;
use crate::runner::error::CaseError;

pub struct CurrentUser;

#[async_trait]
impl TestCase for CurrentUser {
    fn name(&self) -> &'static str {
        "Current User"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = current_user(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn current_user(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    let token = ctx.session.require_professional_token()?;
    let body = ctx
        .fetch_json(&RequestSpec::get("/auth/me").bearer(&token), 200)
        .await?;
    expect::keys(&body, &["user.id", "role"], "Missing user or role")?;

    let role = expect::text(&body, "role");
    if role != "professional" {
        return Err(CaseError::shape(
            &format!("Unexpected role: {}", role),
            &body,
        ));
    }
    Ok(format!(
        "Token resolves to professional {}",
        expect::text(&body, "user.id")
    ))
}

pub struct UpdateProfile;

/// Phone number written by the profile update case
pub const UPDATED_PHONE: &str = "+234-801-555-0199";

#[async_trait]
impl TestCase for UpdateProfile {
    fn name(&self) -> &'static str {
        "Update Professional Profile"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = update_profile(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn update_profile(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    let token = ctx.session.require_professional_token()?;
    let id = ctx.session.require_professional_id()?;
    let payload = json!({
        "phone": UPDATED_PHONE,
        "bio": "Clinical psychologist focused on anxiety and mood disorders, \
                offering in-person and virtual sessions across Lagos.",
    });

    let spec = RequestSpec::put(format!("/professionals/{}", id))
        .json(payload)
        .bearer(&token);
    let body = ctx.fetch_json(&spec, 200).await?;
    expect::ident(&body, "professional.id", "Missing professional data")?;

    let phone = expect::text(&body, "professional.phone");
    if phone != UPDATED_PHONE {
        return Err(CaseError::shape(
            &format!("Profile update not applied. Phone: {}", phone),
            &body,
        ));
    }
    Ok(format!("Profile updated. Phone: {}", phone))
}

/// A profile may only be changed with its owner's token
pub struct ProfileUpdateAuthorization;

#[async_trait]
impl TestCase for ProfileUpdateAuthorization {
    fn name(&self) -> &'static str {
        "Profile Update Authorization"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = anonymous_update(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn anonymous_update(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    let id = ctx.session.require_professional_id()?;
    let spec = RequestSpec::put(format!("/professionals/{}", id)).json(json!({ "bio": "x" }));
    let res = ctx.send(&spec).await?;
    expect::status(&res, 401)?;
    Ok("Correctly rejected profile update without token".to_string())
}

pub struct ContactClickTracking;

#[async_trait]
impl TestCase for ContactClickTracking {
    fn name(&self) -> &'static str {
        "Contact Click Tracking"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = contact_click(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn contact_click(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    let id = ctx.session.require_professional_id()?;
    let spec = RequestSpec::post(format!("/professionals/{}/contact", id), json!({}));
    let body = ctx.fetch_json(&spec, 200).await?;
    expect::keys(&body, &["message"], "Missing message field")?;
    Ok(expect::text(&body, "message"))
}

pub struct SubmitReview;

#[async_trait]
impl TestCase for SubmitReview {
    fn name(&self) -> &'static str {
        "Submit Review"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = submit_review(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn submit_review(ctx: &mut CaseContext<'_>) -> Result<String, CaseError> {
    let id = ctx.session.require_professional_id()?;
    let payload = json!({
        "professionalId": id,
        "clientName": "James Okafor",
        "clientEmail": "james.okafor@example.com",
        "rating": 5,
        "comment": "Very thorough and supportive sessions.",
    });

    let body = ctx
        .fetch_json(&RequestSpec::post("/reviews", payload), 200)
        .await?;
    const MISSING: &str = "Missing message or review data";
    expect::keys(&body, &["message"], MISSING)?;
    let review_id = expect::ident(&body, "review.id", MISSING)?;

    ctx.session.test_review_id = Some(review_id.clone());
    Ok(format!("Review submitted. Review ID: {}", review_id))
}

pub struct AdminApproveReview;

#[async_trait]
impl TestCase for AdminApproveReview {
    fn name(&self) -> &'static str {
        "Admin Approve Review"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = approve_review(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

/// Approve the submitted review, then confirm it is publicly listed
async fn approve_review(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    let token = ctx.session.require_admin_token()?;
    let review_id = ctx.session.require_review_id()?;
    let professional_id = ctx.session.require_professional_id()?;

    let spec = RequestSpec::put(format!("/admin/reviews/{}/approve", review_id)).bearer(&token);
    let body = ctx.fetch_json(&spec, 200).await?;
    expect::keys(&body, &["message"], "Missing message field")?;

    let listed = ctx
        .fetch_json(&RequestSpec::get(format!("/reviews/{}", professional_id)), 200)
        .await?;
    let reviews = expect::list(&listed, "reviews", "Missing reviews field")?;
    if !reviews.iter().any(|r| expect::text(r, "id") == review_id) {
        return Err(CaseError::shape(
            &format!("Approved review {} not listed", review_id),
            &listed,
        ));
    }
    Ok(format!(
        "Review approved and listed. Approved reviews: {}",
        reviews.len()
    ))
}

pub struct ProfessionalReviews;

#[async_trait]
impl TestCase for ProfessionalReviews {
    fn name(&self) -> &'static str {
        "Professional Reviews"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = professional_reviews(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn professional_reviews(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    let id = ctx.session.require_professional_id()?;
    let body = ctx
        .fetch_json(&RequestSpec::get(format!("/reviews/{}", id)), 200)
        .await?;
    let reviews = expect::list(&body, "reviews", "Missing reviews field")?;
    Ok(format!("Found {} approved reviews", reviews.len()))
}

pub struct AdminPendingReviews;

#[async_trait]
impl TestCase for AdminPendingReviews {
    fn name(&self) -> &'static str {
        "Admin Pending Reviews"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = pending_reviews(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn pending_reviews(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    let token = ctx.session.require_admin_token()?;
    let body = ctx
        .fetch_json(&RequestSpec::get("/admin/reviews/pending").bearer(&token), 200)
        .await?;
    let reviews = expect::list(&body, "reviews", "Missing reviews field")?;
    Ok(format!("Found {} pending reviews", reviews.len()))
}

pub struct AdminAllProfessionals;

#[async_trait]
impl TestCase for AdminAllProfessionals {
    fn name(&self) -> &'static str {
        "Admin All Professionals"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = all_professionals(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn all_professionals(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    const MISSING: &str = "Missing professionals or pagination data";

    let token = ctx.session.require_admin_token()?;
    let body = ctx
        .fetch_json(&RequestSpec::get("/admin/professionals?limit=20").bearer(&token), 200)
        .await?;
    expect::keys(&body, &["pagination.total"], MISSING)?;
    let professionals = expect::list(&body, "professionals", MISSING)?;
    Ok(format!(
        "Found {} professionals (total: {})",
        professionals.len(),
        expect::text(&body, "pagination.total")
    ))
}

/// Runs last: it moves the registered professional out of the approved set
pub struct AdminRejectProfessional;

#[async_trait]
impl TestCase for AdminRejectProfessional {
    fn name(&self) -> &'static str {
        "Admin Reject Professional"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = reject(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn reject(ctx: &CaseContext<'_>) -> Result<String, CaseError> {
    let token = ctx.session.require_admin_token()?;
    let id = ctx.session.require_professional_id()?;

    let spec = RequestSpec::put(format!("/admin/reject/{}", id))
        .json(json!({ "reason": "Credentials could not be verified" }))
        .bearer(&token);
    let body = ctx.fetch_json(&spec, 200).await?;
    expect::keys(&body, &["message"], "Missing message field")?;

    let rejected = ctx
        .fetch_json(
            &RequestSpec::get("/admin/professionals?status=rejected").bearer(&token),
            200,
        )
        .await?;
    let professionals = expect::list(&rejected, "professionals", "Missing professionals field")?;
    if !professionals.iter().any(|p| expect::text(p, "id") == id) {
        return Err(CaseError::shape(
            &format!("Professional {} not listed as rejected", id),
            &rejected,
        ));
    }
    Ok(format!(
        "Professional rejected: {}",
        expect::text(&body, "message")
    ))
}
