//! Registration and the two login flows. These are the cases that write
//! credentials into the session.

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{expect, CaseContext, TestCase};
use crate::client::RequestSpec;
use crate::runner::error::CaseError;

/// Unique address for this run's professional
pub fn unique_professional_email() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("testpro_{}@expertbridge.com", &id[..8])
}

/// Full profile payload accepted by `/auth/register`
pub fn registration_payload(email: &str, password: &str) -> Value {
    json!({
        "fullName": "Dr. Sarah Johnson",
        "email": email,
        "phone": "+1-555-0123",
        "password": password,
        "category": "Psychologist",
        "subcategory": "Clinical Psychology",
        "bio": "Experienced clinical psychologist with over 10 years of practice specializing in \
                cognitive behavioral therapy, anxiety disorders, and depression treatment. I provide \
                compassionate, evidence-based care to help clients achieve their mental health goals \
                and improve their overall well-being.",
        "experience": 10,
        "location": {
            "country": "Nigeria",
            "state": "Lagos",
            "city": "Lagos"
        },
        "serviceOptions": {
            "inPerson": true,
            "virtual": true,
            "serviceRadius": "state"
        },
        "languages": ["English", "Yoruba"],
        "socialLinks": {
            "linkedin": "https://linkedin.com/in/sarahjohnson",
            "website": "https://drsarahjohnson.com"
        }
    })
}

pub struct ProfessionalRegistration;

#[async_trait]
impl TestCase for ProfessionalRegistration {
    fn name(&self) -> &'static str {
        "Professional Registration"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = register(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn register(ctx: &mut CaseContext<'_>) -> Result<String, CaseError> {
    let email = unique_professional_email();
    let payload = registration_payload(&email, &ctx.config.professional_password);

    let body = ctx
        .fetch_json(&RequestSpec::post("/auth/register", payload), 200)
        .await?;
    const MISSING: &str = "Missing token or professional data";
    let token = expect::ident(&body, "token", MISSING)?;
    let id = expect::ident(&body, "professional.id", MISSING)?;

    ctx.session.professional_token = Some(token);
    ctx.session.test_professional_id = Some(id.clone());
    ctx.session.test_professional_email = Some(email);

    Ok(format!("Registration successful. Professional ID: {}", id))
}

pub struct ProfessionalLogin;

#[async_trait]
impl TestCase for ProfessionalLogin {
    fn name(&self) -> &'static str {
        "Professional Login"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = login(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn login(ctx: &mut CaseContext<'_>) -> Result<String, CaseError> {
    let email = ctx.session.require_professional_email()?;
    let payload = json!({
        "email": email,
        "password": ctx.config.professional_password,
    });

    let body = ctx
        .fetch_json(&RequestSpec::post("/auth/login", payload), 200)
        .await?;
    const MISSING: &str = "Missing token or professional data";
    expect::keys(&body, &["professional"], MISSING)?;
    let token = expect::ident(&body, "token", MISSING)?;

    ctx.session.professional_token = Some(token);
    Ok(format!("Login successful for {}", email))
}

pub struct AdminLogin;

#[async_trait]
impl TestCase for AdminLogin {
    fn name(&self) -> &'static str {
        "Admin Login"
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<bool, CaseError> {
        let outcome = admin_login(ctx).await;
        Ok(ctx.settle(self.name(), outcome))
    }
}

async fn admin_login(ctx: &mut CaseContext<'_>) -> Result<String, CaseError> {
    let payload = json!({
        "email": ctx.config.admin_email,
        "password": ctx.config.admin_password,
    });

    let body = ctx
        .fetch_json(&RequestSpec::post("/auth/admin/login", payload), 200)
        .await?;
    const MISSING: &str = "Missing token or admin data";
    expect::keys(&body, &["admin.fullName"], MISSING)?;
    let token = expect::ident(&body, "token", MISSING)?;

    ctx.session.admin_token = Some(token);
    Ok(format!(
        "Admin login successful. Admin: {}",
        expect::text(&body, "admin.fullName")
    ))
}
