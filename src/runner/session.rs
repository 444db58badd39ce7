use super::error::CaseError;

/// Credentials and ids carried between cases during one run.
///
/// Registration and the login cases write here; dependent cases read through
/// the `require_*` accessors, which turn an unset field into a
/// `PreconditionMissing` failure instead of a network call.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub base_url: String,
    pub professional_token: Option<String>,
    pub admin_token: Option<String>,
    pub test_professional_id: Option<String>,
    pub test_professional_email: Option<String>,
    pub test_review_id: Option<String>,
}

impl SessionState {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn require_admin_token(&self) -> Result<String, CaseError> {
        require(&self.admin_token, "admin token")
    }

    pub fn require_professional_token(&self) -> Result<String, CaseError> {
        require(&self.professional_token, "professional token")
    }

    pub fn require_professional_id(&self) -> Result<String, CaseError> {
        require(&self.test_professional_id, "test professional ID")
    }

    pub fn require_professional_email(&self) -> Result<String, CaseError> {
        require(&self.test_professional_email, "test professional email")
    }

    pub fn require_review_id(&self) -> Result<String, CaseError> {
        require(&self.test_review_id, "test review ID")
    }
}

fn require(field: &Option<String>, what: &str) -> Result<String, CaseError> {
    field
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CaseError::missing(what))
}
