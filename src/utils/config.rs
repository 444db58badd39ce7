use std::time::Duration;

/// Deployed API root the suite targets when no override is given
pub const DEFAULT_BASE_URL: &str = "https://profconnect-22.preview.emergentagent.com/api";

/// Per-request timeout applied to every call
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Harness configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API root, without trailing slash
    pub base_url: String,

    /// Timeout for every HTTP call
    pub timeout: Duration,

    /// Pause between the two profile reads of the view-tracking case
    pub view_settle_delay: Duration,

    /// Pre-provisioned admin account
    pub admin_email: String,
    pub admin_password: String,

    /// Password used for the professional registered during the run
    pub professional_password: String,

    /// Append the supplemental cases after the core suite
    pub extended: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            view_settle_delay: Duration::from_secs(1),
            admin_email: "admin@expertbridge.com".to_string(),
            admin_password: "admin123".to_string(),
            professional_password: "SecurePass123!".to_string(),
            extended: false,
        }
    }
}

impl Config {
    /// Default config pointed at another API root
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            ..Self::default()
        }
    }
}

/// Strip trailing slashes so `base + "/path"` never doubles up
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
