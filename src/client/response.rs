use serde_json::Value;

/// Response as seen by a test case: status plus the raw body text
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
    pub duration_ms: u64,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            duration_ms: 0,
        }
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Payload to attach to a failure record: parsed JSON when possible,
    /// raw text otherwise
    pub fn detail(&self) -> Value {
        self.json()
            .unwrap_or_else(|_| Value::String(self.body.clone()))
    }
}
