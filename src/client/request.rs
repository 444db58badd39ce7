use serde_json::Value;

use super::method::HttpMethod;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// One outgoing call, built per request and consumed by `ApiClient::send`
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub auth_token: Option<String>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: Vec::new(),
            auth_token: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, path).json(body)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Attach `Authorization: Bearer <token>`
    pub fn bearer(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_string());
        self
    }

    /// Full URL for this request against `base_url`
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url, self.path)
    }

    /// Final header set: JSON content type, then caller headers (replacing
    /// same-named entries), then the bearer token if present.
    pub fn merged_headers(&self) -> Vec<(String, String)> {
        let mut merged = vec![("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string())];

        for (name, value) in &self.headers {
            upsert(&mut merged, name, value);
        }

        if let Some(token) = &self.auth_token {
            upsert(&mut merged, "Authorization", &format!("Bearer {}", token));
        }

        merged
    }
}

fn upsert(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
    {
        Some(entry) => entry.1 = value.to_string(),
        None => headers.push((name.to_string(), value.to_string())),
    }
}
