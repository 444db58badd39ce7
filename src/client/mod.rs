//! HTTP client wrapper for the marketplace API.
//!
//! Every call goes through [`ApiClient::send`], which never raises on
//! network trouble: DNS errors, refused connections and timeouts come back
//! as a [`TransportFailure`] for the calling case to record.

pub mod method;
pub mod request;
pub mod response;

use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::utils::config::{normalize_base_url, Config};

pub use method::HttpMethod;
pub use request::RequestSpec;
pub use response::ApiResponse;

/// Network-level failure reaching the API
#[derive(Debug, Error)]
pub enum TransportFailure {
    #[error("{method} {url} timed out after {}s", .timeout.as_secs())]
    Timeout {
        method: HttpMethod,
        url: String,
        timeout: Duration,
    },

    #[error("{method} {url} could not connect: {source}")]
    Connect {
        method: HttpMethod,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} failed: {source}")]
    Other {
        method: HttpMethod,
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: normalize_base_url(&config.base_url),
            timeout: config.timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Dispatch one request. Non-2xx statuses are returned as ordinary
    /// responses; only transport problems produce an error.
    pub async fn send(&self, spec: &RequestSpec) -> Result<ApiResponse, TransportFailure> {
        let url = spec.url(&self.base_url);
        log::debug!(
            "{} {} (auth: {})",
            spec.method,
            url,
            if spec.auth_token.is_some() { "bearer" } else { "none" }
        );

        let mut req = self.http.request(spec.method.into(), &url);
        for (name, value) in spec.merged_headers() {
            req = req.header(name, value);
        }
        if spec.method.carries_body() {
            if let Some(body) = &spec.body {
                req = req.body(body.to_string());
            }
        }

        let started = Instant::now();
        let result = async {
            let res = req.send().await?;
            let status = res.status().as_u16();
            let body = res.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        }
        .await;

        match result {
            Ok((status, body)) => {
                let duration_ms = started.elapsed().as_millis() as u64;
                log::debug!("{} {} -> {} ({}ms)", spec.method, url, status, duration_ms);
                Ok(ApiResponse {
                    status,
                    body,
                    duration_ms,
                })
            }
            Err(e) => {
                let failure = self.classify(spec.method, url, e);
                log::warn!("{}", failure);
                Err(failure)
            }
        }
    }

    fn classify(&self, method: HttpMethod, url: String, source: reqwest::Error) -> TransportFailure {
        if source.is_timeout() {
            TransportFailure::Timeout {
                method,
                url,
                timeout: self.timeout,
            }
        } else if source.is_connect() {
            TransportFailure::Connect {
                method,
                url,
                source,
            }
        } else {
            TransportFailure::Other {
                method,
                url,
                source,
            }
        }
    }
}
