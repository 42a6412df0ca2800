//! Upstream request execution.
//!
//! [`UpstreamClient`] owns the pooled HTTP client plus the read-once base URL
//! and credential, and turns an [`UpstreamRequest`] into exactly one POST.

use crate::api::models::UpstreamRequest;
use crate::core::config::AppConfig;
use crate::core::{AppError, Result};
use anyhow::Context;
use std::error::Error;
use std::time::Duration;

const MAX_ERROR_BODY_LOG_LEN: usize = 500;

/// Client for the upstream chat completions endpoint.
#[derive(Clone)]
pub struct UpstreamClient {
    http_client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl UpstreamClient {
    /// Build a client with connection pooling from the application config.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let http_client = create_http_client(config)?;
        Ok(Self::new(http_client, config))
    }

    /// Wrap an existing HTTP client.
    pub fn new(http_client: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            http_client,
            url: config.chat_completions_url(),
            api_key: config.upstream.api_key.clone(),
        }
    }

    /// Full upstream chat completions URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build the POST with bearer auth and a JSON body.
    pub fn build_request(&self, payload: &UpstreamRequest) -> reqwest::RequestBuilder {
        let mut request = self
            .http_client
            .post(&self.url)
            .header("Content-Type", "application/json");

        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        request.json(payload)
    }

    /// Send the request and return the response when the upstream answered 2xx.
    ///
    /// The body is left unread so the caller can either buffer it or relay it
    /// as a stream. Non-success statuses become [`AppError::UpstreamStatus`].
    pub async fn send(&self, payload: &UpstreamRequest) -> Result<reqwest::Response> {
        let request_id = crate::core::get_request_id();

        let response = self.build_request(payload).send().await.map_err(|e| {
            tracing::debug!(
                request_id = %request_id,
                url = %self.url,
                model = %payload.model,
                error = %e,
                error_source = ?e.source(),
                is_timeout = e.is_timeout(),
                is_connect = e.is_connect(),
                "HTTP request failed to upstream"
            );
            AppError::from(e)
        })?;

        let status = response.status();
        tracing::debug!(
            request_id = %request_id,
            url = %self.url,
            status = %status,
            method = "POST",
            "HTTP request completed"
        );

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(
            request_id = %request_id,
            url = %self.url,
            model = %payload.model,
            status = status.as_u16(),
            body = %truncate(&body, MAX_ERROR_BODY_LOG_LEN),
            "Upstream returned error status"
        );

        Err(AppError::UpstreamStatus {
            status: status.as_u16(),
        })
    }
}

/// Create HTTP client with connection pooling.
///
/// Without `REQUEST_TIMEOUT_SECS` the client has no overall timeout, so long
/// streams are never cut off by the proxy.
pub fn create_http_client(config: &AppConfig) -> anyhow::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .danger_accept_invalid_certs(!config.verify_ssl)
        .pool_max_idle_per_host(100)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60));

    if let Some(timeout) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(timeout));
    }

    builder.build().context("Failed to build HTTP client")
}

fn truncate(message: &str, max_len: usize) -> String {
    if message.chars().count() <= max_len {
        message.to_string()
    } else {
        let truncated: String = message.chars().take(max_len).collect();
        format!("{}...", truncated)
    }
}
