//! HTTP request handlers for the iFlow proxy API.
//!
//! This module contains the chat completion relay, model listing,
//! the health probe, and the metrics endpoint.

use crate::api::models::*;
use crate::api::streaming::relay_upstream_stream;
use crate::api::upstream::UpstreamClient;
use crate::core::config::AppConfig;
use crate::core::metrics::get_metrics;
use crate::core::middleware::ModelName;
use crate::core::{get_request_id, AppError, Result};
use crate::services::ModelAliasTable;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub aliases: ModelAliasTable,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: AppConfig, aliases: ModelAliasTable, upstream: UpstreamClient) -> Self {
        Self {
            config,
            aliases,
            upstream,
        }
    }

    /// Build state with the built-in alias table and a pooled upstream client.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let upstream = UpstreamClient::from_config(&config)?;
        Ok(Self::new(config, ModelAliasTable::builtin(), upstream))
    }
}

/// Decode the inbound body leniently.
///
/// An empty body or a JSON array is treated as a request with no fields.
/// Bytes that are not JSON, and bare JSON scalars (`5`, `"x"`, `null`), are rejected.
pub fn parse_chat_request(body: &[u8]) -> Result<ChatCompletionRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ChatCompletionRequest::default());
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| AppError::InvalidBody(e.to_string()))?;

    match value {
        Value::Object(_) => {
            serde_json::from_value(value).map_err(|e| AppError::InvalidBody(e.to_string()))
        }
        Value::Array(_) => Ok(ChatCompletionRequest::default()),
        _ => Err(AppError::InvalidBody(
            "expected a JSON object or array".to_string(),
        )),
    }
}

/// Relay a chat completion request to the upstream.
///
/// The model is substituted through the alias table; streaming requests are
/// relayed chunk by chunk, other responses are returned byte for byte.
#[utoipa::path(
    post,
    path = "/v1/chat/completions",
    tag = "completions",
    request_body = ChatCompletionRequest,
    responses(
        (status = 200, description = "Upstream completion, or an event stream when `stream` is true", body = ChatCompletionResponse),
        (status = 400, description = "Body is not JSON", body = ApiErrorResponse),
        (status = 500, description = "Upstream unreachable", body = ApiErrorResponse)
    )
)]
pub async fn chat_completions(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request = match parse_chat_request(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(request_id = %get_request_id(), error = %e, "Rejected chat completion body");
            return e.into_response();
        }
    };

    let requested_model = request.model_name().map(str::to_string);
    let payload = UpstreamRequest::from_chat(request, &state.aliases);
    let model = payload.model.clone();

    let mut response = match relay(&state, &payload).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(
                request_id = %get_request_id(),
                requested_model = ?requested_model,
                model = %model,
                url = %state.upstream.url(),
                status = e.status_code().as_u16(),
                category = %e.category(),
                error = %e,
                "Proxy error"
            );
            get_metrics()
                .upstream_errors
                .with_label_values(&[&model, e.category().as_str()])
                .inc();
            e.into_response()
        }
    };

    response.extensions_mut().insert(ModelName(model));
    response
}

/// Single upstream round trip for an already-built payload.
async fn relay(state: &AppState, payload: &UpstreamRequest) -> Result<Response> {
    tracing::debug!(
        request_id = %get_request_id(),
        model = %payload.model,
        stream = payload.stream,
        "Relaying chat completion request"
    );

    let start = Instant::now();
    let upstream_response = state.upstream.send(payload).await?;
    get_metrics()
        .upstream_latency
        .with_label_values(&[&payload.model])
        .observe(start.elapsed().as_secs_f64());

    if payload.stream {
        return Ok(relay_upstream_stream(upstream_response, payload.model.clone()));
    }

    let body = upstream_response.bytes().await?;
    record_token_usage(&body, &payload.model);

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

/// Record token usage metrics from a buffered completion body.
fn record_token_usage(body: &[u8], model: &str) {
    let usage = match serde_json::from_slice::<UsageEnvelope>(body) {
        Ok(UsageEnvelope { usage: Some(usage) }) => usage,
        _ => return,
    };

    let metrics = get_metrics();
    metrics
        .token_usage
        .with_label_values(&[model, "prompt"])
        .inc_by(usage.prompt_tokens);
    metrics
        .token_usage
        .with_label_values(&[model, "completion"])
        .inc_by(usage.completion_tokens);
    metrics
        .token_usage
        .with_label_values(&[model, "total"])
        .inc_by(usage.total_tokens);

    tracing::debug!(
        request_id = %get_request_id(),
        model = %model,
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        total_tokens = usage.total_tokens,
        "Token usage recorded"
    );
}

/// List the caller-facing model aliases.
#[utoipa::path(
    get,
    path = "/v1/models",
    tag = "models",
    responses(
        (status = 200, description = "Model catalog", body = ModelList)
    )
)]
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelList> {
    let created = chrono::Utc::now().timestamp_millis();
    Json(ModelList::from_aliases(&state.aliases, created))
}

/// Liveness probe, independent of upstream reachability.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Prometheus metrics endpoint.
pub async fn metrics_handler() -> Result<Response> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response())
}
