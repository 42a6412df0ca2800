//! iFlow Proxy - an OpenAI-compatible relay for the iFlow API
//!
//! Callers speak the OpenAI chat completions API; requests are forwarded to
//! iFlow's wire-compatible endpoint with:
//!
//! - **Model Aliasing**: OpenAI/Claude model names mapped to iFlow models
//! - **Streaming Passthrough**: Server-Sent Events relayed chunk by chunk
//! - **Verbatim Responses**: upstream JSON bodies returned byte for byte
//! - **Metrics & Monitoring**: Prometheus metrics at `/metrics`
//!
//! # Architecture
//!
//! - [`core`]: Core functionality (config, errors, logging, metrics, middleware)
//! - [`api`]: HTTP handlers, models, upstream client, and router
//! - [`services`]: The model alias table
//!
//! # Configuration
//!
//! Environment variables, read once at startup:
//! - `IFLOW_API_KEY`: Bearer credential for the upstream
//! - `IFLOW_API_BASE`: Upstream base URL (default: https://apis.iflow.cn/v1)
//! - `HOST`: Server bind address (default: 0.0.0.0)
//! - `PORT`: Server port (default: 3000)
//! - `VERIFY_SSL`: Verify SSL certificates for upstream (default: true)
//! - `REQUEST_TIMEOUT_SECS`: Upstream request timeout in seconds (default: none)

pub mod api;
pub mod core;
pub mod services;

// Re-export commonly used types for convenience
pub use api::{build_router, AppState, ChatCompletionRequest, UpstreamClient, UpstreamRequest};
pub use core::{AppConfig, AppError, Result};
pub use services::ModelAliasTable;
