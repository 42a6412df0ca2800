//! API layer for the iFlow proxy server.
//!
//! This module contains the HTTP handlers, request/response models,
//! the upstream client, and streaming passthrough.

pub mod docs;
pub mod handlers;
pub mod models;
pub mod router;
pub mod streaming;
pub mod upstream;

// Re-export commonly used types
pub use docs::ApiDoc;
pub use handlers::{chat_completions, health, list_models, metrics_handler, AppState};
pub use models::{
    ChatCompletionRequest, ChatCompletionResponse, HealthResponse, ModelInfo, ModelList,
    UpstreamRequest,
};
pub use router::build_router;
pub use streaming::create_sse_stream;
pub use upstream::UpstreamClient;
