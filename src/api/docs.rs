//! OpenAPI documentation for the proxy endpoints.

use utoipa::OpenApi;

/// OpenAPI documentation for the OpenAI-compatible endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::chat_completions,
        crate::api::handlers::list_models,
        crate::api::handlers::health,
    ),
    components(
        schemas(
            crate::api::models::ChatCompletionRequest,
            crate::api::models::ChatCompletionResponse,
            crate::api::models::Message,
            crate::api::models::Choice,
            crate::api::models::Usage,
            crate::api::models::ModelList,
            crate::api::models::ModelInfo,
            crate::api::models::HealthResponse,
            crate::api::models::ApiErrorResponse,
            crate::api::models::ApiErrorDetail,
        )
    ),
    tags(
        (name = "completions", description = "OpenAI-compatible chat completions relayed to iFlow"),
        (name = "models", description = "Caller-facing model aliases"),
        (name = "health", description = "Liveness probe")
    ),
    info(
        title = "iFlow Proxy API",
        version = "1.0.0",
        description = "OpenAI-compatible API relayed to the iFlow chat completions API.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://127.0.0.1:3000", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_endpoints() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/v1/chat/completions"));
        assert!(paths.iter().any(|p| p.as_str() == "/v1/models"));
        assert!(paths.iter().any(|p| p.as_str() == "/health"));
    }

    #[test]
    fn test_openapi_serializes() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("ChatCompletionRequest"));
        assert!(json.contains("iFlow Proxy API"));
    }
}
