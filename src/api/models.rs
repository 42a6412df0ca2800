//! API request and response models.
//!
//! Inbound requests are deliberately loose: every field is optional and kept
//! as raw JSON, so that whatever the caller sent can be relayed without
//! validation. [`UpstreamRequest`] is the normalized body sent to iFlow.

use crate::services::ModelAliasTable;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Temperature sent when the caller gives none (or a falsy one).
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Token limit sent when the caller gives none (or a falsy one).
pub const DEFAULT_MAX_TOKENS: u64 = 2000;

/// Service name reported by the health probe.
pub const SERVICE_NAME: &str = "OpenAI to iFlow Proxy";

/// Owner label reported for every listed model.
pub const MODEL_OWNER: &str = "iflow-proxy";

/// Chat completion request following the OpenAI API shape.
///
/// Fields other than these five are accepted and not forwarded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "model": "gpt-4",
    "messages": [
        {"role": "system", "content": "You are a helpful assistant."},
        {"role": "user", "content": "Hello!"}
    ],
    "temperature": 0.7,
    "max_tokens": 1000,
    "stream": false
}))]
pub struct ChatCompletionRequest {
    /// Caller-facing model identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,

    /// Conversation messages, relayed unchanged (an explicit `null` included)
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub messages: Option<Value>,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Value>,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<Value>,

    /// Whether to stream the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<Value>,
}

impl ChatCompletionRequest {
    /// Requested model name, if the caller sent a string.
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_ref().and_then(Value::as_str)
    }

    /// Stream flag coerced by truthiness (absent means false).
    pub fn is_stream(&self) -> bool {
        self.stream.as_ref().map(is_truthy).unwrap_or(false)
    }
}

/// Request body sent to the upstream `/chat/completions` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamRequest {
    /// Upstream model resolved through the alias table
    pub model: String,

    /// Caller messages, omitted when the caller sent none
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub messages: Option<Value>,

    pub temperature: Value,

    pub max_tokens: Value,

    pub stream: bool,
}

impl UpstreamRequest {
    /// Derive the upstream request from a caller request.
    ///
    /// `temperature` and `max_tokens` are relayed when truthy and replaced by
    /// their defaults otherwise, so an explicit `0` also gets the default.
    pub fn from_chat(request: ChatCompletionRequest, aliases: &ModelAliasTable) -> Self {
        let model = aliases.resolve(request.model_name()).to_string();
        let stream = request.is_stream();

        Self {
            model,
            messages: request.messages,
            temperature: truthy_or(request.temperature, Value::from(DEFAULT_TEMPERATURE)),
            max_tokens: truthy_or(request.max_tokens, Value::from(DEFAULT_MAX_TOKENS)),
            stream,
        }
    }
}

/// Keeps a present JSON `null` as `Some(Value::Null)`; only a missing key is `None`.
fn present_value<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn truthy_or(value: Option<Value>, default: Value) -> Value {
    value.filter(is_truthy).unwrap_or(default)
}

/// JSON truthiness: `null`, `false`, `0` and `""` are falsy, everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A single message in a completion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"role": "assistant", "content": "Hello!"}))]
pub struct Message {
    /// Role: "system", "user", or "assistant"
    pub role: String,

    /// Message content
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completion response, as returned by the upstream.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "chatcmpl-abc123",
    "object": "chat.completion",
    "created": 1677858242,
    "model": "glm-4.6",
    "choices": [{
        "index": 0,
        "message": {"role": "assistant", "content": "Hello! How can I help you today?"},
        "finish_reason": "stop"
    }],
    "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
}))]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<Choice>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// A single choice in the response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Choice {
    pub index: u32,
    pub message: Message,
    pub finish_reason: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Only the `usage` object of a completion, for metrics.
#[derive(Debug, Deserialize)]
pub(crate) struct UsageEnvelope {
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Model information.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"id": "gpt-4", "object": "model", "created": 1760601600000i64, "owned_by": "iflow-proxy"}))]
pub struct ModelInfo {
    pub id: String,
    pub object: String,
    /// Listing time in Unix milliseconds
    pub created: i64,
    pub owned_by: String,
}

/// List of available models.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<ModelInfo>,
}

impl ModelList {
    /// Catalog of every alias, stamped with `created`.
    pub fn from_aliases(aliases: &ModelAliasTable, created: i64) -> Self {
        Self {
            object: "list".to_string(),
            data: aliases
                .aliases()
                .map(|alias| ModelInfo {
                    id: alias.to_string(),
                    object: "model".to_string(),
                    created,
                    owned_by: MODEL_OWNER.to_string(),
                })
                .collect(),
        }
    }
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"status": "ok", "service": "OpenAI to iFlow Proxy"}))]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            service: SERVICE_NAME.to_string(),
        }
    }
}

/// Error response for API errors.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": {
        "message": "Request failed with status code 429",
        "type": "invalid_request_error",
        "code": 429
    }
}))]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail in API error responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(value: Value) -> ChatCompletionRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_gpt4_request_gets_defaults() {
        let request = parse(json!({
            "model": "gpt-4",
            "messages": [{"role": "user", "content": "hi"}]
        }));
        let upstream = UpstreamRequest::from_chat(request, &ModelAliasTable::builtin());

        assert_eq!(
            serde_json::to_value(&upstream).unwrap(),
            json!({
                "model": "glm-4.6",
                "messages": [{"role": "user", "content": "hi"}],
                "temperature": 0.7,
                "max_tokens": 2000,
                "stream": false
            })
        );
    }

    #[test]
    fn test_unknown_model_uses_default() {
        let request = parse(json!({"model": "foo", "messages": []}));
        let upstream = UpstreamRequest::from_chat(request, &ModelAliasTable::builtin());
        assert_eq!(upstream.model, "TBStars2-200B-A13B");
    }

    #[test]
    fn test_absent_and_non_string_model_use_default() {
        let aliases = ModelAliasTable::builtin();

        let upstream = UpstreamRequest::from_chat(parse(json!({})), &aliases);
        assert_eq!(upstream.model, "TBStars2-200B-A13B");

        let upstream = UpstreamRequest::from_chat(parse(json!({"model": 4})), &aliases);
        assert_eq!(upstream.model, "TBStars2-200B-A13B");
    }

    #[test]
    fn test_caller_values_are_relayed() {
        let request = parse(json!({
            "model": "gpt-4o",
            "messages": [{"role": "user", "content": "hi"}],
            "temperature": 0.2,
            "max_tokens": 64,
            "stream": true
        }));
        let upstream = UpstreamRequest::from_chat(request, &ModelAliasTable::builtin());

        assert_eq!(upstream.model, "deepseek-v3.2");
        assert_eq!(upstream.temperature, json!(0.2));
        assert_eq!(upstream.max_tokens, json!(64));
        assert!(upstream.stream);
    }

    #[test]
    fn test_falsy_values_get_defaults() {
        let request = parse(json!({
            "model": "gpt-4",
            "temperature": 0,
            "max_tokens": null,
            "stream": 0
        }));
        let upstream = UpstreamRequest::from_chat(request, &ModelAliasTable::builtin());

        assert_eq!(upstream.temperature, json!(0.7));
        assert_eq!(upstream.max_tokens, json!(2000));
        assert!(!upstream.stream);
    }

    #[test]
    fn test_stream_coerced_by_truthiness() {
        assert!(parse(json!({"stream": "yes"})).is_stream());
        assert!(parse(json!({"stream": 1})).is_stream());
        assert!(!parse(json!({"stream": ""})).is_stream());
        assert!(!parse(json!({"stream": false})).is_stream());
        assert!(!parse(json!({})).is_stream());
    }

    #[test]
    fn test_absent_messages_are_omitted() {
        let upstream = UpstreamRequest::from_chat(parse(json!({})), &ModelAliasTable::builtin());
        let json = serde_json::to_value(&upstream).unwrap();
        assert!(json.get("messages").is_none());
    }

    #[test]
    fn test_null_messages_are_forwarded() {
        let request = parse(json!({"model": "gpt-4", "messages": null}));
        assert_eq!(request.messages, Some(Value::Null));

        let upstream = UpstreamRequest::from_chat(request, &ModelAliasTable::builtin());
        let json = serde_json::to_value(&upstream).unwrap();
        assert_eq!(json.get("messages"), Some(&Value::Null));
    }

    #[test]
    fn test_extra_fields_not_forwarded() {
        let request = parse(json!({
            "model": "gpt-4",
            "messages": [],
            "top_p": 0.9,
            "tools": []
        }));
        let upstream = UpstreamRequest::from_chat(request, &ModelAliasTable::builtin());
        let json = serde_json::to_string(&upstream).unwrap();
        assert!(!json.contains("top_p"));
        assert!(!json.contains("tools"));
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_model_list_from_aliases() {
        let list = ModelList::from_aliases(&ModelAliasTable::builtin(), 1234);
        assert_eq!(list.object, "list");
        assert_eq!(list.data.len(), 6);
        assert_eq!(list.data[0].id, "gpt-3.5-turbo");
        assert!(list
            .data
            .iter()
            .all(|m| m.object == "model" && m.owned_by == "iflow-proxy" && m.created == 1234));
    }

    #[test]
    fn test_health_response_default() {
        let json = serde_json::to_value(HealthResponse::default()).unwrap();
        assert_eq!(json, json!({"status": "ok", "service": "OpenAI to iFlow Proxy"}));
    }

    #[test]
    fn test_usage_envelope() {
        let envelope: UsageEnvelope = serde_json::from_str(
            r#"{"id":"x","usage":{"prompt_tokens":10,"completion_tokens":20,"total_tokens":30}}"#,
        )
        .unwrap();
        let usage = envelope.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 10);
        assert_eq!(usage.total_tokens, 30);

        let envelope: UsageEnvelope = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(envelope.usage.is_none());
    }

    #[test]
    fn test_completion_response_deserialization() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1,
            "model": "glm-4.6",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hi"},
                "finish_reason": "stop"
            }]
        }))
        .unwrap();
        assert_eq!(response.choices[0].message.content.as_deref(), Some("Hi"));
        assert!(response.usage.is_none());
    }
}
