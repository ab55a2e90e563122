//! JSON-RPC 2.0 envelope and method dispatch shared by both transports.

use std::sync::Arc;

use lessonmcp_tools::{codes, ToolRegistry};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

pub const SERVER_NAME: &str = "ai-server";
pub const SERVER_VERSION: &str = "0.1.0";
const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

// ─────────────────────────────────────────────
// Envelope types
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    /// `None` when absent; an explicit `"id": null` is kept as `Some(Null)`.
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl RpcRequest {
    /// Parse one message. Malformed JSON is a parse error (-32700); valid
    /// JSON that is not a request object is an invalid request (-32600).
    pub fn parse(raw: &[u8]) -> Result<Self, RpcResponse> {
        let value: Value = serde_json::from_slice(raw).map_err(|e| {
            warn!(error = %e, "Unparseable JSON-RPC message");
            RpcResponse::parse_error(e)
        })?;

        let id = value.get("id").cloned();
        serde_json::from_value(value).map_err(|e| {
            warn!(error = %e, "Malformed JSON-RPC request");
            RpcResponse::error(id, codes::INVALID_REQUEST, format!("Invalid Request: {e}"))
        })
    }

    /// No id member, or an MCP `notifications/*` method: nothing is sent back.
    pub fn is_notification(&self) -> bool {
        self.id.is_none() || self.method.starts_with("notifications/")
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::error(None, codes::PARSE_ERROR, format!("Parse error: {detail}"))
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::error(None, codes::INVALID_REQUEST, message)
    }
}

// ─────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Routes JSON-RPC methods to the tool registry.
pub struct RpcDispatcher {
    registry: Arc<ToolRegistry>,
}

impl RpcDispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Handle one raw line/body. `None` for notifications.
    pub async fn handle_text(&self, raw: &str) -> Option<RpcResponse> {
        let request = match RpcRequest::parse(raw.as_bytes()) {
            Ok(request) => request,
            Err(response) => return Some(response),
        };

        if request.is_notification() {
            debug!(method = %request.method, "Notification received");
            return None;
        }
        Some(self.handle(request).await)
    }

    /// Handle a parsed request and always produce a response.
    pub async fn handle(&self, request: RpcRequest) -> RpcResponse {
        debug!(method = %request.method, "Received JSON-RPC request");

        if let Some(version) = request.jsonrpc.as_deref() {
            if version != "2.0" {
                return RpcResponse::error(
                    request.id,
                    codes::INVALID_REQUEST,
                    "Unsupported jsonrpc version (expected 2.0)",
                );
            }
        }

        let id = request.id.clone();
        match request.method.as_str() {
            "initialize" => RpcResponse::success(id, initialize_result(request.params.as_ref())),
            "ping" => RpcResponse::success(id, json!({})),
            "tools/list" | "list_tools" => RpcResponse::success(id, self.registry.catalog()),
            "tools/call" | "call_tool" => self.call_tool(id, request.params).await,
            other => {
                warn!(method = other, "Unknown JSON-RPC method");
                RpcResponse::error(
                    id,
                    codes::METHOD_NOT_FOUND,
                    format!("Method not supported: {other}"),
                )
            }
        }
    }

    async fn call_tool(&self, id: Option<Value>, params: Option<Value>) -> RpcResponse {
        let params: CallParams = match params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return RpcResponse::error(id, codes::INVALID_PARAMS, format!("Invalid params: {e}"))
            }
            None => {
                return RpcResponse::error(
                    id,
                    codes::INVALID_PARAMS,
                    "Invalid params: expected {name, arguments}",
                )
            }
        };

        match self.registry.call(&params.name, params.arguments).await {
            Ok(output) => match serde_json::to_value(&output) {
                Ok(result) => RpcResponse::success(id, result),
                Err(e) => {
                    error!(tool = %params.name, error = %e, "Failed to serialize tool output");
                    RpcResponse::error(id, codes::INTERNAL_ERROR, e.to_string())
                }
            },
            Err(e) => RpcResponse::error(id, e.code(), e.to_string()),
        }
    }
}

fn initialize_result(params: Option<&Value>) -> Value {
    let protocol_version = params
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);

    json!({
        "protocolVersion": protocol_version,
        "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
        "capabilities": { "tools": {} }
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use lessonmcp_core::config::ToolsConfig;
    use lessonmcp_providers::{BackendError, CompletionBackend, RetryEngine};

    /// Backend that always answers with the same text.
    struct FixedBackend(Result<String, BackendError>);

    #[async_trait]
    impl CompletionBackend for FixedBackend {
        async fn complete(&self, _prompt: &str, _model: &str) -> Result<String, BackendError> {
            self.0.clone()
        }

        fn display_name(&self) -> &str {
            "Fixed"
        }
    }

    pub(crate) fn dispatcher_with(reply: Result<String, BackendError>) -> Arc<RpcDispatcher> {
        let engine =
            RetryEngine::new(Arc::new(FixedBackend(reply)), vec!["m".to_string()], 1).unwrap();
        let registry = ToolRegistry::lesson_tools(Arc::new(engine), &ToolsConfig::default());
        Arc::new(RpcDispatcher::new(Arc::new(registry)))
    }

    pub(crate) fn dispatcher() -> Arc<RpcDispatcher> {
        dispatcher_with(Ok("תשובה".to_string()))
    }

    fn chat_args() -> Value {
        json!({"message": "היי", "currentValues": {}, "history": [], "fieldLabels": {}})
    }

    #[tokio::test]
    async fn test_call_tool_success() {
        let response = dispatcher()
            .handle_text(
                &json!({"jsonrpc": "2.0", "id": 7, "method": "call_tool",
                        "params": {"name": "chat_with_context", "arguments": chat_args()}})
                .to_string(),
            )
            .await
            .unwrap();

        assert_eq!(response.id, Some(json!(7)));
        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], r#"{"response":"תשובה"}"#);
    }

    #[tokio::test]
    async fn test_tools_call_alias() {
        let response = dispatcher()
            .handle_text(
                &json!({"jsonrpc": "2.0", "id": "a", "method": "tools/call",
                        "params": {"name": "chat_with_context", "arguments": chat_args()}})
                .to_string(),
            )
            .await
            .unwrap();
        assert!(response.result.is_some());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let response = dispatcher()
            .handle_text(
                r#"{"jsonrpc":"2.0","id":1,"method":"call_tool","params":{"name":"nope","arguments":{}}}"#,
            )
            .await
            .unwrap();
        assert_eq!(
            response.error,
            Some(RpcError { code: -32601, message: "Unknown tool: nope".into() })
        );
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let response = dispatcher()
            .handle_text(
                r#"{"jsonrpc":"2.0","id":1,"method":"call_tool","params":{"name":"update_lesson_field","arguments":{"message":""}}}"#,
            )
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(error.message.starts_with("Invalid arguments for update_lesson_field"));
    }

    #[tokio::test]
    async fn test_backend_failure_is_internal_error() {
        let d = dispatcher_with(Err(BackendError::api(401, "OpenAI API error: Incorrect API key")));
        let response = d
            .handle(RpcRequest {
                jsonrpc: Some("2.0".into()),
                id: Some(json!(3)),
                method: "call_tool".into(),
                params: Some(json!({"name": "chat_with_context", "arguments": chat_args()})),
            })
            .await;
        assert_eq!(
            response.error,
            Some(RpcError {
                code: -32603,
                message: "OpenAI API error: Incorrect API key".into()
            })
        );
    }

    #[tokio::test]
    async fn test_missing_params() {
        let response = dispatcher()
            .handle_text(r#"{"jsonrpc":"2.0","id":1,"method":"call_tool"}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = dispatcher()
            .handle_text(r#"{"jsonrpc":"2.0","id":1,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_parse_error() {
        let response = dispatcher().handle_text("{not json").await.unwrap();
        assert_eq!(response.id, None);
        assert_eq!(response.error.unwrap().code, -32700);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_invalid_request() {
        let d = dispatcher();

        let response = d
            .handle_text(r#"{"jsonrpc":"2.0","id":1,"method":5}"#)
            .await
            .unwrap();
        assert_eq!(response.id, Some(json!(1)));
        assert_eq!(response.error.unwrap().code, -32600);

        let response = d.handle_text(r#"{"jsonrpc":"2.0","id":2}"#).await.unwrap();
        assert_eq!(response.id, Some(json!(2)));
        assert_eq!(response.error.unwrap().code, -32600);

        let response = d.handle_text("[1, 2]").await.unwrap();
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_null_id_is_answered() {
        let response = dispatcher()
            .handle_text(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#)
            .await
            .expect("explicit null id is a request, not a notification");
        assert_eq!(response.id, Some(Value::Null));
        assert!(response.result.is_some());

        let text = serde_json::to_string(&response).unwrap();
        assert!(text.contains(r#""id":null"#));
    }

    #[tokio::test]
    async fn test_notifications_are_silent() {
        let d = dispatcher();
        assert!(d
            .handle_text(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());
        assert!(d
            .handle_text(r#"{"jsonrpc":"2.0","method":"list_tools"}"#)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_initialize_and_list() {
        let d = dispatcher();
        let init = d
            .handle_text(r#"{"jsonrpc":"2.0","id":0,"method":"initialize","params":{"protocolVersion":"2025-03-26"}}"#)
            .await
            .unwrap()
            .result
            .unwrap();
        assert_eq!(init["serverInfo"]["name"], "ai-server");
        assert_eq!(init["protocolVersion"], "2025-03-26");
        assert!(init["capabilities"]["tools"].is_object());

        let list = d
            .handle_text(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
            .await
            .unwrap()
            .result
            .unwrap();
        assert_eq!(list["tools"].as_array().unwrap().len(), 4);
        assert_eq!(list["tools"][0]["name"], "chat_with_context");
    }

    #[tokio::test]
    async fn test_wrong_version_rejected() {
        let response = dispatcher()
            .handle_text(r#"{"jsonrpc":"1.0","id":1,"method":"list_tools"}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32600);
    }
}
