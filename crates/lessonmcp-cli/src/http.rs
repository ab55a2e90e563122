//! HTTP transport — `POST /mcp` carrying one JSON-RPC request per body.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use lessonmcp_tools::codes;

use crate::rpc::{RpcDispatcher, RpcRequest, RpcResponse};

/// Router with permissive CORS; any path but `/mcp` is a JSON 404.
pub fn router(dispatcher: Arc<RpcDispatcher>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(86_400));

    Router::new()
        .route("/mcp", post(handle_mcp).fallback(method_not_allowed))
        .fallback(endpoint_not_found)
        .layer(cors)
        .with_state(dispatcher)
}

/// Bind `host:port` and serve until Ctrl+C.
pub async fn serve(dispatcher: Arc<RpcDispatcher>, host: &str, port: u16) -> Result<()> {
    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to bind HTTP listener on {host}:{port}"))?;
    let addr = listener.local_addr().context("failed to read bound address")?;
    info!(%addr, "HTTP transport listening on /mcp");

    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl+C, stopping HTTP transport");
            }
            info!("Shutting down HTTP transport");
        })
        .await
        .context("HTTP server failed")
}

async fn handle_mcp(State(dispatcher): State<Arc<RpcDispatcher>>, body: Bytes) -> Response {
    let request = match RpcRequest::parse(&body) {
        Ok(request) => request,
        Err(response) => {
            debug!(bytes = body.len(), "Rejecting malformed body");
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
    };

    let response = dispatcher.handle(request).await;
    (StatusCode::OK, Json(response)).into_response()
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(RpcResponse::invalid_request("Method not allowed")),
    )
        .into_response()
}

async fn endpoint_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(RpcResponse::error(
            None,
            codes::METHOD_NOT_FOUND,
            "Endpoint not found",
        )),
    )
        .into_response()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::tests::dispatcher;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_post_mcp() {
        let request = Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"jsonrpc": "2.0", "id": 1, "method": "list_tools"}).to_string(),
            ))
            .unwrap();

        let response = router(dispatcher()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["result"]["tools"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_get_mcp_is_405() {
        let request = Request::builder().method("GET").uri("/mcp").body(Body::empty()).unwrap();

        let response = router(dispatcher()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], -32600);
        assert_eq!(body["error"]["message"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let request = Request::builder().method("POST").uri("/rpc").body(Body::empty()).unwrap();

        let response = router(dispatcher()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], -32601);
        assert_eq!(body["error"]["message"], "Endpoint not found");
    }

    #[tokio::test]
    async fn test_bad_body_is_400() {
        let request = Request::builder()
            .method("POST")
            .uri("/mcp")
            .body(Body::from("{oops"))
            .unwrap();

        let response = router(dispatcher()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_400_invalid_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/mcp")
            .body(Body::from(r#"{"jsonrpc":"2.0","id":9,"method":5}"#))
            .unwrap();

        let response = router(dispatcher()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["id"], 9);
        assert_eq!(body["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_null_id_is_answered() {
        let request = Request::builder()
            .method("POST")
            .uri("/mcp")
            .body(Body::from(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#))
            .unwrap();

        let response = router(dispatcher()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["id"].is_null());
        assert!(body["result"].is_object());
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/mcp")
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();

        let response = router(dispatcher()).oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(response.headers()["access-control-max-age"], "86400");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_cors_header_on_post() {
        let request = Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("origin", "http://example.org")
            .body(Body::from(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#))
            .unwrap();

        let response = router(dispatcher()).oneshot(request).await.unwrap();
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}
