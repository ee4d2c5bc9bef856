use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use futures_util::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{error, info, warn};

use gopilot_common::GatewayError;
use gopilot_core::{Engine, EngineResponse};
use gopilot_protocol::openai::ChatCompletionRequest;
use gopilot_protocol::openai::list_models::ListModelsResponse;

#[derive(Clone)]
pub struct GatewayState {
    pub engine: Arc<Engine>,
}

/// The public surface. Every failure a handler can produce funnels through
/// [`error_response`], so the status mapping lives in exactly one place; a
/// panicking handler is converted to a 500 at this boundary instead of
/// tearing the process down.
pub fn gateway_router(engine: Arc<Engine>) -> Router {
    let state = GatewayState { engine };

    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/models", get(list_models))
        .route("/v1/chat/completions", post(chat_completions))
        .route("/vertex/predict", post(vertex_predict))
        .route("/tools/{name}/invoke", post(invoke_tool))
        .layer(middleware::from_fn(trace_requests))
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn list_models(State(state): State<GatewayState>) -> Json<ListModelsResponse> {
    Json(state.engine.model_list())
}

async fn chat_completions(
    State(state): State<GatewayState>,
    Json(body): Json<ChatCompletionRequest>,
) -> Response {
    match state.engine.chat_completions(body).await {
        Ok(resp) => engine_response(resp),
        Err(err) => error_response(err),
    }
}

async fn vertex_predict(State(state): State<GatewayState>, body: Bytes) -> Response {
    match state.engine.predict_passthrough(body).await {
        Ok(resp) => engine_response(resp),
        Err(err) => error_response(err),
    }
}

async fn invoke_tool(
    State(state): State<GatewayState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    match state.engine.invoke_tool(&name, body).await {
        Ok(resp) => engine_response(resp),
        Err(err) => error_response(err),
    }
}

async fn trace_requests(req: Request, next: Next) -> Response {
    let trace_id = uuid::Uuid::now_v7();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;
    info!(%trace_id, %method, %path, status = response.status().as_u16(), "handled request");
    response
}

fn engine_response(resp: EngineResponse) -> Response {
    match resp {
        EngineResponse::Json { status, body } => json_response(status, body),
        EngineResponse::Sse { frames } => {
            let stream =
                futures_util::stream::iter(frames.into_iter().map(Ok::<_, Infallible>));
            sse_response(StatusCode::OK, "text/event-stream", Body::from_stream(stream))
        }
        EngineResponse::Stream {
            status,
            content_type,
            body,
        } => {
            let stream = ReceiverStream::new(body).map(Ok::<_, Infallible>);
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            if content_type.to_ascii_lowercase().contains("text/event-stream") {
                sse_response(status, &content_type, Body::from_stream(stream))
            } else {
                response_with(status, &content_type, Body::from_stream(stream))
            }
        }
    }
}

/// The one failure-to-status mapping of the gateway.
fn error_response(err: GatewayError) -> Response {
    match err {
        GatewayError::Upstream { status, body } => {
            warn!(status, "mirroring upstream error");
            json_response(status, body)
        }
        GatewayError::Config(_) => {
            warn!(error = %err, "request failed");
            json_error(StatusCode::SERVICE_UNAVAILABLE, &err.to_string())
        }
        GatewayError::Network(_) => {
            warn!(error = %err, "request failed");
            json_error(StatusCode::BAD_GATEWAY, &err.to_string())
        }
        GatewayError::Translation(_) => {
            warn!(error = %err, "request failed");
            json_error(StatusCode::BAD_GATEWAY, &err.to_string())
        }
    }
}

fn panic_response(err: Box<dyn std::any::Any + Send + 'static>) -> http::Response<Body> {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(%detail, "request handler panicked");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

fn json_response(status: u16, body: Bytes) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    response_with(status, "application/json", Body::from(body))
}

fn json_error(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({"error": message}).to_string();
    response_with(status, "application/json", Body::from(body))
}

fn response_with(status: StatusCode, content_type: &str, body: Body) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .body(body)
        .unwrap_or_else(|_| {
            (StatusCode::INTERNAL_SERVER_ERROR, "response_build_failed").into_response()
        })
}

fn sse_response(status: StatusCode, content_type: &str, body: Body) -> Response {
    // Hint common reverse proxies to avoid buffering SSE responses.
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "no-cache")
        .header("x-accel-buffering", "no")
        .body(body)
        .unwrap_or_else(|_| {
            (StatusCode::INTERNAL_SERVER_ERROR, "response_build_failed").into_response()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_to_service_unavailable() {
        let resp = error_response(GatewayError::config("no upstream configured"));
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn network_and_translation_errors_map_to_bad_gateway() {
        let resp = error_response(GatewayError::Network("connect: refused".to_string()));
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = error_response(GatewayError::translation("empty predictions"));
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn upstream_errors_mirror_their_status() {
        let resp = error_response(GatewayError::Upstream {
            status: 404,
            body: Bytes::from_static(b"missing"),
        });
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn emulated_streams_carry_sse_headers() {
        let resp = engine_response(EngineResponse::Sse {
            frames: vec![Bytes::from_static(b"data: {}\n\n")],
        });
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/event-stream"
        );
        assert_eq!(resp.headers().get("x-accel-buffering").unwrap(), "no");
    }
}
