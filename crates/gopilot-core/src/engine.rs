use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use gopilot_common::{GatewayConfig, GatewayError, GatewayResult};
use gopilot_protocol::openai::ChatCompletionRequest;
use gopilot_protocol::openai::list_models::ListModelsResponse;
use gopilot_protocol::vertex::PredictResponse;
use gopilot_transform::{emulate_sse, predict_request, predict_to_chat_completion};
use gopilot_upstream::{
    BUFFERED_CHAT_TIMEOUT, CallMode, PREDICT_TIMEOUT, TOOL_TIMEOUT, UpstreamClient,
    UpstreamRequest, UpstreamResponseBody, UpstreamStyle, UpstreamTarget,
    resolve_predict_target, resolve_target, resolve_toolbox_url,
};

/// What a handled request produces. The router turns this into an HTTP
/// response without further decisions.
#[derive(Debug)]
pub enum EngineResponse {
    /// Complete JSON body; the status mirrors the upstream where one was
    /// involved.
    Json { status: u16, body: Bytes },
    /// Emulated SSE sequence, fully rendered and finite.
    Sse { frames: Vec<Bytes> },
    /// Native upstream stream relayed as it arrives.
    Stream {
        status: u16,
        content_type: String,
        body: mpsc::Receiver<Bytes>,
    },
}

/// Drives one request through resolve -> translate -> invoke -> translate
/// back. Holds no per-request state; everything lives on the stack of the
/// handling task.
pub struct Engine {
    config: GatewayConfig,
    client: Arc<dyn UpstreamClient>,
}

impl Engine {
    pub fn new(config: GatewayConfig, client: Arc<dyn UpstreamClient>) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The gateway fronts exactly one model: the configured default.
    pub fn model_list(&self) -> ListModelsResponse {
        ListModelsResponse::single(&self.config.default_model)
    }

    pub async fn chat_completions(
        &self,
        mut req: ChatCompletionRequest,
    ) -> GatewayResult<EngineResponse> {
        let target = resolve_target(&self.config)?;
        req.ensure_model(&self.config.default_model);
        debug!(url = %target.url, style = ?target.style, stream = req.is_stream(), "resolved upstream");

        match target.style {
            UpstreamStyle::Predict => self.chat_via_predict(target, req).await,
            UpstreamStyle::ChatCompletions => self.chat_via_completions(target, req).await,
        }
    }

    /// Prediction upstreams cannot stream: the call is always buffered, and a
    /// streaming client gets the emulated sequence built from the complete
    /// answer.
    async fn chat_via_predict(
        &self,
        target: UpstreamTarget,
        req: ChatCompletionRequest,
    ) -> GatewayResult<EngineResponse> {
        let body = encode_json(&predict_request(&req))?;
        let resp = self
            .client
            .send(UpstreamRequest {
                url: target.url,
                headers: target.headers,
                body,
                mode: CallMode::Buffered {
                    timeout: PREDICT_TIMEOUT,
                },
            })
            .await?;

        let status = resp.status;
        let bytes = into_bytes(resp.body)?;
        if status >= 400 {
            return Err(GatewayError::Upstream {
                status,
                body: bytes,
            });
        }

        let predict: PredictResponse = serde_json::from_slice(&bytes).map_err(|err| {
            GatewayError::translation(format!("invalid prediction response: {err}"))
        })?;
        let request_model = req.model.as_deref().unwrap_or_default();
        let completion = predict_to_chat_completion(predict, request_model)
            .map_err(|err| GatewayError::translation(err.to_string()))?;

        if req.is_stream() && !completion.choices.is_empty() {
            return Ok(EngineResponse::Sse {
                frames: emulate_sse(&completion),
            });
        }
        Ok(EngineResponse::Json {
            status: 200,
            body: encode_json(&completion)?,
        })
    }

    /// Chat-completions upstreams speak the canonical shape already; the
    /// request goes through verbatim and the response is either mirrored or
    /// relayed live.
    async fn chat_via_completions(
        &self,
        target: UpstreamTarget,
        req: ChatCompletionRequest,
    ) -> GatewayResult<EngineResponse> {
        let body = encode_json(&req)?;

        if req.is_stream() {
            let resp = self
                .client
                .send(UpstreamRequest {
                    url: target.url,
                    headers: target.headers,
                    body,
                    mode: CallMode::Streamed,
                })
                .await?;

            let status = resp.status;
            let content_type = resp
                .content_type()
                .unwrap_or("application/json")
                .to_string();
            return match resp.body {
                // Error statuses come back buffered even in streamed mode.
                UpstreamResponseBody::Bytes(bytes) => {
                    if status >= 400 {
                        Err(GatewayError::Upstream {
                            status,
                            body: bytes,
                        })
                    } else {
                        Ok(EngineResponse::Json {
                            status,
                            body: bytes,
                        })
                    }
                }
                UpstreamResponseBody::Stream(rx) => Ok(EngineResponse::Stream {
                    status,
                    content_type,
                    body: rx,
                }),
            };
        }

        let resp = self
            .client
            .send(UpstreamRequest {
                url: target.url,
                headers: target.headers,
                body,
                mode: CallMode::Buffered {
                    timeout: BUFFERED_CHAT_TIMEOUT,
                },
            })
            .await?;

        let status = resp.status;
        let bytes = into_bytes(resp.body)?;
        if status >= 400 {
            return Err(GatewayError::Upstream {
                status,
                body: bytes,
            });
        }
        Ok(EngineResponse::Json {
            status,
            body: bytes,
        })
    }

    /// Raw prediction passthrough: auth and forward only, no translation.
    pub async fn predict_passthrough(&self, body: Bytes) -> GatewayResult<EngineResponse> {
        let target = resolve_predict_target(&self.config)?;
        let resp = self
            .client
            .send(UpstreamRequest {
                url: target.url,
                headers: target.headers,
                body,
                mode: CallMode::Buffered {
                    timeout: PREDICT_TIMEOUT,
                },
            })
            .await?;

        let status = resp.status;
        let bytes = into_bytes(resp.body)?;
        if status >= 400 {
            return Err(GatewayError::Upstream {
                status,
                body: bytes,
            });
        }
        Ok(EngineResponse::Json {
            status,
            body: bytes,
        })
    }

    /// Forwards an opaque body to the named tool. The toolbox answer is
    /// mirrored whatever its status; an empty body mirrors as `{}`.
    pub async fn invoke_tool(&self, name: &str, body: Bytes) -> GatewayResult<EngineResponse> {
        let base = resolve_toolbox_url(&self.config)?;
        let url = format!("{base}/api/tool/{name}/invoke");
        let resp = self
            .client
            .send(UpstreamRequest {
                url,
                headers: vec![(
                    "Content-Type".to_string(),
                    "application/json".to_string(),
                )],
                body,
                mode: CallMode::Buffered {
                    timeout: TOOL_TIMEOUT,
                },
            })
            .await?;

        let status = resp.status;
        let bytes = into_bytes(resp.body)?;
        let body = if bytes.is_empty() {
            Bytes::from_static(b"{}")
        } else {
            bytes
        };
        Ok(EngineResponse::Json { status, body })
    }
}

fn encode_json<T: Serialize>(value: &T) -> GatewayResult<Bytes> {
    let body = serde_json::to_vec(value)
        .map_err(|err| GatewayError::translation(format!("failed to encode request: {err}")))?;
    Ok(Bytes::from(body))
}

fn into_bytes(body: UpstreamResponseBody) -> GatewayResult<Bytes> {
    match body {
        UpstreamResponseBody::Bytes(bytes) => Ok(bytes),
        UpstreamResponseBody::Stream(_) => Err(GatewayError::translation(
            "unexpected streaming body for a buffered call",
        )),
    }
}
