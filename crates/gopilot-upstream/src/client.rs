use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use wreq::{Client, Method};

use gopilot_common::{GatewayError, GatewayResult};

/// Prediction backends are request/response only and can be slow.
pub const PREDICT_TIMEOUT: Duration = Duration::from_secs(120);
/// Buffered chat-completions calls get a tighter bound.
pub const BUFFERED_CHAT_TIMEOUT: Duration = Duration::from_secs(60);
/// Tool invocations share the chat bound.
pub const TOOL_TIMEOUT: Duration = Duration::from_secs(60);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(30);
const STREAM_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    /// Read the full body before returning; the deadline bounds the call.
    Buffered { timeout: Duration },
    /// Hand back a live byte stream. No overall deadline; only per-read
    /// idleness is bounded.
    Streamed,
}

#[derive(Debug)]
pub struct UpstreamRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub mode: CallMode,
}

#[derive(Debug)]
pub enum UpstreamResponseBody {
    Bytes(Bytes),
    Stream(mpsc::Receiver<Bytes>),
}

#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: UpstreamResponseBody,
}

impl UpstreamResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
    }
}

/// Seam between the engine and the network, so the engine can be exercised
/// against canned responses.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn send(&self, req: UpstreamRequest) -> GatewayResult<UpstreamResponse>;
}

#[derive(Clone)]
pub struct WreqUpstreamClient {
    client: Client,
}

impl WreqUpstreamClient {
    pub fn new() -> GatewayResult<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(STREAM_IDLE_TIMEOUT)
            .build()
            .map_err(|err| {
                GatewayError::Config(format!("failed to build upstream client: {err}"))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl UpstreamClient for WreqUpstreamClient {
    async fn send(&self, req: UpstreamRequest) -> GatewayResult<UpstreamResponse> {
        let mut builder = self.client.request(Method::POST, &req.url);
        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }
        if let CallMode::Buffered { timeout } = req.mode {
            builder = builder.timeout(timeout);
        }
        let want_stream = req.mode == CallMode::Streamed;

        let resp = builder
            .body(req.body)
            .send()
            .await
            .map_err(map_transport_error)?;
        convert_response(resp, want_stream).await
    }
}

/// Non-success and non-streaming responses are buffered whole; a successful
/// streamed response is relayed through a bounded channel so backpressure
/// reaches the upstream read loop.
async fn convert_response(resp: wreq::Response, want_stream: bool) -> GatewayResult<UpstreamResponse> {
    let status = resp.status().as_u16();
    let headers = header_pairs(resp.headers());

    let is_success = (200..300).contains(&status);
    if !is_success || !want_stream {
        let body = resp.bytes().await.map_err(map_transport_error)?;
        return Ok(UpstreamResponse {
            status,
            headers,
            body: UpstreamResponseBody::Bytes(body),
        });
    }

    let (tx, rx) = mpsc::channel::<Bytes>(STREAM_CHANNEL_CAPACITY);
    tokio::spawn(async move {
        let mut stream = resp.bytes_stream();
        loop {
            let next = tokio::time::timeout(STREAM_IDLE_TIMEOUT, stream.next()).await;
            let Ok(item) = next else {
                tracing::warn!("upstream stream went idle, closing relay");
                break;
            };
            let Some(item) = item else {
                break;
            };
            let chunk = match item {
                Ok(chunk) => chunk,
                Err(err) => {
                    tracing::warn!(error = %err, "upstream stream read failed");
                    break;
                }
            };
            if tx.send(chunk).await.is_err() {
                // Client went away; dropping `stream` releases the connection.
                break;
            }
        }
    });

    Ok(UpstreamResponse {
        status,
        headers,
        body: UpstreamResponseBody::Stream(rx),
    })
}

fn header_pairs(map: &wreq::header::HeaderMap) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for (name, value) in map {
        if let Ok(value) = value.to_str() {
            out.push((name.as_str().to_string(), value.to_string()));
        }
    }
    out
}

fn map_transport_error(err: wreq::Error) -> GatewayError {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect"
    } else {
        "transport"
    };
    GatewayError::Network(format!("{kind}: {err}"))
}
