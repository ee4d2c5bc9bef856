use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Upstream selection and authentication settings for the running process.
///
/// Built once at startup by the CLI layer and shared read-only across
/// requests; no component reads process environment after that point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Vertex-style prediction endpoint. Takes precedence over everything else.
    pub predict_url: Option<String>,
    /// Full OpenAI-compatible chat-completions endpoint.
    pub completions_url: Option<String>,
    /// Bare API base; the chat-completions path gets appended.
    pub base_url: Option<String>,
    /// Model id injected into requests that omit one, and advertised by
    /// the model-listing endpoint.
    pub default_model: String,
    /// Auth mode name: `bearer`, `gcloud` or `none`.
    pub auth_mode: String,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    /// Base URL of the external tool invocation service.
    pub toolbox_url: Option<String>,
}

/// Request-scoped failure taxonomy. The HTTP mapping lives in one place,
/// in the router crate.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Resolver or auth misconfiguration. Never retried.
    #[error("configuration error: {0}")]
    Config(String),
    /// Transport-level failure before an upstream status was obtainable.
    #[error("error reaching upstream: {0}")]
    Network(String),
    /// Upstream answered with status >= 400; the body is mirrored verbatim.
    #[error("upstream returned status {status}")]
    Upstream { status: u16, body: Bytes },
    /// The upstream response did not match its wire contract.
    #[error("unexpected upstream response: {0}")]
    Translation(String),
}

impl GatewayError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn translation(message: impl Into<String>) -> Self {
        Self::Translation(message.into())
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Treats unset and blank-after-trim values the same; environment-style
/// configuration makes empty strings common.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|item| !item.is_empty())
}
