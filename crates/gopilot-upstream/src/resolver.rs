use gopilot_common::{GatewayConfig, GatewayError, GatewayResult, non_empty};

/// Path appended when only a bare API base is configured.
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamStyle {
    /// `instances`/`predictions` envelope; request/response only.
    Predict,
    /// OpenAI-compatible chat completions; may stream natively.
    ChatCompletions,
}

/// The one upstream this request will talk to, with auth already applied.
/// Built fresh per request from the read-only configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    pub url: String,
    pub style: UpstreamStyle,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Bearer,
    GCloudToken,
    None,
}

impl AuthMode {
    pub fn parse(name: &str) -> GatewayResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "bearer" => Ok(AuthMode::Bearer),
            "gcloud" => Ok(AuthMode::GCloudToken),
            "none" => Ok(AuthMode::None),
            other => Err(GatewayError::config(format!("unknown auth mode: {other}"))),
        }
    }
}

/// Picks the upstream for chat-completions traffic. First match wins:
/// predict URL, then completions URL, then base URL joined with the fixed
/// chat-completions path.
pub fn resolve_target(config: &GatewayConfig) -> GatewayResult<UpstreamTarget> {
    let (url, style) = if let Some(url) = non_empty(&config.predict_url) {
        (url.trim_end_matches('/').to_string(), UpstreamStyle::Predict)
    } else if let Some(url) = non_empty(&config.completions_url) {
        (
            url.trim_end_matches('/').to_string(),
            UpstreamStyle::ChatCompletions,
        )
    } else if let Some(base) = non_empty(&config.base_url) {
        (
            format!("{}{CHAT_COMPLETIONS_PATH}", base.trim_end_matches('/')),
            UpstreamStyle::ChatCompletions,
        )
    } else {
        return Err(GatewayError::config(
            "no upstream configured: set UPSTREAM_PREDICT_URL, \
             UPSTREAM_CHAT_COMPLETIONS_URL or UPSTREAM_API_BASE_URL",
        ));
    };

    ensure_remote_host(&url)?;
    Ok(UpstreamTarget {
        url,
        style,
        headers: auth_headers(config)?,
    })
}

/// Target for the raw prediction passthrough endpoint, which only ever talks
/// to the prediction URL.
pub fn resolve_predict_target(config: &GatewayConfig) -> GatewayResult<UpstreamTarget> {
    let url = non_empty(&config.predict_url)
        .ok_or_else(|| GatewayError::config("UPSTREAM_PREDICT_URL is not set"))?
        .trim_end_matches('/')
        .to_string();
    ensure_remote_host(&url)?;
    Ok(UpstreamTarget {
        url,
        style: UpstreamStyle::Predict,
        headers: auth_headers(config)?,
    })
}

/// Base URL of the tool invocation service. Tool calls carry no upstream
/// auth; they only get the JSON content type.
pub fn resolve_toolbox_url(config: &GatewayConfig) -> GatewayResult<String> {
    let url = non_empty(&config.toolbox_url)
        .ok_or_else(|| GatewayError::config("GENAI_TOOLBOX_URL is not set"))?
        .trim_end_matches('/')
        .to_string();
    ensure_remote_host(&url)?;
    Ok(url)
}

/// Headers for the resolved auth mode. `Content-Type: application/json` is
/// always present; `Bearer` and `GCloudToken` additionally require their
/// credential to be non-empty at resolution time, not at call time.
pub fn auth_headers(config: &GatewayConfig) -> GatewayResult<Vec<(String, String)>> {
    let mut headers = vec![(
        "Content-Type".to_string(),
        "application/json".to_string(),
    )];
    match AuthMode::parse(&config.auth_mode)? {
        AuthMode::Bearer => {
            let key = non_empty(&config.api_key).ok_or_else(|| {
                GatewayError::config("UPSTREAM_API_KEY is required for auth mode bearer")
            })?;
            headers.push(("Authorization".to_string(), format!("Bearer {key}")));
        }
        AuthMode::GCloudToken => {
            let token = non_empty(&config.access_token).ok_or_else(|| {
                GatewayError::config("GOOGLE_ACCESS_TOKEN is required for auth mode gcloud")
            })?;
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        AuthMode::None => {}
    }
    Ok(headers)
}

/// Hard policy invariant: the gateway never forwards to itself or anything
/// else on the local host, whatever the auth mode says.
fn ensure_remote_host(url: &str) -> GatewayResult<()> {
    let host = host_of(url).to_ascii_lowercase();
    let blocked = matches!(host.as_str(), "localhost" | "::1" | "0.0.0.0")
        || host.ends_with(".localhost")
        || host.starts_with("127.");
    if blocked {
        return Err(GatewayError::config(format!(
            "loopback upstream address is forbidden: {host}"
        )));
    }
    Ok(())
}

fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let authority = authority
        .rsplit_once('@')
        .map(|(_, host)| host)
        .unwrap_or(authority);
    // Bracketed IPv6 keeps its colons; anything else drops the port.
    if let Some(stripped) = authority.strip_prefix('[') {
        return stripped.split(']').next().unwrap_or(stripped);
    }
    authority.split(':').next().unwrap_or(authority)
}
