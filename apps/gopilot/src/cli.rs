use clap::Parser;

use gopilot_common::GatewayConfig;

/// Every upstream setting can come from the environment, which is how the
/// gateway is configured when it runs containerized.
#[derive(Parser)]
#[command(name = "gopilot", about = "Chat-completions gateway for heterogeneous inference backends")]
pub(crate) struct Cli {
    #[arg(long, env = "GOPILOT_HOST", default_value = "0.0.0.0")]
    pub(crate) host: String,
    #[arg(long, env = "GOPILOT_PORT", default_value_t = 8000)]
    pub(crate) port: u16,
    /// Vertex-style prediction endpoint; wins over every other upstream.
    #[arg(long, env = "UPSTREAM_PREDICT_URL")]
    pub(crate) predict_url: Option<String>,
    /// Full OpenAI-compatible chat-completions endpoint.
    #[arg(long, env = "UPSTREAM_CHAT_COMPLETIONS_URL")]
    pub(crate) completions_url: Option<String>,
    /// Bare API base; `/v1/chat/completions` gets appended.
    #[arg(long, env = "UPSTREAM_API_BASE_URL")]
    pub(crate) base_url: Option<String>,
    #[arg(long, env = "UPSTREAM_DEFAULT_MODEL", default_value = "openai/gpt-oss-120b-maas")]
    pub(crate) default_model: String,
    /// One of `bearer`, `gcloud` or `none`.
    #[arg(long, env = "UPSTREAM_AUTH", default_value = "bearer")]
    pub(crate) auth: String,
    #[arg(long, env = "UPSTREAM_API_KEY", hide_env_values = true)]
    pub(crate) api_key: Option<String>,
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    pub(crate) access_token: Option<String>,
    #[arg(long, env = "GENAI_TOOLBOX_URL")]
    pub(crate) toolbox_url: Option<String>,
}

impl Cli {
    pub(crate) fn into_config(self) -> GatewayConfig {
        GatewayConfig {
            predict_url: self.predict_url,
            completions_url: self.completions_url,
            base_url: self.base_url,
            default_model: self.default_model,
            auth_mode: self.auth,
            api_key: self.api_key,
            access_token: self.access_token,
            toolbox_url: self.toolbox_url,
        }
    }
}
