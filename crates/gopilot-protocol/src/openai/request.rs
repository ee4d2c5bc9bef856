use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::openai::types::ChatMessage;

/// Canonical inbound chat-completions request.
///
/// Only the fields the gateway inspects are typed; everything else an
/// OpenAI-compatible client may send (`top_p`, `stop`, `tools`, ...) is kept
/// in `extra` and serialized back verbatim for passthrough targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl ChatCompletionRequest {
    pub fn is_stream(&self) -> bool {
        self.stream.unwrap_or(false)
    }

    /// Injects the configured default when the client omitted `model` or sent
    /// a blank one. This is the only mutation ever applied to a request.
    pub fn ensure_model(&mut self, default_model: &str) {
        let missing = self
            .model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .is_none();
        if missing {
            self.model = Some(default_model.to_string());
        }
    }
}
