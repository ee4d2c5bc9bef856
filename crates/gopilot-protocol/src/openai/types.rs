use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One conversation turn.
///
/// `content` stays a raw JSON value because OpenAI-compatible clients send
/// either a plain string or an array of typed parts, and the gateway forwards
/// both untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: JsonValue,
    /// Fields such as `name` or `tool_call_id` pass through unmodified.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl ChatMessage {
    pub fn text(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: JsonValue::String(content.into()),
            extra: Map::new(),
        }
    }
}
