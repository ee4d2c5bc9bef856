use serde::{Deserialize, Serialize};

use crate::openai::types::ChatMessage;

/// Marker telling the prediction backend to interpret the instance as a
/// chat-completions conversation.
pub const REQUEST_FORMAT_CHAT_COMPLETIONS: &str = "chatCompletions";

/// One prediction instance. Absent optionals are omitted from the wire,
/// never serialized as nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictInstance {
    #[serde(rename = "@requestFormat")]
    pub request_format: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub instances: Vec<PredictInstance>,
}
