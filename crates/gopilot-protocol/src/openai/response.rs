use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatCompletionObjectType {
    #[serde(rename = "chat.completion")]
    ChatCompletion,
}

/// Canonical non-streaming completion returned to the client.
///
/// `choices` is carried as raw JSON: when the upstream already speaks this
/// shape the gateway must not rewrite it, and the prediction translator only
/// relocates the field without touching its contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub object: ChatCompletionObjectType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    pub model: String,
    pub choices: Vec<JsonValue>,
    pub usage: JsonValue,
}

impl ChatCompletion {
    pub fn first_choice_content(&self) -> Option<&str> {
        self.choices
            .first()?
            .get("message")?
            .get("content")?
            .as_str()
    }

    pub fn first_choice_finish_reason(&self) -> Option<&str> {
        self.choices.first()?.get("finish_reason")?.as_str()
    }
}
