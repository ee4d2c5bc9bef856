use std::error::Error;
use std::fmt;

use serde_json::Value as JsonValue;

use gopilot_protocol::openai::response::{ChatCompletion, ChatCompletionObjectType};
use gopilot_protocol::vertex::PredictResponse;

/// Completion id used when the prediction backend did not provide one.
pub const FALLBACK_COMPLETION_ID: &str = "chatcmpl";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslateError {
    EmptyPredictions,
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::EmptyPredictions => {
                write!(f, "prediction response carried no predictions")
            }
        }
    }
}

impl Error for TranslateError {}

/// Lifts a prediction response into the canonical completion shape.
///
/// `choices` moves over unchanged. Missing `model` falls back to the request
/// model, a missing `id` to [`FALLBACK_COMPLETION_ID`], missing `usage` to an
/// empty object; a missing `created` stays absent. The translator fills in
/// structure, never content.
pub fn predict_to_chat_completion(
    response: PredictResponse,
    request_model: &str,
) -> Result<ChatCompletion, TranslateError> {
    let prediction = response
        .into_first()
        .ok_or(TranslateError::EmptyPredictions)?;

    Ok(ChatCompletion {
        id: prediction
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| FALLBACK_COMPLETION_ID.to_string()),
        object: ChatCompletionObjectType::ChatCompletion,
        created: prediction.created,
        model: prediction
            .model
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| request_model.to_string()),
        choices: prediction.choices,
        usage: prediction
            .usage
            .filter(|usage| !usage.is_null())
            .unwrap_or_else(|| JsonValue::Object(Default::default())),
    })
}
