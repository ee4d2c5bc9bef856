use gopilot_protocol::openai::ChatCompletionRequest;
use gopilot_protocol::vertex::{PredictInstance, PredictRequest, REQUEST_FORMAT_CHAT_COMPLETIONS};

/// Wraps a chat request into the prediction envelope: one instance carrying
/// the format marker, the conversation, and any sampling options the client
/// actually sent. Absent options are left out of the instance entirely.
pub fn predict_request(req: &ChatCompletionRequest) -> PredictRequest {
    let instance = PredictInstance {
        request_format: REQUEST_FORMAT_CHAT_COMPLETIONS.to_string(),
        messages: req.messages.clone(),
        max_tokens: req.max_tokens,
        temperature: req.temperature,
    };
    PredictRequest {
        instances: vec![instance],
    }
}
