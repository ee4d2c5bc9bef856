use serde_json::json;

use gopilot_protocol::openai::request::ChatCompletionRequest;
use gopilot_protocol::openai::response::{ChatCompletion, ChatCompletionObjectType};
use gopilot_protocol::openai::stream::ChatCompletionChunk;
use gopilot_protocol::openai::types::ChatMessage;
use gopilot_protocol::sse;
use gopilot_protocol::vertex::PredictResponse;

use crate::response::FALLBACK_COMPLETION_ID;
use crate::stream::content_slices;
use crate::{TranslateError, emulate_sse, predict_request, predict_to_chat_completion};

fn chat_request(content: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        messages: vec![ChatMessage::text("user", content)],
        ..Default::default()
    }
}

fn completion_with(content: &str, finish_reason: Option<&str>) -> ChatCompletion {
    let mut choice = json!({"index": 0, "message": {"role": "assistant", "content": content}});
    if let Some(reason) = finish_reason {
        choice["finish_reason"] = json!(reason);
    }
    ChatCompletion {
        id: "chatcmpl-1".to_string(),
        object: ChatCompletionObjectType::ChatCompletion,
        created: None,
        model: "demo-model".to_string(),
        choices: vec![choice],
        usage: json!({}),
    }
}

fn decode_chunks(frames: &[bytes::Bytes]) -> Vec<ChatCompletionChunk> {
    frames
        .iter()
        .filter_map(|frame| sse::frame_payload(frame))
        .filter(|payload| payload != sse::DONE_SENTINEL)
        .map(|payload| serde_json::from_str(&payload).unwrap())
        .collect()
}

#[test]
fn predict_request_omits_absent_options() {
    let req = chat_request("hi");
    let envelope = predict_request(&req);
    let value = serde_json::to_value(&envelope).unwrap();

    let instance = &value["instances"][0];
    assert_eq!(instance["@requestFormat"], "chatCompletions");
    assert_eq!(instance["messages"][0]["content"], "hi");
    assert!(instance.get("max_tokens").is_none());
    assert!(instance.get("temperature").is_none());
}

#[test]
fn predict_request_carries_present_options() {
    let mut req = chat_request("hi");
    req.max_tokens = Some(128);
    req.temperature = Some(0.2);

    let value = serde_json::to_value(predict_request(&req)).unwrap();
    assert_eq!(value["instances"][0]["max_tokens"], 128);
    assert_eq!(value["instances"][0]["temperature"], 0.2);
}

#[test]
fn single_object_predictions_round_trip_choices_unchanged() {
    let choices = json!([{"message": {"role": "assistant", "content": "hey"}, "finish_reason": "stop", "vendor_extra": 7}]);
    let response: PredictResponse = serde_json::from_value(json!({
        "predictions": {"choices": choices, "id": "p-1", "created": 123, "usage": {"total_tokens": 9}}
    }))
    .unwrap();

    let completion = predict_to_chat_completion(response, "demo-model").unwrap();
    assert_eq!(serde_json::to_value(&completion.choices).unwrap(), choices);
    assert_eq!(completion.id, "p-1");
    assert_eq!(completion.created, Some(123));
    assert_eq!(completion.model, "demo-model");
    assert_eq!(completion.usage, json!({"total_tokens": 9}));
}

#[test]
fn prediction_sequence_normalizes_to_first_element() {
    let response: PredictResponse = serde_json::from_value(json!({
        "predictions": [{"model": "m-1", "choices": []}, {"model": "m-2", "choices": []}]
    }))
    .unwrap();

    let completion = predict_to_chat_completion(response, "fallback").unwrap();
    assert_eq!(completion.model, "m-1");
}

#[test]
fn prediction_defaults_fill_structure_not_content() {
    let response: PredictResponse =
        serde_json::from_value(json!({"predictions": {"choices": []}})).unwrap();

    let completion = predict_to_chat_completion(response, "req-model").unwrap();
    assert_eq!(completion.id, FALLBACK_COMPLETION_ID);
    assert_eq!(completion.model, "req-model");
    assert_eq!(completion.created, None);
    assert_eq!(completion.usage, json!({}));
    assert!(completion.choices.is_empty());

    let serialized = serde_json::to_value(&completion).unwrap();
    assert_eq!(serialized["object"], "chat.completion");
    assert!(serialized.get("created").is_none());
}

#[test]
fn empty_predictions_are_a_translation_error() {
    let missing: PredictResponse = serde_json::from_value(json!({})).unwrap();
    assert_eq!(
        predict_to_chat_completion(missing, "m").unwrap_err(),
        TranslateError::EmptyPredictions
    );

    let empty: PredictResponse = serde_json::from_value(json!({"predictions": []})).unwrap();
    assert_eq!(
        predict_to_chat_completion(empty, "m").unwrap_err(),
        TranslateError::EmptyPredictions
    );
}

#[test]
fn short_content_emulates_as_a_single_slice() {
    let frames = emulate_sse(&completion_with("hello world", Some("stop")));

    assert_eq!(frames.len(), 4);
    assert_eq!(
        sse::frame_payload(frames.last().unwrap()).as_deref(),
        Some(sse::DONE_SENTINEL)
    );

    let chunks = decode_chunks(&frames);
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].choices[0].delta.role.as_deref(), Some("assistant"));
    assert_eq!(chunks[0].choices[0].finish_reason, None);
    assert_eq!(
        chunks[1].choices[0].delta.content.as_deref(),
        Some("hello world")
    );
    assert_eq!(
        chunks[2].choices[0].finish_reason.as_deref(),
        Some("stop")
    );
    assert_eq!(chunks[2].choices[0].delta.content, None);
    assert!(chunks.iter().all(|chunk| chunk.id == "chatcmpl-1"));
    assert!(chunks.iter().all(|chunk| chunk.model == "demo-model"));
}

#[test]
fn long_content_reassembles_exactly() {
    let content = "abcdefghij".repeat(43);
    let frames = emulate_sse(&completion_with(&content, Some("stop")));
    let chunks = decode_chunks(&frames);

    // 430 chars at slice size max(20, 430/20) = 21 -> ceil(430/21) = 21 slices.
    let content_chunks: Vec<_> = chunks
        .iter()
        .filter_map(|chunk| chunk.choices[0].delta.content.clone())
        .collect();
    assert_eq!(content_chunks.len(), 21);
    assert_eq!(content_chunks.concat(), content);
    assert!(content_chunks.iter().all(|piece| !piece.is_empty()));
}

#[test]
fn slicing_respects_character_boundaries() {
    let content = "héllo wörld ".repeat(10);
    let slices = content_slices(&content);
    assert_eq!(slices.concat(), content);
    assert!(slices.len() > 1);
}

#[test]
fn slice_counts_match_the_heuristic() {
    // Below the floor: one slice no matter what.
    assert_eq!(content_slices(&"x".repeat(19)).len(), 1);
    assert_eq!(content_slices(&"x".repeat(20)).len(), 1);
    // 400 chars -> slice size 20 -> exactly 20 slices.
    assert_eq!(content_slices(&"x".repeat(400)).len(), 20);
    // 1000 chars -> slice size 50 -> exactly 20 slices.
    assert_eq!(content_slices(&"x".repeat(1000)).len(), 20);
    assert!(content_slices("").is_empty());
}

#[test]
fn empty_content_still_terminates_the_stream() {
    let frames = emulate_sse(&completion_with("", None));

    let chunks = decode_chunks(&frames);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].choices[0].delta.role.as_deref(), Some("assistant"));
    assert_eq!(chunks[1].choices[0].finish_reason.as_deref(), Some("stop"));
    assert_eq!(
        sse::frame_payload(frames.last().unwrap()).as_deref(),
        Some(sse::DONE_SENTINEL)
    );
}

#[test]
fn missing_finish_reason_defaults_to_stop() {
    let frames = emulate_sse(&completion_with("hi", None));
    let chunks = decode_chunks(&frames);
    assert_eq!(
        chunks.last().unwrap().choices[0].finish_reason.as_deref(),
        Some("stop")
    );
}
