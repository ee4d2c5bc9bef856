use std::cmp;

use bytes::Bytes;

use gopilot_protocol::openai::response::ChatCompletion;
use gopilot_protocol::openai::stream::{ChatCompletionChunk, ChunkDelta};
use gopilot_protocol::sse;

/// Content is cut into roughly [`TARGET_SLICES`] pieces, but never shorter
/// than [`MIN_SLICE_CHARS`] each. SSE consumers expect more than one content
/// event for longer answers, so the heuristic is part of the wire contract.
const MIN_SLICE_CHARS: usize = 20;
const TARGET_SLICES: usize = 20;

/// Fabricates the full SSE event sequence for an already-complete answer:
/// one role chunk, one content chunk per slice in source order, a terminal
/// chunk carrying the finish reason (`"stop"` when the source had none), and
/// the literal `[DONE]` frame. The sequence is finite and not restartable.
pub fn emulate_sse(completion: &ChatCompletion) -> Vec<Bytes> {
    let content = completion.first_choice_content().unwrap_or("");
    let finish_reason = completion
        .first_choice_finish_reason()
        .filter(|reason| !reason.is_empty())
        .unwrap_or("stop");

    let mut frames = Vec::new();

    let role = ChunkDelta {
        role: Some("assistant".to_string()),
        content: None,
    };
    frames.extend(render(&chunk(completion, role, None)));

    for piece in content_slices(content) {
        let delta = ChunkDelta {
            role: None,
            content: Some(piece),
        };
        frames.extend(render(&chunk(completion, delta, None)));
    }

    frames.extend(render(&chunk(
        completion,
        ChunkDelta::default(),
        Some(finish_reason.to_string()),
    )));
    frames.push(sse::done_frame());
    frames
}

/// Splits on character boundaries; slicing must reassemble to the source
/// content exactly, multi-byte characters included.
pub fn content_slices(content: &str) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }
    let chars: Vec<char> = content.chars().collect();
    let size = cmp::max(MIN_SLICE_CHARS, chars.len() / TARGET_SLICES);
    chars
        .chunks(size)
        .map(|piece| piece.iter().collect())
        .collect()
}

fn chunk(
    completion: &ChatCompletion,
    delta: ChunkDelta,
    finish_reason: Option<String>,
) -> ChatCompletionChunk {
    ChatCompletionChunk::new(&completion.id, &completion.model, delta, finish_reason)
}

fn render(chunk: &ChatCompletionChunk) -> Option<Bytes> {
    let data = serde_json::to_string(chunk).ok()?;
    Some(sse::data_frame(&data))
}
