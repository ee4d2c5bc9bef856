use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatCompletionChunkObjectType {
    #[serde(rename = "chat.completion.chunk")]
    ChatCompletionChunk,
}

/// Incremental payload of one chunk. A chunk carries the role, a content
/// slice, or neither (the terminal chunk).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// `finish_reason` serializes as an explicit `null` until the terminal chunk;
/// stream consumers key off that transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    pub index: i64,
    pub delta: ChunkDelta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: ChatCompletionChunkObjectType,
    pub model: String,
    pub choices: Vec<ChunkChoice>,
}

impl ChatCompletionChunk {
    pub fn new(id: &str, model: &str, delta: ChunkDelta, finish_reason: Option<String>) -> Self {
        Self {
            id: id.to_string(),
            object: ChatCompletionChunkObjectType::ChatCompletionChunk,
            model: model.to_string(),
            choices: vec![ChunkChoice {
                index: 0,
                delta,
                finish_reason,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_chunk_serializes_null_finish_reason() {
        let chunk = ChatCompletionChunk::new(
            "chatcmpl",
            "demo-model",
            ChunkDelta {
                role: Some("assistant".to_string()),
                content: None,
            },
            None,
        );
        let value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(value["object"], "chat.completion.chunk");
        assert!(value["choices"][0]["finish_reason"].is_null());
        assert!(value["choices"][0]["delta"].get("content").is_none());
    }
}
