pub mod list_models;
pub mod request;
pub mod response;
pub mod stream;
pub mod types;

pub use request::ChatCompletionRequest;
pub use response::{ChatCompletion, ChatCompletionObjectType};
pub use stream::{ChatCompletionChunk, ChunkChoice, ChunkDelta};
pub use types::ChatMessage;
