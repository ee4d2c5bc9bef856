mod engine;

pub use engine::{Engine, EngineResponse};
