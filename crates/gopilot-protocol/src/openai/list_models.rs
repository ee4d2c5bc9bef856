use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListObjectType {
    #[serde(rename = "list")]
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelObjectType {
    #[serde(rename = "model")]
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub object: ModelObjectType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListModelsResponse {
    pub object: ListObjectType,
    pub data: Vec<Model>,
}

impl ListModelsResponse {
    /// The gateway advertises exactly one model: the configured default.
    pub fn single(model_id: &str) -> Self {
        Self {
            object: ListObjectType::List,
            data: vec![Model {
                id: model_id.to_string(),
                object: ModelObjectType::Model,
            }],
        }
    }
}
