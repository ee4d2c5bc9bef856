use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Fields the translator lifts out of a prediction. Anything it does not
/// recognize is ignored rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub choices: Vec<JsonValue>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<JsonValue>,
}

/// Prediction backends return either a bare object or an ordered sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Predictions {
    One(Prediction),
    Many(Vec<Prediction>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Option<Predictions>,
}

impl PredictResponse {
    /// Normalizes the object-or-sequence shape to the first prediction.
    /// Returns `None` for a missing field or an empty sequence.
    pub fn into_first(self) -> Option<Prediction> {
        match self.predictions? {
            Predictions::One(prediction) => Some(prediction),
            Predictions::Many(predictions) => predictions.into_iter().next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predictions_accept_object_and_sequence() {
        let object: PredictResponse =
            serde_json::from_str(r#"{"predictions":{"choices":[],"id":"a"}}"#).unwrap();
        assert_eq!(object.into_first().unwrap().id.as_deref(), Some("a"));

        let sequence: PredictResponse =
            serde_json::from_str(r#"{"predictions":[{"id":"first"},{"id":"second"}]}"#).unwrap();
        assert_eq!(sequence.into_first().unwrap().id.as_deref(), Some("first"));
    }

    #[test]
    fn empty_predictions_normalize_to_none() {
        let missing: PredictResponse = serde_json::from_str("{}").unwrap();
        assert!(missing.into_first().is_none());

        let empty: PredictResponse = serde_json::from_str(r#"{"predictions":[]}"#).unwrap();
        assert!(empty.into_first().is_none());
    }
}
