pub mod request;
pub mod response;

pub use request::{PredictInstance, PredictRequest, REQUEST_FORMAT_CHAT_COMPLETIONS};
pub use response::{PredictResponse, Prediction, Predictions};
