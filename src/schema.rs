// Wire shapes of the image classification prediction schema. Field names
// are camelCase on the wire, which serde handles through `rename_all`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_MAX_PREDICTIONS: u32 = 5;

/// One image submitted for classification. `content` is the base64 text
/// of the raw file bytes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageClassificationInstance {
    pub content: String,
}

impl ImageClassificationInstance {
    pub fn new(content: impl Into<String>) -> Self {
        ImageClassificationInstance {
            content: content.into(),
        }
    }
}

/// Request-time filtering applied by the service to the returned labels.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageClassificationParams {
    pub confidence_threshold: f64,
    pub max_predictions: u32,
}

impl ImageClassificationParams {
    pub fn new(confidence_threshold: f64, max_predictions: u32) -> Self {
        ImageClassificationParams {
            confidence_threshold,
            max_predictions,
        }
    }
}

impl Default for ImageClassificationParams {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_MAX_PREDICTIONS)
    }
}

#[derive(Serialize, Debug)]
pub struct PredictRequest<'a> {
    pub instances: &'a [ImageClassificationInstance],
    pub parameters: &'a ImageClassificationParams,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<ImageClassificationPrediction>,
    #[serde(default)]
    pub deployed_model_id: Option<String>,
}

/// Labels returned for one instance. The three vectors are parallel.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageClassificationPrediction {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub display_names: Vec<String>,
    #[serde(default)]
    pub confidences: Vec<f64>,
}

impl ImageClassificationPrediction {
    /// Pairs every display name with its confidence score.
    pub fn labels(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.display_names
            .iter()
            .map(String::as_str)
            .zip(self.confidences.iter().copied())
    }
}
