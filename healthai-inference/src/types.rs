//! Wire types for the model server predict endpoints

use serde::{Deserialize, Serialize};

/// Prediction from a classifier that emits a label with a confidence
/// (the MRI model)
#[derive(Debug, Clone, Deserialize)]
pub struct LabelPrediction {
    pub label: String,
    pub confidence: f64,
}

/// Prediction from a classifier that emits a bare class index
/// (CKD diagnosis, CKD stage, cardiovascular risk)
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ClassPrediction {
    pub class_id: u32,
}

/// Request body for the MRI endpoint
#[derive(Debug, Serialize)]
pub(crate) struct ImageRequest<'a> {
    /// Base64-encoded image bytes
    pub image: &'a str,
}

/// Request body for the feature-vector endpoints
#[derive(Debug, Serialize)]
pub(crate) struct FeatureRequest<'a, T: Serialize> {
    pub features: &'a T,
}
