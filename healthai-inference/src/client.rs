//! HTTP client for the model server

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

use healthai_core::{CardioInput, CkdInput, HealthError, HealthResult};

use crate::types::{ClassPrediction, FeatureRequest, ImageRequest, LabelPrediction};

/// Default model server address
pub const DEFAULT_INFERENCE_URL: &str = "http://localhost:8501";

/// Client for the model server's predict endpoints
#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    base_url: String,
}

impl InferenceClient {
    /// Create a new client against the given model server base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into(),
        }
    }

    /// Classify a brain MRI image
    #[instrument(skip(self, image))]
    pub async fn classify_mri(&self, image: &[u8]) -> HealthResult<LabelPrediction> {
        let encoded = STANDARD.encode(image);
        let prediction: LabelPrediction = self
            .post("/v1/mri/predict", &ImageRequest { image: &encoded })
            .await?;
        debug!(
            "MRI model predicted '{}' at {:.3}",
            prediction.label, prediction.confidence
        );
        Ok(prediction)
    }

    /// CKD diagnosis model: 0 = negative, 1 = positive
    #[instrument(skip(self, features))]
    pub async fn ckd_diagnosis(&self, features: &CkdInput) -> HealthResult<u32> {
        let prediction: ClassPrediction = self
            .post("/v1/ckd/diagnosis", &FeatureRequest { features })
            .await?;
        Ok(prediction.class_id)
    }

    /// CKD staging model: class index 0..=4 for stages 1..=5
    #[instrument(skip(self, features))]
    pub async fn ckd_stage(&self, features: &CkdInput) -> HealthResult<u32> {
        let prediction: ClassPrediction = self
            .post("/v1/ckd/stage", &FeatureRequest { features })
            .await?;
        Ok(prediction.class_id)
    }

    /// Cardiovascular risk model: class index into the condition table
    #[instrument(skip(self, features))]
    pub async fn cardio_class(&self, features: &CardioInput) -> HealthResult<u32> {
        let prediction: ClassPrediction = self
            .post("/v1/cardio/predict", &FeatureRequest { features })
            .await?;
        Ok(prediction.class_id)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> HealthResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| HealthError::network(format!("model server request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HealthError::api(format!(
                "model server returned {} for {}: {}",
                status, path, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| HealthError::parse(format!("model server response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ckd_input() -> CkdInput {
        CkdInput {
            gfr: 42.0,
            serum_creatinine: 2.4,
            bun: 32.0,
            serum_calcium: 8.6,
            urine_ph: 5.5,
            blood_pressure: 150.0,
            c3_c4: 2.8,
            oxalate_levels: 40.0,
        }
    }

    #[tokio::test]
    async fn classify_mri_sends_base64_image() {
        let server = MockServer::start().await;
        let image = b"not-a-real-scan";
        Mock::given(method("POST"))
            .and(path("/v1/mri/predict"))
            .and(body_json(serde_json::json!({
                "image": STANDARD.encode(image)
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "label": "glioma",
                "confidence": 0.97
            })))
            .mount(&server)
            .await;

        let client = InferenceClient::new(server.uri());
        let prediction = client.classify_mri(image).await.unwrap();

        assert_eq!(prediction.label, "glioma");
        assert!((prediction.confidence - 0.97).abs() < 1e-9);
    }

    #[tokio::test]
    async fn ckd_diagnosis_decodes_class_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/ckd/diagnosis"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"class_id": 1})),
            )
            .mount(&server)
            .await;

        let client = InferenceClient::new(server.uri());
        let class_id = client.ckd_diagnosis(&ckd_input()).await.unwrap();

        assert_eq!(class_id, 1);
    }

    #[tokio::test]
    async fn server_error_surfaces_status_and_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/cardio/predict"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let client = InferenceClient::new(server.uri());
        let err = client
            .cardio_class(&CardioInput {
                blood_glucose: 98.0,
                hba1c: 5.2,
                systolic_bp: 118.0,
                diastolic_bp: 76.0,
                ldl: 96.0,
                hdl: 58.0,
                triglycerides: 120.0,
                haemoglobin: 14.1,
                mcv: 88.0,
            })
            .await
            .unwrap_err();

        match err {
            HealthError::Api(message) => {
                assert!(message.contains("/v1/cardio/predict"));
                assert!(message.contains("model not loaded"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/ckd/stage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = InferenceClient::new(server.uri());
        let err = client.ckd_stage(&ckd_input()).await.unwrap_err();

        assert!(matches!(err, HealthError::Parse(_)));
    }
}
