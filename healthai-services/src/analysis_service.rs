//! Analysis Service
//!
//! Orchestrates the medical analysis flows: sends inputs to the model
//! server, maps raw class outputs to the report shapes the frontend
//! renders, and records outcomes in the user's history.

use std::sync::Arc;

use tracing::{instrument, warn};

use healthai_core::{
    AnalysisKind, AnalysisRecord, CardioInput, CardioReport, CkdInput, CkdReport, HealthError,
    HealthResult, MriReport, Recommendation, User,
};
use healthai_inference::InferenceClient;

use crate::user_store::UserStore;

/// Condition labels indexed by the cardiovascular model's class id
const CARDIO_CLASSES: [&str; 6] = [
    "Fit",
    "Diabetes",
    "Anaemia",
    "Thalassemia",
    "Heart_Disease",
    "Thrombocytopenia",
];

/// Orchestrates model calls and history recording
pub struct AnalysisService {
    inference: InferenceClient,
    store: Arc<UserStore>,
}

impl AnalysisService {
    pub fn new(inference: InferenceClient, store: Arc<UserStore>) -> Self {
        Self { inference, store }
    }

    /// Classify a brain MRI image
    #[instrument(skip(self, user, image))]
    pub async fn analyze_mri(
        &self,
        user: Option<&User>,
        image: &[u8],
    ) -> HealthResult<MriReport> {
        if image.is_empty() {
            return Err(HealthError::validation("An image file is required"));
        }

        let prediction = self.inference.classify_mri(image).await?;
        let report = MriReport {
            prediction: mri_label(&prediction.label),
            confidence: prediction.confidence,
        };

        let result = serde_json::to_value(&report).unwrap_or(serde_json::Value::Null);
        self.record(
            user,
            AnalysisKind::Mri,
            &result,
            Some(report.confidence),
            Some(&report.prediction),
        );

        Ok(report)
    }

    /// Run the CKD diagnosis model, staging only positive cases
    #[instrument(skip(self, user, input))]
    pub async fn analyze_ckd(
        &self,
        user: Option<&User>,
        input: &CkdInput,
    ) -> HealthResult<CkdReport> {
        let diagnosis = self.inference.ckd_diagnosis(input).await?;

        let report = if diagnosis == 0 {
            CkdReport {
                diagnosis_code: 0,
                prediction: "Chronic Kidney Disease not detected".to_string(),
                ckd_stage: "N/A".to_string(),
            }
        } else {
            let stage_class = self.inference.ckd_stage(input).await?;
            if stage_class > 4 {
                return Err(HealthError::api(format!(
                    "model server returned unknown CKD stage class {}",
                    stage_class
                )));
            }
            CkdReport {
                diagnosis_code: 1,
                prediction: "Chronic Kidney Disease detected".to_string(),
                ckd_stage: format!("Stage {}", stage_class + 1),
            }
        };

        let result = serde_json::to_value(&report).unwrap_or(serde_json::Value::Null);
        self.record(
            user,
            AnalysisKind::Ckd,
            &result,
            None,
            Some(&report.prediction),
        );

        Ok(report)
    }

    /// Run the cardiovascular risk model and attach care guidance
    #[instrument(skip(self, user, input))]
    pub async fn analyze_cardio(
        &self,
        user: Option<&User>,
        input: &CardioInput,
    ) -> HealthResult<CardioReport> {
        let class_id = self.inference.cardio_class(input).await?;

        let disease = CARDIO_CLASSES
            .get(class_id as usize)
            .ok_or_else(|| {
                HealthError::api(format!(
                    "model server returned unknown cardio class {}",
                    class_id
                ))
            })?
            .to_string();

        let report = CardioReport {
            recommendation: recommendation_for(&disease),
            disease,
        };

        let result = serde_json::to_value(&report).unwrap_or(serde_json::Value::Null);
        self.record(
            user,
            AnalysisKind::Cardio,
            &result,
            None,
            Some(&report.disease),
        );

        Ok(report)
    }

    /// Fetch a user's analysis history, newest first
    pub fn history(&self, user: &User, limit: usize) -> HealthResult<Vec<AnalysisRecord>> {
        Ok(self.store.history_for_user(user.id, limit)?)
    }

    /// History recording never fails an analysis request
    fn record(
        &self,
        user: Option<&User>,
        kind: AnalysisKind,
        result: &serde_json::Value,
        confidence: Option<f64>,
        diagnosis: Option<&str>,
    ) {
        let Some(user) = user else { return };

        if let Err(e) = self
            .store
            .record_analysis(user.id, kind, result, confidence, diagnosis)
        {
            warn!(
                "Failed to record {} analysis for user {}: {}",
                kind.as_str(),
                user.id,
                e
            );
        }
    }
}

/// Map the MRI model's raw label to the display form
fn mri_label(raw: &str) -> String {
    match raw.to_lowercase().as_str() {
        "glioma" | "glioma_tumor" => "Glioma Tumor".to_string(),
        "meningioma" | "meningioma_tumor" => "Meningioma Tumor".to_string(),
        "pituitary" | "pituitary_tumor" => "Pituitary Tumor".to_string(),
        "notumor" | "no_tumor" => "No Tumor".to_string(),
        _ => raw.to_string(),
    }
}

/// Care guidance per predicted condition
fn recommendation_for(disease: &str) -> Recommendation {
    match disease {
        "Diabetes" => Recommendation {
            prevention: "Limit added sugars and refined carbohydrates, keep a healthy weight \
                         and stay physically active."
                .to_string(),
            treatment: "Discuss glucose-lowering therapy and HbA1c targets with your physician."
                .to_string(),
            suggested_plan: "Follow a low-glycemic diet, exercise at least 150 minutes per week \
                             and monitor HbA1c every 3 months."
                .to_string(),
        },
        "Anaemia" => Recommendation {
            prevention: "Eat iron-rich foods such as leafy greens, legumes and lean meat, \
                         paired with vitamin C for absorption."
                .to_string(),
            treatment: "Ask your physician for iron studies and supplementation if confirmed."
                .to_string(),
            suggested_plan: "Add an iron-focused meal plan and repeat a complete blood count \
                             after 8 weeks."
                .to_string(),
        },
        "Thalassemia" => Recommendation {
            prevention: "Thalassemia is inherited; genetic counselling helps assess family risk."
                .to_string(),
            treatment: "See a hematologist for typing and, where needed, transfusion management."
                .to_string(),
            suggested_plan: "Schedule specialist follow-up, take folic acid as advised and avoid \
                             unsupervised iron supplements."
                .to_string(),
        },
        "Heart_Disease" => Recommendation {
            prevention: "Control blood pressure and cholesterol, stop smoking and manage stress."
                .to_string(),
            treatment: "Seek a cardiology review for risk stratification and medication."
                .to_string(),
            suggested_plan: "Adopt a DASH-style diet, build up supervised aerobic activity and \
                             track blood pressure weekly."
                .to_string(),
        },
        "Thrombocytopenia" => Recommendation {
            prevention: "Avoid alcohol and unnecessary NSAIDs, which can lower platelet counts \
                         further."
                .to_string(),
            treatment: "A hematology work-up is needed to find and treat the underlying cause."
                .to_string(),
            suggested_plan: "Monitor platelet counts regularly and report unusual bruising or \
                             bleeding promptly."
                .to_string(),
        },
        // "Fit" and anything unrecognized get maintenance guidance.
        _ => Recommendation {
            prevention: "Keep up your current habits: balanced meals, regular activity and \
                         enough sleep."
                .to_string(),
            treatment: "No treatment indicated by this screening.".to_string(),
            suggested_plan: "Continue routine yearly checkups and stay consistent with exercise."
                .to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_store::NewUser;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ckd_input() -> CkdInput {
        CkdInput {
            gfr: 54.0,
            serum_creatinine: 1.8,
            bun: 29.0,
            serum_calcium: 9.1,
            urine_ph: 6.0,
            blood_pressure: 138.0,
            c3_c4: 3.1,
            oxalate_levels: 28.0,
        }
    }

    fn cardio_input() -> CardioInput {
        CardioInput {
            blood_glucose: 104.0,
            hba1c: 5.4,
            systolic_bp: 121.0,
            diastolic_bp: 79.0,
            ldl: 101.0,
            hdl: 52.0,
            triglycerides: 141.0,
            haemoglobin: 13.8,
            mcv: 90.0,
        }
    }

    fn test_user(store: &UserStore) -> User {
        store
            .create_user(&NewUser {
                email: "jane@example.com".to_string(),
                full_name: "Jane Doe".to_string(),
                password_hash: Some("pbkdf2-sha256$1$aa$bb".to_string()),
                google_id: None,
                oauth_provider: None,
                profile_picture: None,
                is_verified: false,
            })
            .unwrap()
    }

    async fn mock_class(server: &MockServer, endpoint: &str, class_id: u32) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"class_id": class_id})),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn mri_maps_label_and_records_history() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/mri/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "label": "glioma",
                "confidence": 0.91
            })))
            .mount(&server)
            .await;

        let store = Arc::new(UserStore::new_in_memory().unwrap());
        let user = test_user(&store);
        let svc = AnalysisService::new(InferenceClient::new(server.uri()), Arc::clone(&store));

        let report = svc.analyze_mri(Some(&user), b"scan-bytes").await.unwrap();
        assert_eq!(report.prediction, "Glioma Tumor");

        let history = store.history_for_user(user.id, 10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, AnalysisKind::Mri);
        assert_eq!(history[0].diagnosis.as_deref(), Some("Glioma Tumor"));
        assert!(history[0].confidence.unwrap() > 0.9);
    }

    #[tokio::test]
    async fn empty_mri_upload_is_rejected_before_any_model_call() {
        let server = MockServer::start().await;
        let store = Arc::new(UserStore::new_in_memory().unwrap());
        let svc = AnalysisService::new(InferenceClient::new(server.uri()), store);

        let err = svc.analyze_mri(None, b"").await.unwrap_err();
        assert!(matches!(err, HealthError::Validation(_)));
    }

    #[tokio::test]
    async fn negative_ckd_skips_the_stage_model() {
        let server = MockServer::start().await;
        // Only the diagnosis endpoint is mocked; a stage call would 404 and
        // fail the analysis, so a passing test proves the short-circuit.
        mock_class(&server, "/v1/ckd/diagnosis", 0).await;

        let store = Arc::new(UserStore::new_in_memory().unwrap());
        let svc = AnalysisService::new(InferenceClient::new(server.uri()), store);

        let report = svc.analyze_ckd(None, &ckd_input()).await.unwrap();
        assert_eq!(report.diagnosis_code, 0);
        assert_eq!(report.ckd_stage, "N/A");
        assert_eq!(report.prediction, "Chronic Kidney Disease not detected");
    }

    #[tokio::test]
    async fn positive_ckd_reports_a_stage() {
        let server = MockServer::start().await;
        mock_class(&server, "/v1/ckd/diagnosis", 1).await;
        mock_class(&server, "/v1/ckd/stage", 2).await;

        let store = Arc::new(UserStore::new_in_memory().unwrap());
        let svc = AnalysisService::new(InferenceClient::new(server.uri()), store);

        let report = svc.analyze_ckd(None, &ckd_input()).await.unwrap();
        assert_eq!(report.diagnosis_code, 1);
        assert_eq!(report.ckd_stage, "Stage 3");
    }

    #[tokio::test]
    async fn fit_prediction_gets_maintenance_guidance() {
        let server = MockServer::start().await;
        mock_class(&server, "/v1/cardio/predict", 0).await;

        let store = Arc::new(UserStore::new_in_memory().unwrap());
        let svc = AnalysisService::new(InferenceClient::new(server.uri()), store);

        let report = svc.analyze_cardio(None, &cardio_input()).await.unwrap();
        assert_eq!(report.disease, "Fit");
        assert!(report.recommendation.prevention.contains("habits"));
    }

    #[tokio::test]
    async fn heart_disease_class_maps_to_underscored_label() {
        let server = MockServer::start().await;
        mock_class(&server, "/v1/cardio/predict", 4).await;

        let store = Arc::new(UserStore::new_in_memory().unwrap());
        let svc = AnalysisService::new(InferenceClient::new(server.uri()), store);

        let report = svc.analyze_cardio(None, &cardio_input()).await.unwrap();
        assert_eq!(report.disease, "Heart_Disease");
    }

    #[tokio::test]
    async fn unknown_cardio_class_is_an_api_error() {
        let server = MockServer::start().await;
        mock_class(&server, "/v1/cardio/predict", 9).await;

        let store = Arc::new(UserStore::new_in_memory().unwrap());
        let svc = AnalysisService::new(InferenceClient::new(server.uri()), store);

        let err = svc.analyze_cardio(None, &cardio_input()).await.unwrap_err();
        assert!(matches!(err, HealthError::Api(_)));
    }

    #[test]
    fn every_cardio_label_has_complete_guidance() {
        for disease in CARDIO_CLASSES {
            let rec = recommendation_for(disease);
            assert!(!rec.prevention.is_empty(), "no prevention for {}", disease);
            assert!(!rec.treatment.is_empty(), "no treatment for {}", disease);
            assert!(
                !rec.suggested_plan.is_empty(),
                "no suggested plan for {}",
                disease
            );
        }
    }

    #[tokio::test]
    async fn anonymous_analyses_leave_no_history() {
        let server = MockServer::start().await;
        mock_class(&server, "/v1/cardio/predict", 1).await;

        let store = Arc::new(UserStore::new_in_memory().unwrap());
        let user = test_user(&store);
        let svc = AnalysisService::new(InferenceClient::new(server.uri()), Arc::clone(&store));

        svc.analyze_cardio(None, &cardio_input()).await.unwrap();
        assert!(store.history_for_user(user.id, 10).unwrap().is_empty());
    }
}
