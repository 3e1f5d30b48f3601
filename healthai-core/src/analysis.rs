//! Data structures for the medical analysis endpoints
//!
//! Inputs mirror the forms submitted by the frontend; reports mirror what it
//! renders. Wire names that differ from Rust conventions carry explicit
//! serde renames.

use serde::{Deserialize, Serialize};

/// Which analysis produced a result (used for history records)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Mri,
    Ckd,
    Cardio,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Mri => "mri",
            AnalysisKind::Ckd => "ckd",
            AnalysisKind::Cardio => "cardio",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "mri" => Some(AnalysisKind::Mri),
            "ckd" => Some(AnalysisKind::Ckd),
            "cardio" => Some(AnalysisKind::Cardio),
            _ => None,
        }
    }
}

/// Renal panel values for CKD analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkdInput {
    /// Glomerular filtration rate (mL/min/1.73m2)
    pub gfr: f64,
    /// Serum creatinine (mg/dL)
    pub serum_creatinine: f64,
    /// Blood urea nitrogen (mg/dL)
    pub bun: f64,
    /// Serum calcium (mg/dL)
    pub serum_calcium: f64,
    /// Urine pH
    pub urine_ph: f64,
    /// Systolic blood pressure (mmHg)
    pub blood_pressure: f64,
    /// Complement C3/C4 ratio
    pub c3_c4: f64,
    /// Urinary oxalate (mg/day)
    pub oxalate_levels: f64,
}

/// CKD analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkdReport {
    /// 0 = no CKD detected, 1 = CKD detected
    pub diagnosis_code: u8,
    /// Human-readable diagnosis sentence
    pub prediction: String,
    /// Stage when positive ("Stage 1".."Stage 5"), otherwise "N/A"
    pub ckd_stage: String,
}

/// Blood markers and vitals for cardiovascular risk analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardioInput {
    pub blood_glucose: f64,
    #[serde(rename = "HbA1C")]
    pub hba1c: f64,
    #[serde(rename = "Systolic_BP")]
    pub systolic_bp: f64,
    #[serde(rename = "Diastolic_BP")]
    pub diastolic_bp: f64,
    #[serde(rename = "LDL")]
    pub ldl: f64,
    #[serde(rename = "HDL")]
    pub hdl: f64,
    #[serde(rename = "Triglycerides")]
    pub triglycerides: f64,
    #[serde(rename = "Haemoglobin")]
    pub haemoglobin: f64,
    #[serde(rename = "MCV")]
    pub mcv: f64,
}

/// Care guidance attached to a cardiovascular prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub prevention: String,
    pub treatment: String,
    pub suggested_plan: String,
}

/// Cardiovascular risk analysis result
///
/// `disease` is "Fit" for a healthy prediction, otherwise a condition name
/// with underscores (the frontend replaces them with spaces for display).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardioReport {
    pub disease: String,
    pub recommendation: Recommendation,
}

/// Brain MRI classification result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MriReport {
    /// Human-readable class label (e.g., "Glioma Tumor", "No Tumor")
    pub prediction: String,
    /// Classifier confidence in [0, 1]
    pub confidence: f64,
}
