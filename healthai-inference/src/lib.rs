//! Model server client
//!
//! The pre-trained classifiers (brain MRI, CKD diagnosis/stage,
//! cardiovascular risk) are served by an external model server. This crate
//! is the typed HTTP client for its predict endpoints; no inference happens
//! in-process.

pub mod client;
pub mod types;

pub use client::{InferenceClient, DEFAULT_INFERENCE_URL};
pub use types::{ClassPrediction, LabelPrediction};
