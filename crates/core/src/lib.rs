//! MedGemma Core Library
//!
//! This library orchestrates requests to a hosted MedGemma inference
//! endpoint: it turns medical images and clinical text into provider
//! payloads, sends them, and normalizes whatever comes back into a single
//! [`InferenceResult`].
//!
//! # Overview
//!
//! Five analysis modes are supported (see [`AnalysisMode`]):
//!
//! - **Describe**: free-form description of one image
//! - **Answer**: answer a question about one image
//! - **Report**: structured radiology report for one image
//! - **Compare**: change analysis between an earlier and a later image
//! - **ClinicalReasoning**: text-only differential diagnosis and workup
//!
//! The pipeline for each call is:
//!
//! - **Dispatch**: validate inputs, pick prompt and model via [`mode`]
//! - **Encode**: merge comparison pairs and base64 PNG via [`image_processing`]
//! - **Build**: assemble the chat payload via [`payload`]
//! - **Send**: one POST with a 120 s timeout via [`transport`]
//! - **Normalize**: map status and body shape to a result via [`normalize`]
//!
//! # Quick Start
//!
//! ```ignore
//! use medgemma_core::{AnalysisRequest, Config, Credential, MedGemmaClient};
//!
//! let client = MedGemmaClient::new(Config::load()?)?;
//! let image = image::open("chest.png")?;
//!
//! let result = client
//!     .run_analysis(AnalysisRequest::describe(image), Credential::new(token))
//!     .await;
//!
//! match result {
//!     InferenceResult::Success { text } => println!("{}", text),
//!     InferenceResult::Failure { kind, detail } => eprintln!("{}: {}", kind, detail),
//! }
//! ```
//!
//! # Module Structure
//!
//! - [`classify`]: Closed error taxonomy and status classification
//! - [`config`]: Endpoint/model configuration and the per-call credential
//! - [`error`]: Internal error types and result aliases
//! - [`image_processing`]: PNG encoding and side-by-side merging
//! - [`medgemma`]: Client facade and model status probe
//! - [`mode`]: Analysis modes, prompt templates, and dispatch
//! - [`normalize`]: Provider response normalization
//! - [`payload`]: Wire body construction
//! - [`result`]: The normalized [`InferenceResult`]
//! - [`transport`]: HTTP transport abstraction

pub mod classify;
pub mod config;
pub mod error;
pub mod image_processing;
pub mod medgemma;
pub mod mode;
pub mod normalize;
pub mod payload;
pub mod result;
pub mod transport;

// Re-export primary types for convenience
pub use classify::ErrorKind;
pub use config::{Config, Credential};
pub use error::{AppError, Result};
pub use image_processing::{EncodedImage, ImageProcessor};
pub use medgemma::{MedGemmaClient, ModelStatus};
pub use mode::{AnalysisMode, AnalysisRequest, PromptRequest};
pub use result::InferenceResult;
pub use transport::{HttpTransport, RawResponse, Transport, TransportFailure};

/// Initializes the library by loading environment variables.
///
/// Call this once at application startup. This loads `.env` files if
/// present so that [`Config::load`] and the front-end can see them.
pub fn init() {
    let _ = dotenvy::dotenv();
}
