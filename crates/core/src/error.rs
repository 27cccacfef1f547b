//! Error types for the medgemma-core library.
//!
//! These errors describe failures that happen while *forming* a request:
//! bad configuration, missing inputs, images that cannot be encoded.
//! They never cross the analysis boundary as-is; [`crate::MedGemmaClient`]
//! folds them into [`crate::InferenceResult::Failure`] via
//! [`crate::ErrorKind::classify`].

use thiserror::Error;

/// Errors that can occur within the medgemma-core library.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (invalid base URL, bad model id).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required input (image, question, clinical text, credential) was
    /// missing or empty.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Image merging or encoding failed.
    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    /// Failed to construct the HTTP client.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an invalid input error with the given message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates an image processing error with the given message.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::ImageProcessing(msg.into())
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
