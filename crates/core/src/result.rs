//! The normalized outcome of one analysis request.

use crate::classify::ErrorKind;
use crate::error::AppError;
use crate::transport::TransportFailure;
use serde::Serialize;

/// The only value handed back across the analysis boundary.
///
/// Every failure mode (bad input, provider errors, network faults) is
/// represented as data in [`InferenceResult::Failure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InferenceResult {
    Success { text: String },
    Failure { kind: ErrorKind, detail: String },
}

impl InferenceResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success { text: text.into() }
    }

    pub fn failure(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Success { text } => Some(text),
            Self::Failure { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<AppError> for InferenceResult {
    fn from(error: AppError) -> Self {
        Self::failure(ErrorKind::classify(&error), error.to_string())
    }
}

impl From<TransportFailure> for InferenceResult {
    fn from(failure: TransportFailure) -> Self {
        Self::failure(ErrorKind::from_transport(&failure), failure.to_string())
    }
}
