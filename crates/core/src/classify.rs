//! Error classification.
//!
//! A stateless lookup from request outcomes (internal errors, transport
//! failures, HTTP status codes) into the closed [`ErrorKind`] taxonomy shown
//! to users.

use crate::error::AppError;
use crate::transport::TransportFailure;
use serde::Serialize;
use std::fmt;

/// User-facing failure categories. This set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Required text/image missing or malformed; no call was issued.
    InvalidInput,
    /// The provider answered 503 while the model warms up.
    ServiceLoading,
    /// Any other non-2xx status.
    ApiError,
    /// Connection failure or timeout.
    NetworkError,
    /// A 2xx response whose body is not JSON.
    UnparseableResponse,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::ServiceLoading => "service_loading",
            ErrorKind::ApiError => "api_error",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::UnparseableResponse => "unparseable_response",
        }
    }

    /// Classifies an error raised while forming a request. None of these
    /// reach the network, so they all surface as [`ErrorKind::InvalidInput`].
    pub fn classify(error: &AppError) -> Self {
        match error {
            AppError::InvalidInput(_)
            | AppError::ImageProcessing(_)
            | AppError::Config(_)
            | AppError::HttpClient(_)
            | AppError::Json(_) => ErrorKind::InvalidInput,
        }
    }

    /// Classifies an HTTP status. Returns `None` for 2xx.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            503 => Some(ErrorKind::ServiceLoading),
            _ => Some(ErrorKind::ApiError),
        }
    }

    pub fn from_transport(_failure: &TransportFailure) -> Self {
        ErrorKind::NetworkError
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
