use crate::config::{Config, Credential};
use crate::error::Result;
use crate::mode::{dispatch, AnalysisRequest};
use crate::normalize::normalize;
use crate::payload::WireBody;
use crate::result::InferenceResult;
use crate::transport::{HttpTransport, Transport};
use std::fmt;
use tracing::{debug, info};

/// Advisory availability of the vision model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelStatus {
    Available,
    Loading,
    ProbeFailed(String),
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelStatus::Available => f.write_str("available"),
            ModelStatus::Loading => f.write_str("loading"),
            ModelStatus::ProbeFailed(reason) => write!(f, "check failed: {}", reason),
        }
    }
}

pub struct MedGemmaClient<T: Transport = HttpTransport> {
    config: Config,
    transport: T,
}

impl MedGemmaClient<HttpTransport> {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }
}

impl<T: Transport> MedGemmaClient<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs one analysis end to end: dispatch, build, send, normalize.
    ///
    /// Never fails: every problem is reported as [`InferenceResult::Failure`].
    /// The request, its encoded images and the credential are dropped before
    /// this returns.
    pub async fn run_analysis(&self, request: AnalysisRequest, credential: Credential) -> InferenceResult {
        let mode = request.mode;

        let prompt = match dispatch(request, &self.config, credential) {
            Ok(prompt) => prompt,
            Err(e) => {
                info!(mode = %mode, error = %e, "Rejected analysis request before sending");
                return e.into();
            }
        };

        let url = match self.config.model_url(&prompt.model_id) {
            Ok(url) => url,
            Err(e) => return e.into(),
        };

        let body = WireBody::build(&prompt);
        debug!(mode = %mode, model = %prompt.model_id, "Request sent");

        let result = match self.transport.post_json(&url, &body, &prompt.credential).await {
            Ok(raw) => normalize(mode, &raw),
            Err(failure) => failure.into(),
        };

        info!(
            mode = %mode,
            outcome = result.error_kind().map_or("success", |kind| kind.as_str()),
            "Analysis finished"
        );
        result
    }

    /// Probes the vision model. Advisory only; never gates `run_analysis`.
    pub async fn check_status(&self, credential: &Credential) -> ModelStatus {
        let url = match self.config.model_url(&self.config.vision_model) {
            Ok(url) => url,
            Err(e) => return ModelStatus::ProbeFailed(e.to_string()),
        };

        let status = match self.transport.get(&url, credential).await {
            Ok(raw) if raw.status == 200 => ModelStatus::Available,
            Ok(_) => ModelStatus::Loading,
            Err(failure) => ModelStatus::ProbeFailed(failure.to_string()),
        };

        debug!(model = %self.config.vision_model, status = %status, "Model status probed");
        status
    }
}
