//! Analysis modes and request dispatch.
//!
//! Each [`AnalysisMode`] fixes three things: which inputs are required, which
//! prompt template is sent, and which model serves the request. [`dispatch`]
//! validates an [`AnalysisRequest`] against those rules and turns it into a
//! ready-to-send [`PromptRequest`].

use crate::config::{Config, Credential};
use crate::error::{AppError, Result};
use crate::image_processing::{EncodedImage, ImageProcessor};
use image::DynamicImage;
use serde::Serialize;
use std::fmt;
use tracing::debug;

const DESCRIBE_PROMPT: &str = "Please describe this medical image in detail.";

const REPORT_PROMPT: &str = "Generate a detailed radiology report for this medical image. \
Include sections for: Technique, Findings, Impression, and Recommendations. \
Use professional radiology terminology.";

const COMPARE_PROMPT: &str = "Compare these two medical images (left: earlier, right: later). \
Analyze and describe any changes, improvements, deterioration, or stability. \
Provide specific observations about the differences.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Describe,
    Answer,
    Report,
    Compare,
    ClinicalReasoning,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 5] = [
        AnalysisMode::Describe,
        AnalysisMode::Answer,
        AnalysisMode::Report,
        AnalysisMode::Compare,
        AnalysisMode::ClinicalReasoning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Describe => "describe",
            AnalysisMode::Answer => "answer",
            AnalysisMode::Report => "report",
            AnalysisMode::Compare => "compare",
            AnalysisMode::ClinicalReasoning => "clinical_reasoning",
        }
    }

    /// Number of images the caller must supply.
    pub fn required_images(&self) -> usize {
        match self {
            AnalysisMode::ClinicalReasoning => 0,
            AnalysisMode::Compare => 2,
            _ => 1,
        }
    }

    /// Number of image parts that end up on the wire (Compare merges to one).
    pub fn transmitted_images(&self) -> usize {
        self.required_images().min(1)
    }

    pub fn is_text_only(&self) -> bool {
        matches!(self, AnalysisMode::ClinicalReasoning)
    }

    pub fn model_id<'a>(&self, config: &'a Config) -> &'a str {
        if self.is_text_only() {
            &config.text_model
        } else {
            &config.vision_model
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw inputs collected by the front-end for one analysis.
///
/// Images are owned so they are dropped as soon as the request completes.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub mode: AnalysisMode,
    pub images: Vec<DynamicImage>,
    pub question: Option<String>,
    pub clinical_text: Option<String>,
}

impl AnalysisRequest {
    pub fn new(mode: AnalysisMode) -> Self {
        Self {
            mode,
            images: Vec::new(),
            question: None,
            clinical_text: None,
        }
    }

    pub fn describe(image: DynamicImage) -> Self {
        Self::new(AnalysisMode::Describe).with_image(image)
    }

    pub fn answer(image: DynamicImage, question: impl Into<String>) -> Self {
        Self::new(AnalysisMode::Answer)
            .with_image(image)
            .with_question(question)
    }

    pub fn report(image: DynamicImage) -> Self {
        Self::new(AnalysisMode::Report).with_image(image)
    }

    pub fn compare(earlier: DynamicImage, later: DynamicImage) -> Self {
        Self::new(AnalysisMode::Compare)
            .with_image(earlier)
            .with_image(later)
    }

    pub fn clinical_reasoning(clinical_text: impl Into<String>) -> Self {
        Self::new(AnalysisMode::ClinicalReasoning).with_clinical_text(clinical_text)
    }

    pub fn with_image(mut self, image: DynamicImage) -> Self {
        self.images.push(image);
        self
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    pub fn with_clinical_text(mut self, clinical_text: impl Into<String>) -> Self {
        self.clinical_text = Some(clinical_text.into());
        self
    }
}

/// A fully-formed request for one call to the provider.
#[derive(Debug)]
pub struct PromptRequest {
    pub mode: AnalysisMode,
    pub prompt_text: String,
    pub images: Vec<EncodedImage>,
    pub model_id: String,
    pub credential: Credential,
}

/// Validates `request`, picks the prompt and model, and encodes the images.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] when the credential is empty, the image
/// count does not match the mode, or required text is blank. Returns
/// [`AppError::ImageProcessing`] if merging or encoding fails.
pub fn dispatch(
    request: AnalysisRequest,
    config: &Config,
    credential: Credential,
) -> Result<PromptRequest> {
    let AnalysisRequest {
        mode,
        images,
        question,
        clinical_text,
    } = request;

    if credential.is_empty() {
        return Err(AppError::invalid_input("an API credential is required"));
    }

    if images.len() != mode.required_images() {
        return Err(AppError::invalid_input(format!(
            "{} mode requires {} image(s), got {}",
            mode,
            mode.required_images(),
            images.len()
        )));
    }

    let prompt_text = match mode {
        AnalysisMode::Describe => DESCRIBE_PROMPT.to_string(),
        AnalysisMode::Answer => required_text(question, "question")?,
        AnalysisMode::Report => REPORT_PROMPT.to_string(),
        AnalysisMode::Compare => COMPARE_PROMPT.to_string(),
        AnalysisMode::ClinicalReasoning => {
            clinical_reasoning_prompt(&required_text(clinical_text, "clinical text")?)
        }
    };

    let encoded = match images.as_slice() {
        [] => Vec::new(),
        [image] => vec![ImageProcessor::encode_png(image)?],
        [earlier, later] => {
            let merged = ImageProcessor::merge_side_by_side(earlier, later)?;
            vec![ImageProcessor::encode_png(&merged)?]
        }
        _ => return Err(AppError::invalid_input("at most two images are supported")),
    };

    let model_id = mode.model_id(config).to_string();

    debug!(
        mode = %mode,
        model = %model_id,
        images = encoded.len(),
        prompt_chars = prompt_text.len(),
        "Dispatched analysis request"
    );

    Ok(PromptRequest {
        mode,
        prompt_text,
        images: encoded,
        model_id,
        credential,
    })
}

fn required_text(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(AppError::invalid_input(format!("{} must not be empty", field))),
    }
}

fn clinical_reasoning_prompt(clinical_text: &str) -> String {
    format!(
        "Based on the following clinical information, provide a comprehensive clinical reasoning:\n\n\
         {}\n\n\
         Please include:\n\
         1. Differential diagnosis\n\
         2. Recommended investigations\n\
         3. Initial management approach\n\
         4. Key considerations",
        clinical_text
    )
}
