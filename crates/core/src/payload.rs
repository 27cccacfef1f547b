//! Wire payloads for the inference provider.
//!
//! Every request is a single user turn whose content is a text part followed
//! by zero or more image parts:
//!
//! ```json
//! {
//!   "inputs": [
//!     {
//!       "role": "user",
//!       "content": [
//!         { "type": "text", "text": "Please describe this medical image in detail." },
//!         { "type": "image", "image": "data:image/png;base64,iVBORw0..." }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Text-only requests additionally carry fixed generation parameters.

use crate::mode::PromptRequest;
use serde::Serialize;

/// Upper bound on generated tokens for text-only requests.
pub const MAX_NEW_TOKENS: u32 = 400;
/// Sampling temperature for text-only requests.
pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireBody {
    pub inputs: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<GenerationParameters>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Image { image: String },
}

/// Closed set of generation parameters. Not caller-overridable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: MAX_NEW_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

impl WireBody {
    pub fn build(request: &PromptRequest) -> Self {
        let mut content = Vec::with_capacity(1 + request.images.len());
        content.push(ContentPart::Text {
            text: request.prompt_text.clone(),
        });
        content.extend(request.images.iter().map(|image| ContentPart::Image {
            image: image.data_uri(),
        }));

        let parameters = request
            .mode
            .is_text_only()
            .then(GenerationParameters::default);

        Self {
            inputs: vec![WireMessage {
                role: "user",
                content,
            }],
            parameters,
        }
    }

    /// Count of image parts across all messages.
    pub fn image_parts(&self) -> usize {
        self.inputs
            .iter()
            .flat_map(|message| message.content.iter())
            .filter(|part| matches!(part, ContentPart::Image { .. }))
            .count()
    }
}
