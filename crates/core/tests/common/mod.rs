#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};
use medgemma_core::{
    Config, Credential, RawResponse, Transport, payload::WireBody, transport::TransportResult,
};
use std::sync::{Arc, Mutex};
use url::Url;

pub const TEST_TOKEN: &str = "hf_test_token";

/// Config pointing at a mock server's `/models` prefix.
pub fn config_for(server_uri: &str) -> Config {
    Config {
        base_url: format!("{}/models", server_uri),
        ..Config::default()
    }
}

pub fn credential() -> Credential {
    Credential::new(TEST_TOKEN)
}

pub fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

/// Mock transport that records every call and replays a canned response.
#[derive(Debug, Clone)]
pub struct RecordingTransport {
    pub calls: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
    pub response: RawResponse,
}

impl RecordingTransport {
    pub fn new(response: RawResponse) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            response,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post_json(&self, url: &Url, body: &WireBody, _credential: &Credential) -> TransportResult {
        let body = serde_json::to_value(body).unwrap();
        self.calls.lock().unwrap().push((url.to_string(), body));
        Ok(self.response.clone())
    }

    async fn get(&self, url: &Url, _credential: &Credential) -> TransportResult {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), serde_json::Value::Null));
        Ok(self.response.clone())
    }
}
