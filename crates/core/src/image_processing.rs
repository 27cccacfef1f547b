//! Image processing and encoding utilities.
//!
//! This module prepares uploaded images for transmission to the inference
//! provider: comparison pairs are merged onto one canvas, and every image is
//! re-serialized as PNG and base64-encoded.
//!
//! # Canvas Layout
//!
//! The comparison canvas places the earlier image on the left and the later
//! image on the right, both top-aligned:
//!
//! ```text
//! (0,0)          (w1,0)
//!   +------------+--------+
//!   |  earlier   | later  |
//!   |            |        |
//!   +------------+        |
//!   | background |        |
//!   +------------+--------+
//! ```
//!
//! The canvas is `(w1 + w2) x max(h1, h2)`; uncovered area stays black.

use crate::error::{AppError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{imageops, DynamicImage, ImageFormat, RgbImage};
use std::fmt;
use std::io::Cursor;

/// MIME type of every [`EncodedImage`].
pub const PNG_MIME: &str = "image/png";

/// A base64-encoded PNG, produced fresh for one request.
///
/// Not `Clone`: the bytes belong to exactly one request and are dropped with it.
#[derive(PartialEq, Eq)]
pub struct EncodedImage {
    data: String,
}

impl EncodedImage {
    /// The raw base64 payload (no data-URI prefix).
    pub fn base64(&self) -> &str {
        &self.data
    }

    pub fn content_type(&self) -> &'static str {
        PNG_MIME
    }

    /// `data:image/png;base64,...` form used inside chat message parts.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", PNG_MIME, self.data)
    }
}

impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("content_type", &PNG_MIME)
            .field("base64_len", &self.data.len())
            .finish()
    }
}

/// Image processing utilities for the analysis workflow.
///
/// This struct provides static methods for processing uploaded images
/// before sending them to the inference provider.
pub struct ImageProcessor;

impl ImageProcessor {
    /// Encodes an image as a base64 PNG.
    ///
    /// Any input format is accepted; the pixels are re-serialized as PNG
    /// regardless of how the image was originally stored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ImageProcessing`] if the PNG encoder rejects the
    /// pixel layout.
    pub fn encode_png(image: &DynamicImage) -> Result<EncodedImage> {
        let mut buffer: Vec<u8> = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| AppError::image(format!("Failed to encode image as PNG: {}", e)))?;

        Ok(EncodedImage {
            data: BASE64.encode(buffer),
        })
    }

    /// Places two images side by side on a single RGB canvas.
    ///
    /// `earlier` lands at `(0, 0)` and `later` at `(earlier.width(), 0)`.
    /// Order matters: swapping the arguments produces a different canvas.
    ///
    /// # Arguments
    ///
    /// * `earlier` - The prior study, drawn on the left
    /// * `later` - The follow-up study, drawn on the right
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ImageProcessing`] if the combined width overflows
    /// or the canvas would be empty.
    pub fn merge_side_by_side(earlier: &DynamicImage, later: &DynamicImage) -> Result<DynamicImage> {
        let width = earlier
            .width()
            .checked_add(later.width())
            .ok_or_else(|| AppError::image("Combined comparison width overflows"))?;
        let height = earlier.height().max(later.height());

        if width == 0 || height == 0 {
            return Err(AppError::image("Cannot compare images with zero area"));
        }

        let mut canvas = RgbImage::new(width, height);
        imageops::replace(&mut canvas, &earlier.to_rgb8(), 0, 0);
        imageops::replace(&mut canvas, &later.to_rgb8(), i64::from(earlier.width()), 0);

        Ok(DynamicImage::ImageRgb8(canvas))
    }
}
