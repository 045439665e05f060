//! SVG renderer for redemption URLs.
//!
//! SVG keeps the payload small and scales cleanly in both the mobile app
//! and printed confirmations, so it is the only target shipped.

use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};

use bl_core::errors::DomainError;
use bl_core::services::QrRenderer;

/// Renders text as an SVG QR image
pub struct SvgQrRenderer {
    /// Minimum edge length of the rendered image in pixels
    min_dimension: u32,
}

impl SvgQrRenderer {
    /// Create a renderer with the default 240px minimum edge
    pub fn new() -> Self {
        Self { min_dimension: 240 }
    }

    /// Create a renderer with a custom minimum edge length
    pub fn with_min_dimension(min_dimension: u32) -> Self {
        Self { min_dimension }
    }
}

impl Default for SvgQrRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl QrRenderer for SvgQrRenderer {
    fn encode(&self, text: &str) -> Result<Vec<u8>, DomainError> {
        // Medium error correction; redemption URLs are short enough that
        // the extra redundancy costs little.
        let code = QrCode::with_error_correction_level(text, EcLevel::M).map_err(|e| {
            DomainError::Internal {
                message: format!("failed to encode QR payload: {}", e),
            }
        })?;

        let image = code
            .render::<svg::Color>()
            .min_dimensions(self.min_dimension, self.min_dimension)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build();

        Ok(image.into_bytes())
    }

    fn content_type(&self) -> &'static str {
        "image/svg+xml"
    }
}
