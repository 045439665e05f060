//! QR image rendering.

pub mod renderer;

pub use renderer::SvgQrRenderer;
