//! Bundled chart font.
//!
//! Text is rasterised with Plotters' pure-Rust `ab_glyph` backend, which only
//! knows fonts registered at runtime. DejaVu Sans ships inside the binary and
//! is registered under the family every chart asks for.

use std::sync::OnceLock;

use plotters::style::FontStyle;

/// Embedded at compile time (license in `fonts/DejaVuSans-LICENSE.txt`).
pub static BUNDLED_FONT_BYTES: &[u8] = include_bytes!("../../fonts/DejaVuSans.ttf");

/// Family name used by every text style in the charts.
pub const FONT_FAMILY: &str = "sans-serif";

static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();

/// Register the bundled font once per process.
pub fn ensure_registered() -> Result<(), String> {
    REGISTERED
        .get_or_init(|| {
            plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, BUNDLED_FONT_BYTES)
                .map_err(|_| "bundled font is unusable: invalid font data".to_string())
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_font_registers_repeatedly() {
        assert!(BUNDLED_FONT_BYTES.len() > 1024);
        ensure_registered().unwrap();
        ensure_registered().unwrap();
    }
}
