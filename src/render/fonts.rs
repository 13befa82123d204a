//! Font loading with a bundled fallback.
//!
//! Configured font paths are attempted first; any failure degrades to the
//! bundled DejaVu faces with a warning rather than aborting the render.
//! Only a parse failure of the bundled bytes themselves is an error.

use std::fs;
use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use tracing::warn;

use crate::error::{Error, Result};
use crate::render::layout::TextMeasurer;

const BUNDLED_REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
const BUNDLED_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// Regular and bold faces used by the card renderer.
#[derive(Clone)]
pub struct FontProvider {
    regular: FontArc,
    bold: FontArc,
}

impl FontProvider {
    /// Load the bundled DejaVu faces.
    pub fn bundled() -> Result<Self> {
        Ok(Self {
            regular: parse_font("bundled DejaVuSans", BUNDLED_REGULAR.to_vec())?,
            bold: parse_font("bundled DejaVuSans-Bold", BUNDLED_BOLD.to_vec())?,
        })
    }

    /// Load fonts from the configured paths, degrading face-by-face to the
    /// bundled fonts on any read or parse failure.
    pub fn load(regular_path: Option<&Path>, bold_path: Option<&Path>) -> Result<Self> {
        let bundled = Self::bundled()?;
        Ok(Self {
            regular: load_or_fallback(regular_path, bundled.regular),
            bold: load_or_fallback(bold_path, bundled.bold),
        })
    }

    pub fn regular(&self) -> &FontArc {
        &self.regular
    }

    pub fn bold(&self) -> &FontArc {
        &self.bold
    }
}

fn load_or_fallback(path: Option<&Path>, fallback: FontArc) -> FontArc {
    let Some(path) = path else {
        return fallback;
    };
    let loaded = fs::read(path)
        .map_err(|e| Error::font_load(path.display().to_string(), e.to_string()))
        .and_then(|bytes| parse_font(&path.display().to_string(), bytes));
    match loaded {
        Ok(font) => font,
        Err(e) => {
            warn!(error = %e.format_for_log(), "Font load failed, using bundled fallback");
            fallback
        }
    }
}

fn parse_font(name: &str, bytes: Vec<u8>) -> Result<FontArc> {
    FontArc::try_from_vec(bytes).map_err(|e| Error::font_load(name, e.to_string()))
}

// ─────────────────────────────────────────────────────────────────
// Font-backed text measurement
// ─────────────────────────────────────────────────────────────────

/// Glyph-accurate [`TextMeasurer`] over a scaled font, including kerning.
pub struct FontMeasurer<'f> {
    font: &'f FontArc,
    scale: PxScale,
}

impl<'f> FontMeasurer<'f> {
    pub fn new(font: &'f FontArc, px: f32) -> Self {
        Self { font, scale: PxScale::from(px) }
    }
}

impl TextMeasurer for FontMeasurer<'_> {
    fn measure(&self, text: &str) -> f32 {
        let scaled = self.font.as_scaled(self.scale);
        let mut width = 0.0;
        let mut previous: Option<ab_glyph::GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_fonts_parse() {
        let fonts = FontProvider::bundled().unwrap();
        // both faces know basic glyphs
        assert_ne!(fonts.regular().glyph_id('a').0, 0);
        assert_ne!(fonts.bold().glyph_id('a').0, 0);
    }

    #[test]
    fn test_missing_path_degrades_to_bundled() {
        let fonts =
            FontProvider::load(Some(Path::new("/nonexistent/font.ttf")), None).unwrap();
        assert_ne!(fonts.regular().glyph_id('a').0, 0);
    }

    #[test]
    fn test_measure_monotonic_in_text_length() {
        let fonts = FontProvider::bundled().unwrap();
        let measurer = FontMeasurer::new(fonts.regular(), 16.0);
        let short = measurer.measure("hello");
        let long = measurer.measure("hello world");
        assert!(long > short);
        assert_eq!(measurer.measure(""), 0.0);
    }

    #[test]
    fn test_measure_deterministic() {
        let fonts = FontProvider::bundled().unwrap();
        let measurer = FontMeasurer::new(fonts.regular(), 16.0);
        assert_eq!(measurer.measure("persona"), measurer.measure("persona"));
    }
}
