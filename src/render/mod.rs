//! Rendering pipeline: layout, fonts, avatar, card, and report.

pub mod avatar;
pub mod card;
pub mod fonts;
pub mod layout;
pub mod report;

use image::Rgba;

use crate::error::{Error, Result};
use crate::types::Confidence;

/// Fixed card canvas, portrait orientation.
pub const CANVAS_WIDTH: u32 = 1200;
pub const CANVAS_HEIGHT: u32 = 1600;

// ─────────────────────────────────────────────────────────────────
// Card Style
// ─────────────────────────────────────────────────────────────────

/// Colors and sizing knobs for the card renderer. Built from configuration;
/// the defaults are the dark theme the card ships with.
#[derive(Debug, Clone)]
pub struct CardStyle {
    pub background: Rgba<u8>,
    pub panel: Rgba<u8>,
    pub accent: Rgba<u8>,
    pub text: Rgba<u8>,
    pub muted: Rgba<u8>,
    pub avatar_size: u32,
    pub motivation_strength: MotivationStrength,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            background: Rgba([0x18, 0x1a, 0x1b, 0xff]),
            panel: Rgba([0x23, 0x25, 0x26, 0xff]),
            accent: Rgba([0x4c, 0xaf, 0x50, 0xff]),
            text: Rgba([0xf3, 0xf4, 0xf6, 0xff]),
            muted: Rgba([0x88, 0x88, 0x88, 0xff]),
            avatar_size: 160,
            motivation_strength: MotivationStrength::default(),
        }
    }
}

/// Bar fill fraction per confidence level for the motivations section.
/// Unknown shares the Low fill, matching the sort behavior.
#[derive(Debug, Clone, Copy)]
pub struct MotivationStrength {
    pub high: f32,
    pub medium: f32,
    pub low: f32,
}

impl Default for MotivationStrength {
    fn default() -> Self {
        Self { high: 0.9, medium: 0.65, low: 0.4 }
    }
}

impl MotivationStrength {
    pub fn for_confidence(&self, confidence: Confidence) -> f32 {
        let fraction = match confidence {
            Confidence::High => self.high,
            Confidence::Medium => self.medium,
            Confidence::Low | Confidence::Unknown => self.low,
        };
        fraction.clamp(0.0, 1.0)
    }
}

// ─────────────────────────────────────────────────────────────────
// Hex Colors
// ─────────────────────────────────────────────────────────────────

/// Parse a `#RRGGBB` hex color into an opaque RGBA pixel.
pub fn parse_hex_color(raw: &str) -> Result<Rgba<u8>> {
    let hex = raw.strip_prefix('#').unwrap_or(raw);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::config_field_invalid(
            "color",
            format!("'{}' is not a #RRGGBB hex color", raw),
        ));
    }
    let channel = |i: usize| -> u8 {
        // validated above, slice is two hex digits
        u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0)
    };
    Ok(Rgba([channel(0), channel(2), channel(4), 0xff]))
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#4CAF50").unwrap(), Rgba([0x4c, 0xaf, 0x50, 0xff]));
        assert_eq!(parse_hex_color("181a1b").unwrap(), Rgba([0x18, 0x1a, 0x1b, 0xff]));
    }

    #[test]
    fn test_parse_hex_color_rejects_malformed() {
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gggggg").is_err());
        assert!(parse_hex_color("").is_err());
        assert!(parse_hex_color("#4CAF50AA").is_err());
    }

    #[test]
    fn test_motivation_strength_table() {
        let table = MotivationStrength::default();
        assert_eq!(table.for_confidence(Confidence::High), 0.9);
        assert_eq!(table.for_confidence(Confidence::Medium), 0.65);
        assert_eq!(table.for_confidence(Confidence::Low), 0.4);
        assert_eq!(
            table.for_confidence(Confidence::Unknown),
            table.for_confidence(Confidence::Low)
        );
    }

    #[test]
    fn test_motivation_strength_clamped() {
        let table = MotivationStrength { high: 1.8, medium: -0.2, low: 0.5 };
        assert_eq!(table.for_confidence(Confidence::High), 1.0);
        assert_eq!(table.for_confidence(Confidence::Medium), 0.0);
    }
}
