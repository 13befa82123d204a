//! Persona card renderer.
//!
//! Draws a fixed 1200x1600 portrait card from a persona document. The
//! layout is a static two-column table of section frames; content never
//! moves a frame, it is wrapped and truncated to fit inside one. Rendering
//! is deterministic: the same document, profile, and avatar bytes always
//! produce the same pixels.
//!
//! Confidence is never drawn on the card. It orders list entries and sets
//! motivation bar strength; the report carries the visible glyphs.

use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fetch::ImageFetcher;
use crate::render::avatar::AvatarProcessor;
use crate::render::fonts::{FontMeasurer, FontProvider};
use crate::render::layout::{wrap, TextMeasurer};
use crate::render::{CardStyle, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::types::{
    sort_by_confidence, CitedValue, PersonaDocument, ProfileSummary, ScaleKind,
};

// ─────────────────────────────────────────────────────────────────
// Layout Table
// ─────────────────────────────────────────────────────────────────

/// A fixed region of the canvas one section draws into. Frames never move
/// or grow; content that exceeds `max_height` is truncated.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: i32,
    y: i32,
    width: u32,
    max_height: u32,
}

impl Frame {
    const fn bottom(&self) -> i32 {
        self.y + self.max_height as i32
    }

    /// Usable text width inside the panel padding.
    fn inner_width(&self) -> f32 {
        (self.width - 2 * PAD as u32) as f32
    }
}

const PAD: i32 = 20;

const IDENTITY: Frame = Frame { x: 40, y: 40, width: 540, max_height: 340 };
const QUOTE: Frame = Frame { x: 640, y: 40, width: 520, max_height: 340 };
const MOTIVATIONS: Frame = Frame { x: 40, y: 420, width: 540, max_height: 260 };
const BEHAVIORS: Frame = Frame { x: 640, y: 420, width: 520, max_height: 440 };
const PERSONALITY: Frame = Frame { x: 40, y: 700, width: 540, max_height: 320 };
const GOALS: Frame = Frame { x: 640, y: 900, width: 520, max_height: 660 };
const FRUSTRATIONS: Frame = Frame { x: 40, y: 1060, width: 540, max_height: 500 };

const TITLE_PX: f32 = 40.0;
const HEADER_PX: f32 = 28.0;
const BODY_PX: f32 = 22.0;
const SMALL_PX: f32 = 18.0;

fn line_height(px: f32) -> i32 {
    (px * 1.35) as i32
}

// ─────────────────────────────────────────────────────────────────
// Card Renderer
// ─────────────────────────────────────────────────────────────────

/// Finished card plus the names of the sections that were drawn, in draw
/// order. The section list lets callers and tests check structure without
/// decoding pixels.
#[derive(Debug)]
pub struct CardArtifact {
    pub image: RgbaImage,
    pub sections: Vec<&'static str>,
}

pub struct CardRenderer {
    style: CardStyle,
    fonts: FontProvider,
    avatar: AvatarProcessor,
}

impl CardRenderer {
    pub fn new(style: CardStyle, fonts: FontProvider) -> Self {
        let avatar = AvatarProcessor::new(style.avatar_size);
        Self { style, fonts, avatar }
    }

    /// Render the persona card. Fails only on an empty document; avatar
    /// and font problems degrade to fallbacks inside the collaborators.
    pub fn render(
        &self,
        doc: &PersonaDocument,
        profile: &ProfileSummary,
        fetcher: &dyn ImageFetcher,
    ) -> Result<CardArtifact> {
        if doc.is_empty() {
            return Err(Error::DocumentEmpty { username: profile.username.clone() });
        }

        let mut canvas =
            RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, self.style.background);
        let mut sections = Vec::new();

        let avatar = self.avatar.load(&profile.avatar_url, fetcher);

        self.draw_identity(&mut canvas, doc, profile, &avatar);
        sections.push("identity");

        if let Some(quote) = &doc.quote {
            self.draw_quote(&mut canvas, quote);
            sections.push("quote");
        }
        if !doc.motivations.is_empty() {
            self.draw_motivations(&mut canvas, doc);
            sections.push("motivations");
        }
        if !doc.behaviors.is_empty() {
            self.draw_list(&mut canvas, BEHAVIORS, "BEHAVIOUR & HABITS", &doc.behaviors);
            sections.push("behaviors");
        }
        if !doc.personality.is_empty() {
            self.draw_personality(&mut canvas, doc);
            sections.push("personality");
        }
        if !doc.goals.is_empty() {
            self.draw_list(&mut canvas, GOALS, "GOALS & NEEDS", &doc.goals);
            sections.push("goals");
        }
        if !doc.frustrations.is_empty() {
            self.draw_list(&mut canvas, FRUSTRATIONS, "FRUSTRATIONS", &doc.frustrations);
            sections.push("frustrations");
        }

        debug!(sections = sections.len(), "Card rendered");
        Ok(CardArtifact { image: canvas, sections })
    }

    /// Encode a finished card to PNG bytes. Encoding failure is fatal; no
    /// partial artifact is produced.
    pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        image.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }

    // ─────────────────────────────────────────────────────────────
    // Sections
    // ─────────────────────────────────────────────────────────────

    fn draw_identity(
        &self,
        canvas: &mut RgbaImage,
        doc: &PersonaDocument,
        profile: &ProfileSummary,
        avatar: &RgbaImage,
    ) {
        let frame = IDENTITY;
        self.panel(canvas, frame);

        image::imageops::overlay(
            canvas,
            avatar,
            (frame.x + PAD) as i64,
            (frame.y + PAD) as i64,
        );

        let text_x = frame.x + PAD + self.style.avatar_size as i32 + PAD;
        self.text(canvas, text_x, frame.y + PAD + 20, TITLE_PX, true, self.style.text,
            &profile.username);
        self.text(canvas, text_x, frame.y + PAD + 20 + line_height(TITLE_PX), SMALL_PX,
            false, self.style.muted, &format!("u/{}", profile.username));

        // demographics and traits below the avatar block
        let mut y = frame.y + PAD + self.style.avatar_size as i32 + PAD;
        for (label, value) in doc.profile.fields() {
            if y + line_height(BODY_PX) > frame.bottom() - PAD {
                break;
            }
            let line = format!("{}: {}", label, value.value);
            y = self.wrapped_text(canvas, frame, frame.x + PAD, y, BODY_PX, false,
                self.style.text, &line);
        }
        let mut traits = doc.behavioral_traits.clone();
        traits.sort_by_key(|t| t.confidence.sort_rank());
        for trait_ in &traits {
            if y + line_height(BODY_PX) > frame.bottom() - PAD {
                break;
            }
            let line = format!("{}: {}", trait_.name, trait_.value);
            y = self.wrapped_text(canvas, frame, frame.x + PAD, y, BODY_PX, false,
                self.style.text, &line);
        }
    }

    /// Two-pass quote box: wrap and count lines first, then draw a rounded
    /// panel sized to the content, then the text.
    fn draw_quote(&self, canvas: &mut RgbaImage, quote: &CitedValue<String>) {
        let frame = QUOTE;
        let measurer = FontMeasurer::new(self.fonts.regular(), HEADER_PX);
        let lines = wrap(&quote.value, frame.inner_width(), &measurer);

        // measure pass: quote mark, wrapped lines, attribution line
        let mark_height = 56;
        let attribution_height = 8 + line_height(SMALL_PX);
        let max_lines = ((frame.max_height as i32 - 2 * PAD - mark_height - attribution_height)
            / line_height(HEADER_PX))
        .max(1) as usize;
        let visible = lines.len().min(max_lines);
        let box_height = (2 * PAD
            + mark_height
            + visible as i32 * line_height(HEADER_PX)
            + attribution_height) as u32;

        self.rounded_panel(canvas, frame.x, frame.y, frame.width, box_height, 18);

        self.text(canvas, frame.x + PAD, frame.y + PAD, 56.0, true, self.style.accent, "\u{201c}");

        let mut y = frame.y + PAD + mark_height;
        for line in lines.iter().take(visible) {
            self.text(canvas, frame.x + PAD, y, HEADER_PX, false, self.style.text, line);
            y += line_height(HEADER_PX);
        }

        let shown = self.fit_one_line(quote.citation.as_str(), frame.inner_width(), SMALL_PX);
        self.text(canvas, frame.x + PAD, y + 8, SMALL_PX, false, self.style.muted, &shown);
    }

    fn draw_motivations(&self, canvas: &mut RgbaImage, doc: &PersonaDocument) {
        let frame = MOTIVATIONS;
        self.panel(canvas, frame);
        let mut y = self.header(canvas, frame, "MOTIVATIONS");

        let bar_width = frame.width as i32 - 2 * PAD;
        for (label, claim, _angle) in doc.motivations.entries() {
            let entry_height = line_height(BODY_PX) + 14 + 10;
            if y + entry_height > frame.bottom() - PAD {
                break;
            }
            let line = format!("{}  {}", label, claim.value);
            let shown = self.fit_one_line(&line, frame.inner_width(), BODY_PX);
            self.text(canvas, frame.x + PAD, y, BODY_PX, false, self.style.text, &shown);
            y += line_height(BODY_PX);

            // strength bar: track plus confidence-scaled fill
            let fraction = self.style.motivation_strength.for_confidence(claim.confidence);
            let fill = ((bar_width as f32) * fraction) as u32;
            draw_filled_rect_mut(
                canvas,
                Rect::at(frame.x + PAD, y).of_size(bar_width as u32, 14),
                self.style.background,
            );
            if fill > 0 {
                draw_filled_rect_mut(
                    canvas,
                    Rect::at(frame.x + PAD, y).of_size(fill, 14),
                    self.style.accent,
                );
            }
            y += 14 + 10;
        }
    }

    fn draw_personality(&self, canvas: &mut RgbaImage, doc: &PersonaDocument) {
        let frame = PERSONALITY;
        self.panel(canvas, frame);
        let mut y = self.header(canvas, frame, "PERSONALITY");

        let track_x = frame.x + PAD;
        let track_width = frame.width as i32 - 2 * PAD;
        let mut scales = doc.personality.clone();
        scales.sort_by_key(|s| s.confidence.sort_rank());
        for scale in &scales {
            let entry_height = line_height(BODY_PX) + 14 + 10;
            if y + entry_height > frame.bottom() - PAD {
                break;
            }
            match &scale.kind {
                ScaleKind::Unipolar { score } => {
                    let line = format!("{}  {:.0}/10", scale.name, score);
                    self.text(canvas, track_x, y, BODY_PX, false, self.style.text, &line);
                    y += line_height(BODY_PX);

                    let fill = ((track_width as f32) * (score / 10.0).clamp(0.0, 1.0)) as u32;
                    draw_filled_rect_mut(
                        canvas,
                        Rect::at(track_x, y).of_size(track_width as u32, 14),
                        self.style.background,
                    );
                    if fill > 0 {
                        draw_filled_rect_mut(
                            canvas,
                            Rect::at(track_x, y).of_size(fill, 14),
                            self.style.accent,
                        );
                    }
                }
                ScaleKind::Bipolar { left, right, score } => {
                    self.text(canvas, track_x, y, SMALL_PX, false, self.style.muted, left);
                    let right_width = self.measure(right, SMALL_PX, false);
                    self.text(
                        canvas,
                        track_x + track_width - right_width as i32,
                        y,
                        SMALL_PX,
                        false,
                        self.style.muted,
                        right,
                    );
                    y += line_height(SMALL_PX);

                    draw_filled_rect_mut(
                        canvas,
                        Rect::at(track_x, y + 4).of_size(track_width as u32, 6),
                        self.style.background,
                    );
                    let position = (score / 100.0).clamp(0.0, 1.0);
                    let marker_x = track_x + ((track_width as f32) * position) as i32;
                    draw_filled_circle_mut(canvas, (marker_x, y + 7), 8, self.style.accent);
                }
            }
            y += 14 + 10;
        }
    }

    /// One of the three bullet-list sections. Entries are drawn in stable
    /// confidence order and truncated at the frame bottom; an entry is
    /// either fully drawn or not drawn at all.
    fn draw_list(
        &self,
        canvas: &mut RgbaImage,
        frame: Frame,
        title: &str,
        entries: &[CitedValue<String>],
    ) {
        self.panel(canvas, frame);
        let mut y = self.header(canvas, frame, title);

        let mut ordered = entries.to_vec();
        sort_by_confidence(&mut ordered);

        let bullet_indent = 26.0;
        let wrap_width = frame.inner_width() - bullet_indent;
        let fonts = &self.fonts;
        let measurer = FontMeasurer::new(fonts.regular(), BODY_PX);

        for entry in &ordered {
            let lines = wrap(&entry.value, wrap_width, &measurer);
            let entry_height = lines.len() as i32 * line_height(BODY_PX) + 8;
            if y + entry_height > frame.bottom() - PAD {
                break;
            }
            self.text(canvas, frame.x + PAD, y, BODY_PX, false, self.style.accent, "\u{2022}");
            for (i, line) in lines.iter().enumerate() {
                self.text(
                    canvas,
                    frame.x + PAD + bullet_indent as i32,
                    y + i as i32 * line_height(BODY_PX),
                    BODY_PX,
                    false,
                    self.style.text,
                    line,
                );
            }
            y += entry_height;
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Drawing Primitives
    // ─────────────────────────────────────────────────────────────

    fn panel(&self, canvas: &mut RgbaImage, frame: Frame) {
        draw_filled_rect_mut(
            canvas,
            Rect::at(frame.x, frame.y).of_size(frame.width, frame.max_height),
            self.style.panel,
        );
    }

    /// Filled rectangle with quarter-circle corners.
    fn rounded_panel(&self, canvas: &mut RgbaImage, x: i32, y: i32, width: u32, height: u32, radius: i32) {
        let r = radius.min(width as i32 / 2).min(height as i32 / 2).max(0);
        let color = self.style.panel;
        let (w, h) = (width as i32, height as i32);

        draw_filled_rect_mut(
            canvas,
            Rect::at(x + r, y).of_size((w - 2 * r) as u32, height),
            color,
        );
        if r > 0 {
            draw_filled_rect_mut(
                canvas,
                Rect::at(x, y + r).of_size(r as u32, (h - 2 * r) as u32),
                color,
            );
            draw_filled_rect_mut(
                canvas,
                Rect::at(x + w - r, y + r).of_size(r as u32, (h - 2 * r) as u32),
                color,
            );
            for (cx, cy) in [
                (x + r, y + r),
                (x + w - r - 1, y + r),
                (x + r, y + h - r - 1),
                (x + w - r - 1, y + h - r - 1),
            ] {
                draw_filled_circle_mut(canvas, (cx, cy), r, color);
            }
        }
    }

    /// Section title plus accent underline; returns the content start y.
    fn header(&self, canvas: &mut RgbaImage, frame: Frame, title: &str) -> i32 {
        let y = frame.y + PAD;
        self.text(canvas, frame.x + PAD, y, HEADER_PX, true, self.style.accent, title);
        let underline_y = y + line_height(HEADER_PX);
        draw_filled_rect_mut(
            canvas,
            Rect::at(frame.x + PAD, underline_y).of_size(60, 4),
            self.style.accent,
        );
        underline_y + 16
    }

    fn text(
        &self,
        canvas: &mut RgbaImage,
        x: i32,
        y: i32,
        px: f32,
        bold: bool,
        color: Rgba<u8>,
        text: &str,
    ) {
        let font = self.face(bold);
        draw_text_mut(canvas, color, x, y, PxScale::from(px), font, text);
    }

    /// Wrap and draw `text` inside the frame, stopping at the frame bottom.
    /// Returns the y below the last drawn line.
    fn wrapped_text(
        &self,
        canvas: &mut RgbaImage,
        frame: Frame,
        x: i32,
        mut y: i32,
        px: f32,
        bold: bool,
        color: Rgba<u8>,
        text: &str,
    ) -> i32 {
        let font = self.face(bold);
        let measurer = FontMeasurer::new(font, px);
        for line in wrap(text, frame.inner_width(), &measurer) {
            if y + line_height(px) > frame.bottom() - PAD {
                break;
            }
            draw_text_mut(canvas, color, x, y, PxScale::from(px), font, &line);
            y += line_height(px);
        }
        y + 6
    }

    /// Truncate `text` with an ellipsis so it fits one line of `max_width`.
    fn fit_one_line(&self, text: &str, max_width: f32, px: f32) -> String {
        let measurer = FontMeasurer::new(self.fonts.regular(), px);
        if measurer.measure(text) <= max_width {
            return text.to_string();
        }
        let mut out = String::new();
        for c in text.chars() {
            let candidate = format!("{}{}\u{2026}", out, c);
            if measurer.measure(&candidate) > max_width {
                break;
            }
            out.push(c);
        }
        out.push('\u{2026}');
        out
    }

    fn measure(&self, text: &str, px: f32, bold: bool) -> f32 {
        FontMeasurer::new(self.face(bold), px).measure(text)
    }

    fn face(&self, bold: bool) -> &FontArc {
        if bold {
            self.fonts.bold()
        } else {
            self.fonts.regular()
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        BehavioralTrait, Citation, Confidence, DemographicProfile, Motivation, Motivations,
    };
    use chrono::TimeZone;
    use chrono::Utc;

    struct NoFetcher;

    impl ImageFetcher for NoFetcher {
        fn fetch(&self, url: &str) -> crate::error::Result<Vec<u8>> {
            Err(Error::fetch_failed(url, "offline"))
        }
    }

    fn cited(value: &str, confidence: Confidence) -> CitedValue<String> {
        CitedValue::new(
            value.to_string(),
            Citation::new("https://reddit.com/r/test/1").unwrap(),
            confidence,
        )
    }

    fn profile() -> ProfileSummary {
        ProfileSummary {
            username: "kojied".to_string(),
            avatar_url: String::new(),
            created_at: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            comment_karma: 100,
            link_karma: 20,
            is_gold: false,
            is_mod: false,
            email_verified: true,
        }
    }

    fn document() -> PersonaDocument {
        PersonaDocument {
            profile: DemographicProfile {
                occupation: Some(cited("iOS Developer", Confidence::High)),
                location: Some(cited("New York City", Confidence::Medium)),
                ..Default::default()
            },
            quote: Some(cited("I want tools that respect my time.", Confidence::Medium)),
            motivations: Motivations {
                primary: Some(Motivation {
                    claim: cited("Building expertise", Confidence::High),
                    marketing_angle: None,
                }),
                ..Default::default()
            },
            personality: vec![
                crate::types::PersonalityScale {
                    name: "Openness".to_string(),
                    kind: ScaleKind::Unipolar { score: 7.0 },
                    citation: Citation::new("c1").unwrap(),
                    confidence: Confidence::Medium,
                    marketing_impact: None,
                },
                crate::types::PersonalityScale {
                    name: "Orientation".to_string(),
                    kind: ScaleKind::Bipolar {
                        left: "Introvert".to_string(),
                        right: "Extrovert".to_string(),
                        score: 35.0,
                    },
                    citation: Citation::new("c2").unwrap(),
                    confidence: Confidence::Low,
                    marketing_impact: None,
                },
            ],
            goals: vec![cited("Ship a side project", Confidence::High)],
            ..Default::default()
        }
    }

    fn renderer() -> CardRenderer {
        CardRenderer::new(CardStyle::default(), FontProvider::bundled().unwrap())
    }

    #[test]
    fn test_render_canvas_dimensions() {
        let artifact = renderer().render(&document(), &profile(), &NoFetcher).unwrap();
        assert_eq!(artifact.image.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
    }

    #[test]
    fn test_render_empty_document_is_fatal() {
        let err = renderer()
            .render(&PersonaDocument::default(), &profile(), &NoFetcher)
            .unwrap_err();
        assert!(matches!(err, Error::DocumentEmpty { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_sections_follow_document_shape() {
        let artifact = renderer().render(&document(), &profile(), &NoFetcher).unwrap();
        assert_eq!(
            artifact.sections,
            vec!["identity", "quote", "motivations", "personality", "goals"]
        );

        let mut doc = document();
        doc.quote = None;
        let artifact = renderer().render(&doc, &profile(), &NoFetcher).unwrap();
        assert!(!artifact.sections.contains(&"quote"));
    }

    #[test]
    fn test_render_deterministic() {
        let doc = document();
        let p = profile();
        let r = renderer();
        let a = r.render(&doc, &p, &NoFetcher).unwrap();
        let b = r.render(&doc, &p, &NoFetcher).unwrap();
        assert_eq!(a.image.as_raw(), b.image.as_raw());
    }

    #[test]
    fn test_encode_png_magic() {
        let artifact = renderer().render(&document(), &profile(), &NoFetcher).unwrap();
        let bytes = CardRenderer::encode_png(&artifact.image).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn test_trait_and_scale_input_order_does_not_change_pixels() {
        fn trait_entry(name: &str, confidence: Confidence) -> BehavioralTrait {
            BehavioralTrait {
                name: name.to_string(),
                value: "Pronounced".to_string(),
                evidence: "Recurring comment pattern".to_string(),
                citation: Citation::new("https://reddit.com/r/test/t").unwrap(),
                confidence,
            }
        }

        let mut doc = document();
        doc.behavioral_traits = vec![
            trait_entry("Tech Savviness", Confidence::High),
            trait_entry("Helpfulness", Confidence::Low),
        ];

        // confidence decides draw order, so reversing the input vectors
        // must not change a single pixel
        let mut reversed = doc.clone();
        reversed.behavioral_traits.reverse();
        reversed.personality.reverse();

        let r = renderer();
        let a = r.render(&doc, &profile(), &NoFetcher).unwrap();
        let b = r.render(&reversed, &profile(), &NoFetcher).unwrap();
        assert_eq!(a.image.as_raw(), b.image.as_raw());
    }

    #[test]
    fn test_overflow_truncates_without_error() {
        let mut doc = document();
        doc.goals = (0..50)
            .map(|i| cited(&format!("Goal number {} with some longer text to wrap", i), Confidence::Low))
            .collect();
        // truncation is bounded rendering, not an error
        let artifact = renderer().render(&doc, &profile(), &NoFetcher).unwrap();
        assert!(artifact.sections.contains(&"goals"));
    }

    #[test]
    fn test_fit_one_line_ellipsis() {
        let r = renderer();
        let short = r.fit_one_line("short", 400.0, BODY_PX);
        assert_eq!(short, "short");
        let long = r.fit_one_line(
            "an extremely long single line that cannot possibly fit in the width",
            120.0,
            BODY_PX,
        );
        assert!(long.ends_with('\u{2026}'));
        let measurer = FontMeasurer::new(r.fonts.regular(), BODY_PX);
        assert!(measurer.measure(&long) <= 120.0);
    }
}
