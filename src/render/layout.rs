//! Greedy word-wrap against a maximum pixel width.
//!
//! Wrapping is driven by an injected [`TextMeasurer`] so the same algorithm
//! serves real font metrics on the card and cheap fixed-width metrics in
//! tests. The functions here are pure: identical inputs always produce
//! identical output.

/// Text measurement hook abstracting over font metrics.
pub trait TextMeasurer {
    /// Rendered width of `text` in pixels (or columns, for fixed-width
    /// measurers).
    fn measure(&self, text: &str) -> f32;
}

/// Fixed advance per character. Used in tests and anywhere glyph-accurate
/// measurement is not needed.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasurer {
    pub char_width: f32,
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width
    }
}

/// Wrap a single paragraph into lines no wider than `max_width`.
///
/// Tokens are split on whitespace and greedily accumulated with single
/// separating spaces; a candidate that measures wider than `max_width`
/// commits the line without its last token. A single token wider than
/// `max_width` is placed alone on its own line, never hyphenated or
/// truncated. An empty paragraph produces zero lines.
pub fn wrap(paragraph: &str, max_width: f32, measurer: &dyn TextMeasurer) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for token in paragraph.split_whitespace() {
        if current.is_empty() {
            // First token on the line always goes in, even when it alone
            // exceeds max_width.
            current.push_str(token);
            continue;
        }
        let candidate = format!("{} {}", current, token);
        if measurer.measure(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(token);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wrap multi-paragraph text, splitting on blank-line boundaries. Each inner
/// vector is one wrapped paragraph; consumers render the boundary between
/// them as a vertical gap.
pub fn wrap_paragraphs(
    text: &str,
    max_width: f32,
    measurer: &dyn TextMeasurer,
) -> Vec<Vec<String>> {
    let mut paragraphs = Vec::new();
    let mut buffer = String::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !buffer.is_empty() {
                paragraphs.push(wrap(&buffer, max_width, measurer));
                buffer.clear();
            }
        } else {
            if !buffer.is_empty() {
                buffer.push(' ');
            }
            buffer.push_str(line);
        }
    }
    if !buffer.is_empty() {
        paragraphs.push(wrap(&buffer, max_width, measurer));
    }
    paragraphs
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const M: MonospaceMeasurer = MonospaceMeasurer { char_width: 1.0 };

    #[test]
    fn test_empty_paragraph_zero_lines() {
        assert!(wrap("", 20.0, &M).is_empty());
        assert!(wrap("   ", 20.0, &M).is_empty());
    }

    #[test]
    fn test_single_line_fits() {
        let lines = wrap("hello world", 20.0, &M);
        assert_eq!(lines, vec!["hello world"]);
    }

    #[test]
    fn test_greedy_break() {
        // width 11 fits "aaa bbb ccc" exactly; width 10 does not
        let lines = wrap("aaa bbb ccc", 10.0, &M);
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_every_line_within_bound() {
        let text = "the quick brown fox jumps over the lazy dog again and again";
        for max_width in [8.0, 12.0, 20.0, 35.0] {
            for line in wrap(text, max_width, &M) {
                assert!(
                    M.measure(&line) <= max_width,
                    "line '{}' exceeds {}",
                    line,
                    max_width
                );
            }
        }
    }

    #[test]
    fn test_oversized_token_own_line() {
        let lines = wrap("hi incomprehensibilities yo", 10.0, &M);
        assert_eq!(lines, vec!["hi", "incomprehensibilities", "yo"]);
        // never split or truncated
        assert!(lines.iter().any(|l| l == "incomprehensibilities"));
    }

    #[test]
    fn test_oversized_first_token() {
        let lines = wrap("incomprehensibilities hi", 10.0, &M);
        assert_eq!(lines, vec!["incomprehensibilities", "hi"]);
    }

    #[test]
    fn test_collapses_inner_whitespace() {
        let lines = wrap("a   b\tc", 20.0, &M);
        assert_eq!(lines, vec!["a b c"]);
    }

    #[test]
    fn test_idempotent() {
        let text = "some text that wraps across a few lines when narrow";
        let first = wrap(text, 14.0, &M);
        let second = wrap(text, 14.0, &M);
        assert_eq!(first, second);
    }

    #[test]
    fn test_wrap_paragraphs_blank_line_boundary() {
        let text = "first paragraph here\n\nsecond one";
        let paragraphs = wrap_paragraphs(text, 30.0, &M);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0], vec!["first paragraph here"]);
        assert_eq!(paragraphs[1], vec!["second one"]);
    }

    #[test]
    fn test_wrap_paragraphs_joins_soft_newlines() {
        // single newlines inside a paragraph are soft breaks
        let text = "line one\nline two";
        let paragraphs = wrap_paragraphs(text, 40.0, &M);
        assert_eq!(paragraphs, vec![vec!["line one line two".to_string()]]);
    }

    #[test]
    fn test_wrap_paragraphs_empty_text() {
        assert!(wrap_paragraphs("", 10.0, &M).is_empty());
        assert!(wrap_paragraphs("\n\n\n", 10.0, &M).is_empty());
    }
}
