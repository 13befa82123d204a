//! Plain-text and markdown persona reports.
//!
//! The report is the complete, untruncated counterpart of the card: every
//! attribute of the document appears, every section header is emitted even
//! when its section is empty, and lists are confidence-sorted but never
//! cut. Output is deterministic for a given document and metadata.

use std::fmt::Write as _;

use crate::error::{Error, Result};
use crate::types::{
    sort_by_confidence, top_subreddits, ActivityRecord, AnalysisMeta, Citation,
    CitedValue, PersonaDocument, ProfileSummary, ScaleKind,
};

const RULE_HEAVY: usize = 80;
const RULE_LIGHT: usize = 40;
const TOP_SUBREDDIT_LIMIT: usize = 5;

/// Which textual format to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Markdown,
}

pub struct ReportRenderer {
    format: ReportFormat,
}

impl ReportRenderer {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Render the full report. Fails only on an empty document.
    pub fn render(
        &self,
        doc: &PersonaDocument,
        profile: &ProfileSummary,
        records: &[ActivityRecord],
        meta: &AnalysisMeta,
    ) -> Result<String> {
        if doc.is_empty() {
            return Err(Error::DocumentEmpty { username: profile.username.clone() });
        }

        let mut out = String::new();
        self.title(&mut out, &profile.username, meta);
        self.quote_block(&mut out, doc);
        self.demographics(&mut out, doc);
        self.account_statistics(&mut out, profile, records, meta);
        self.behavioral_traits(&mut out, doc);
        self.motivations(&mut out, doc);
        self.personality(&mut out, doc);
        self.cited_list(&mut out, "BEHAVIOUR & HABITS", &doc.behaviors);
        self.cited_list(&mut out, "GOALS & NEEDS", &doc.goals);
        self.cited_list(&mut out, "FRUSTRATIONS", &doc.frustrations);
        self.footer(&mut out);
        Ok(out)
    }

    // ─────────────────────────────────────────────────────────────
    // Blocks
    // ─────────────────────────────────────────────────────────────

    fn title(&self, out: &mut String, username: &str, meta: &AnalysisMeta) {
        match self.format {
            ReportFormat::Text => {
                let _ = writeln!(out, "{}", "=".repeat(RULE_HEAVY));
                let _ = writeln!(out, "REDDIT USER PERSONA: u/{}", username);
                let _ = writeln!(
                    out,
                    "Generated: {} | Posts analyzed: {} | Comments analyzed: {}",
                    meta.analyzed_at.format("%Y-%m-%d %H:%M UTC"),
                    meta.post_count,
                    meta.comment_count
                );
                let _ = writeln!(out, "{}", "=".repeat(RULE_HEAVY));
            }
            ReportFormat::Markdown => {
                let _ = writeln!(out, "# Reddit User Persona: u/{}", username);
                let _ = writeln!(out);
                let _ = writeln!(
                    out,
                    "*Generated {} from {} posts and {} comments.*",
                    meta.analyzed_at.format("%Y-%m-%d %H:%M UTC"),
                    meta.post_count,
                    meta.comment_count
                );
            }
        }
        let _ = writeln!(out);
    }

    fn quote_block(&self, out: &mut String, doc: &PersonaDocument) {
        let Some(quote) = &doc.quote else {
            return;
        };
        match self.format {
            ReportFormat::Text => {
                let _ = writeln!(out, "\"{}\"", quote.value);
                let _ = writeln!(
                    out,
                    "    [{} {}] ({})",
                    quote.confidence.glyph(),
                    quote.confidence.label(),
                    quote.citation
                );
            }
            ReportFormat::Markdown => {
                let _ = writeln!(out, "> \"{}\"", quote.value);
                let _ = writeln!(
                    out,
                    "> {} {} ([source]({}))",
                    quote.confidence.glyph(),
                    quote.confidence.label(),
                    quote.citation
                );
            }
        }
        let _ = writeln!(out);
    }

    fn demographics(&self, out: &mut String, doc: &PersonaDocument) {
        self.section_header(out, "DEMOGRAPHICS");
        for (label, value) in doc.profile.fields() {
            self.cited_line(out, label, &format!("{}: {}", label, value.value), value);
        }
        let _ = writeln!(out);
    }

    fn behavioral_traits(&self, out: &mut String, doc: &PersonaDocument) {
        self.section_header(out, "BEHAVIORAL TRAITS");
        let mut ordered = doc.behavioral_traits.clone();
        ordered.sort_by_key(|t| t.confidence.sort_rank());
        for trait_ in &ordered {
            let _ = writeln!(
                out,
                "{} {}: {}  [{} {}] {}",
                self.bullet(),
                trait_.name,
                trait_.value,
                trait_.confidence.glyph(),
                trait_.confidence.label(),
                self.citation(&trait_.name, &trait_.citation)
            );
            let _ = writeln!(out, "    Evidence: {}", trait_.evidence);
        }
        let _ = writeln!(out);
    }

    fn motivations(&self, out: &mut String, doc: &PersonaDocument) {
        self.section_header(out, "MOTIVATIONS");
        for (label, claim, angle) in doc.motivations.entries() {
            self.cited_line(out, label, &format!("{}: {}", label, claim.value), claim);
            if let Some(angle) = angle {
                let _ = writeln!(out, "    Marketing Angle: {}", angle);
            }
        }
        let _ = writeln!(out);
    }

    fn personality(&self, out: &mut String, doc: &PersonaDocument) {
        self.section_header(out, "PERSONALITY");
        for scale in &doc.personality {
            let rendered = match &scale.kind {
                ScaleKind::Unipolar { score } => {
                    format!("{}: {:.0}/10", scale.name, score)
                }
                ScaleKind::Bipolar { left, right, score } => {
                    format!("{}: {} <-> {} at {:.0}/100", scale.name, left, right, score)
                }
            };
            let _ = writeln!(
                out,
                "{} {}  [{} {}] {}",
                self.bullet(),
                rendered,
                scale.confidence.glyph(),
                scale.confidence.label(),
                self.citation(&scale.name, &scale.citation)
            );
            if let Some(impact) = &scale.marketing_impact {
                let _ = writeln!(out, "    Marketing Impact: {}", impact);
            }
        }
        let _ = writeln!(out);
    }

    /// Shared renderer for the three cited-list sections. All entries are
    /// emitted, high confidence first.
    fn cited_list(&self, out: &mut String, title: &str, entries: &[CitedValue<String>]) {
        self.section_header(out, title);
        let mut ordered = entries.to_vec();
        sort_by_confidence(&mut ordered);
        for entry in &ordered {
            self.cited_line(out, "source", &entry.value, entry);
        }
        let _ = writeln!(out);
    }

    fn account_statistics(
        &self,
        out: &mut String,
        profile: &ProfileSummary,
        records: &[ActivityRecord],
        meta: &AnalysisMeta,
    ) {
        self.section_header(out, "ACCOUNT STATISTICS");
        let _ = writeln!(
            out,
            "{} Account age: {}",
            self.bullet(),
            profile.account_age(meta.analyzed_at)
        );
        let _ = writeln!(
            out,
            "{} Comment karma: {}",
            self.bullet(),
            thousands(profile.comment_karma)
        );
        let _ = writeln!(out, "{} Link karma: {}", self.bullet(), thousands(profile.link_karma));
        let _ = writeln!(
            out,
            "{} Reddit Gold: {} | Moderator: {} | Verified email: {}",
            self.bullet(),
            yes_no(profile.is_gold),
            yes_no(profile.is_mod),
            yes_no(profile.email_verified)
        );

        let top = top_subreddits(records, TOP_SUBREDDIT_LIMIT);
        if !top.is_empty() {
            let _ = writeln!(out, "{} Most active subreddits:", self.bullet());
            for (name, count) in top {
                let _ = writeln!(out, "    r/{} ({} items)", name, count);
            }
        }
        let _ = writeln!(out);
    }

    fn footer(&self, out: &mut String) {
        match self.format {
            ReportFormat::Text => {
                let _ = writeln!(out, "{}", "=".repeat(RULE_HEAVY));
                let _ = writeln!(
                    out,
                    "All attributes are inferred from public activity and cited to their source."
                );
                let _ = writeln!(out, "{}", "=".repeat(RULE_HEAVY));
            }
            ReportFormat::Markdown => {
                let _ = writeln!(out, "---");
                let _ = writeln!(
                    out,
                    "*All attributes are inferred from public activity and cited to their source.*"
                );
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Line Helpers
    // ─────────────────────────────────────────────────────────────

    fn section_header(&self, out: &mut String, title: &str) {
        match self.format {
            ReportFormat::Text => {
                let _ = writeln!(out, "{}", title);
                let _ = writeln!(out, "{}", "-".repeat(RULE_LIGHT));
            }
            ReportFormat::Markdown => {
                let _ = writeln!(out, "## {}", title_case(title));
                let _ = writeln!(out);
            }
        }
    }

    /// One line per fact: `label: value [glyph Confidence] (citation)`. The
    /// markdown format renders the citation as a link whose label is the
    /// attribute label ("source" for unlabeled list entries).
    fn cited_line(
        &self,
        out: &mut String,
        link_label: &str,
        body: &str,
        value: &CitedValue<String>,
    ) {
        let _ = writeln!(
            out,
            "{} {}  [{} {}] {}",
            self.bullet(),
            body,
            value.confidence.glyph(),
            value.confidence.label(),
            self.citation(link_label, &value.citation)
        );
    }

    fn citation(&self, link_label: &str, citation: &Citation) -> String {
        match self.format {
            ReportFormat::Text => format!("({})", citation),
            ReportFormat::Markdown => format!("([{}]({}))", link_label, citation),
        }
    }

    fn bullet(&self) -> &'static str {
        match self.format {
            ReportFormat::Text => "*",
            ReportFormat::Markdown => "-",
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

/// Format an integer with comma thousands separators.
fn thousands(n: i64) -> String {
    let negative = n < 0;
    let digits = n.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}

/// "GOALS & NEEDS" -> "Goals & Needs" for markdown headers.
fn title_case(title: &str) -> String {
    title
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>()
                        + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
