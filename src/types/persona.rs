//! Persona document model.
//!
//! The in-memory shape of a cited, confidence-scored persona. Every leaf
//! fact is a [`CitedValue`]: a value paired with the evidence reference and
//! confidence level that support it. Attributes that could not be inferred
//! are omitted entirely, never present with an empty value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

// ─────────────────────────────────────────────────────────────────
// Confidence
// ─────────────────────────────────────────────────────────────────

/// Tri-level certainty label attached to inferred facts.
///
/// `Unknown` is what malformed or missing confidence values normalize to at
/// the ingestion boundary. It sorts with `Low` but always displays as its
/// own label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    Unknown,
}

impl Confidence {
    /// Sort key: lower is rendered first. `Unknown` shares a key with `Low`
    /// so that unlabeled facts never outrank labeled ones.
    pub fn sort_rank(&self) -> u8 {
        match self {
            Confidence::High => 0,
            Confidence::Medium => 1,
            Confidence::Low | Confidence::Unknown => 2,
        }
    }

    /// Display glyph shared by both renderers.
    pub fn glyph(&self) -> char {
        match self {
            Confidence::High => '●',
            Confidence::Medium => '◐',
            Confidence::Low | Confidence::Unknown => '○',
        }
    }

    /// Normalize a raw confidence string. Anything unrecognized is
    /// `Unknown`, keeping ingestion best-effort.
    pub fn from_text(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" | "h" => Confidence::High,
            "medium" | "med" | "m" => Confidence::Medium,
            "low" | "l" => Confidence::Low,
            _ => Confidence::Unknown,
        }
    }

    /// Display label. `Unknown` is never coerced to `Low` here.
    pub fn label(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
            Confidence::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Confidence {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Confidence::from_text(s))
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(Confidence::from_text)
            .unwrap_or(Confidence::Unknown))
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence::Unknown
    }
}

// ─────────────────────────────────────────────────────────────────
// Citation
// ─────────────────────────────────────────────────────────────────

/// A non-empty identifier (URL or opaque token) pointing at the evidence
/// for a claim. Citations may repeat across attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Citation(String);

impl Citation {
    /// Build a citation, rejecting empty identifiers.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Citation(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────
// CitedValue
// ─────────────────────────────────────────────────────────────────

/// The fundamental unit of the persona: a fact plus its citation and
/// confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitedValue<T> {
    pub value: T,
    pub citation: Citation,
    pub confidence: Confidence,
}

impl<T> CitedValue<T> {
    pub fn new(value: T, citation: Citation, confidence: Confidence) -> Self {
        Self { value, citation, confidence }
    }
}

// ─────────────────────────────────────────────────────────────────
// Demographic Profile
// ─────────────────────────────────────────────────────────────────

/// Fixed set of demographic fields, each independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DemographicProfile {
    pub age_range: Option<CitedValue<String>>,
    pub location: Option<CitedValue<String>>,
    pub occupation: Option<CitedValue<String>>,
    pub education: Option<CitedValue<String>>,
    pub life_stage: Option<CitedValue<String>>,
}

impl DemographicProfile {
    /// Present fields in fixed display order, with their labels.
    pub fn fields(&self) -> Vec<(&'static str, &CitedValue<String>)> {
        [
            ("Age Range", &self.age_range),
            ("Location", &self.location),
            ("Occupation", &self.occupation),
            ("Education", &self.education),
            ("Life Stage", &self.life_stage),
        ]
        .into_iter()
        .filter_map(|(label, field)| field.as_ref().map(|v| (label, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────
// Behavioral Traits
// ─────────────────────────────────────────────────────────────────

/// A behavioral trait with a free-text evidence summary in addition to the
/// citation link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BehavioralTrait {
    /// Trait label, e.g. "Digital Literacy".
    pub name: String,
    /// Inferred level or description.
    pub value: String,
    /// Free-text evidence summary.
    pub evidence: String,
    pub citation: Citation,
    pub confidence: Confidence,
}

// ─────────────────────────────────────────────────────────────────
// Motivations
// ─────────────────────────────────────────────────────────────────

/// A motivation claim plus the marketing-angle annotation the analysis
/// attaches to it. The annotation is pass-through text, not interpreted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Motivation {
    pub claim: CitedValue<String>,
    pub marketing_angle: Option<String>,
}

/// Primary/secondary motivations and the subject's value system.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Motivations {
    pub primary: Option<Motivation>,
    pub secondary: Option<Motivation>,
    pub value_system: Option<CitedValue<String>>,
}

impl Motivations {
    /// Present entries in fixed display order: label, claim, optional angle.
    pub fn entries(&self) -> Vec<(&'static str, &CitedValue<String>, Option<&str>)> {
        let mut out = Vec::new();
        if let Some(m) = &self.primary {
            out.push(("Primary", &m.claim, m.marketing_angle.as_deref()));
        }
        if let Some(m) = &self.secondary {
            out.push(("Secondary", &m.claim, m.marketing_angle.as_deref()));
        }
        if let Some(v) = &self.value_system {
            out.push(("Value System", v, None));
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none() && self.value_system.is_none()
    }
}

// ─────────────────────────────────────────────────────────────────
// Personality Scales
// ─────────────────────────────────────────────────────────────────

/// How a personality dimension is scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ScaleKind {
    /// Single-axis score on 0-10 (e.g. Big Five "Openness: 7/10").
    Unipolar { score: f32 },
    /// Axis between two named poles; 0 = left pole, 100 = right pole,
    /// 50 = neutral.
    Bipolar { left: String, right: String, score: f32 },
}

/// A named personality dimension with its score, evidence, and the
/// pass-through marketing-impact annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalityScale {
    pub name: String,
    pub kind: ScaleKind,
    pub citation: Citation,
    pub confidence: Confidence,
    pub marketing_impact: Option<String>,
}

// ─────────────────────────────────────────────────────────────────
// Persona Document
// ─────────────────────────────────────────────────────────────────

/// The complete structured, cited description of one analyzed subject.
///
/// Constructed once at the ingestion boundary and immutable for the
/// duration of a render; both renderers borrow it without sharing any
/// mutable state, so concurrent renders of the same document are safe.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PersonaDocument {
    pub profile: DemographicProfile,
    /// Short first-person paraphrase.
    pub quote: Option<CitedValue<String>>,
    pub behavioral_traits: Vec<BehavioralTrait>,
    pub motivations: Motivations,
    pub personality: Vec<PersonalityScale>,
    pub behaviors: Vec<CitedValue<String>>,
    pub goals: Vec<CitedValue<String>>,
    pub frustrations: Vec<CitedValue<String>>,
}

impl PersonaDocument {
    /// True when every top-level field is absent. Rendering an empty
    /// document is a fatal precondition failure, not a degraded render.
    pub fn is_empty(&self) -> bool {
        self.profile.is_empty()
            && self.quote.is_none()
            && self.behavioral_traits.is_empty()
            && self.motivations.is_empty()
            && self.personality.is_empty()
            && self.behaviors.is_empty()
            && self.goals.is_empty()
            && self.frustrations.is_empty()
    }

    /// Labels of all present attributes, used to check that both renderers
    /// surface the same attribute set.
    pub fn present_labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        for (label, _) in self.profile.fields() {
            labels.push(label.to_string());
        }
        if self.quote.is_some() {
            labels.push("Quote".to_string());
        }
        for t in &self.behavioral_traits {
            labels.push(t.name.clone());
        }
        for (label, _, _) in self.motivations.entries() {
            labels.push(label.to_string());
        }
        for s in &self.personality {
            labels.push(s.name.clone());
        }
        if !self.behaviors.is_empty() {
            labels.push("Behaviors".to_string());
        }
        if !self.goals.is_empty() {
            labels.push("Goals".to_string());
        }
        if !self.frustrations.is_empty() {
            labels.push("Frustrations".to_string());
        }
        labels
    }
}

/// Stable sort by confidence descending: higher-confidence facts render
/// first and are least likely to be truncated. Ties keep input order.
pub fn sort_by_confidence(entries: &mut [CitedValue<String>]) {
    entries.sort_by_key(|e| e.confidence.sort_rank());
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
