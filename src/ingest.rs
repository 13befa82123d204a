//! Persona bundle ingestion.
//!
//! Parses the analysis bundle JSON (profile, persona attributes, activity
//! records) into the normalized document model. Normalization is
//! best-effort: attributes with an empty value or a missing citation are
//! dropped rather than carried as empty strings, scores are clamped to
//! their scales, and unrecognized confidence labels become `Unknown`.
//! Structural failures of the JSON itself are a parse error.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{
    ActivityKind, ActivityRecord, AnalysisMeta, BehavioralTrait, Citation, CitedValue,
    Confidence, DemographicProfile, Motivation, Motivations, PersonaDocument,
    PersonalityScale, ProfileSummary, ScaleKind,
};

/// Everything a render run needs, parsed from one bundle file.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub profile: ProfileSummary,
    pub document: PersonaDocument,
    pub records: Vec<ActivityRecord>,
    pub meta: AnalysisMeta,
}

/// Parse and normalize a bundle. `now` stamps the analysis when the bundle
/// carries no `analyzed_at` of its own.
pub fn parse_bundle(json: &str, now: DateTime<Utc>) -> Result<Bundle> {
    let raw: RawBundle =
        serde_json::from_str(json).map_err(|e| Error::document_parse(e.to_string()))?;

    let document = normalize(raw.persona);
    let records = raw.activity;
    let post_count = records.iter().filter(|r| r.kind == ActivityKind::Post).count();
    let comment_count = records.len() - post_count;

    let meta = AnalysisMeta {
        username: raw.profile.username.clone(),
        analyzed_at: raw.analyzed_at.unwrap_or(now),
        post_count,
        comment_count,
    };
    debug!(
        username = %meta.username,
        attributes = document.present_labels().len(),
        records = records.len(),
        "Bundle parsed"
    );

    Ok(Bundle { profile: raw.profile, document, records, meta })
}

/// Extract the username from a Reddit profile URL, accepting
/// `https://www.reddit.com/user/<name>/`, the `/u/<name>` short form, and
/// bare usernames.
pub fn username_from_profile_url(input: &str) -> Result<String> {
    let invalid = || Error::InvalidProfileUrl { url: input.to_string() };

    if let Ok(parsed) = url::Url::parse(input) {
        let host = parsed.host_str().ok_or_else(invalid)?;
        if host != "reddit.com" && !host.ends_with(".reddit.com") {
            return Err(invalid());
        }
        let mut segments = parsed.path_segments().ok_or_else(invalid)?;
        match (segments.next(), segments.next()) {
            (Some("user") | Some("u"), Some(name)) if is_username(name) => {
                return Ok(name.to_string());
            }
            _ => return Err(invalid()),
        }
    }

    // not a URL; accept a bare username
    let name = input.trim().trim_start_matches("u/");
    if is_username(name) {
        Ok(name.to_string())
    } else {
        Err(invalid())
    }
}

fn is_username(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 20
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

// ─────────────────────────────────────────────────────────────────
// Raw Wire Shapes
// ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawBundle {
    profile: ProfileSummary,
    persona: RawPersona,
    #[serde(default)]
    activity: Vec<ActivityRecord>,
    #[serde(default)]
    analyzed_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawPersona {
    demographics: RawDemographics,
    quote: Option<RawCited>,
    behavioral_traits: Vec<RawTrait>,
    motivations: RawMotivations,
    personality: Vec<RawScale>,
    behaviors: Vec<RawCited>,
    goals: Vec<RawCited>,
    frustrations: Vec<RawCited>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawDemographics {
    age_range: Option<RawCited>,
    location: Option<RawCited>,
    occupation: Option<RawCited>,
    education: Option<RawCited>,
    life_stage: Option<RawCited>,
}

/// Leaf fact as it appears on the wire. `source` is accepted as an alias
/// for `citation`.
#[derive(Deserialize, Default)]
#[serde(default)]
struct RawCited {
    value: String,
    #[serde(alias = "source")]
    citation: String,
    confidence: Confidence,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawTrait {
    name: String,
    value: String,
    evidence: String,
    #[serde(alias = "source")]
    citation: String,
    confidence: Confidence,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawMotivations {
    primary: Option<RawMotivation>,
    secondary: Option<RawMotivation>,
    value_system: Option<RawCited>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawMotivation {
    value: String,
    #[serde(alias = "source")]
    citation: String,
    confidence: Confidence,
    marketing_angle: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawScale {
    name: String,
    score: f32,
    left: Option<String>,
    right: Option<String>,
    #[serde(alias = "source")]
    citation: String,
    confidence: Confidence,
    marketing_impact: Option<String>,
}

// ─────────────────────────────────────────────────────────────────
// Normalization
// ─────────────────────────────────────────────────────────────────

fn normalize(raw: RawPersona) -> PersonaDocument {
    PersonaDocument {
        profile: DemographicProfile {
            age_range: raw.demographics.age_range.and_then(cited),
            location: raw.demographics.location.and_then(cited),
            occupation: raw.demographics.occupation.and_then(cited),
            education: raw.demographics.education.and_then(cited),
            life_stage: raw.demographics.life_stage.and_then(cited),
        },
        quote: raw.quote.and_then(cited),
        behavioral_traits: raw
            .behavioral_traits
            .into_iter()
            .filter_map(behavioral_trait)
            .collect(),
        motivations: Motivations {
            primary: raw.motivations.primary.and_then(motivation),
            secondary: raw.motivations.secondary.and_then(motivation),
            value_system: raw.motivations.value_system.and_then(cited),
        },
        personality: raw.personality.into_iter().filter_map(scale).collect(),
        behaviors: raw.behaviors.into_iter().filter_map(cited).collect(),
        goals: raw.goals.into_iter().filter_map(cited).collect(),
        frustrations: raw.frustrations.into_iter().filter_map(cited).collect(),
    }
}

/// Empty values and missing citations drop the whole attribute.
fn cited(raw: RawCited) -> Option<CitedValue<String>> {
    if raw.value.trim().is_empty() {
        return None;
    }
    let citation = Citation::new(raw.citation)?;
    Some(CitedValue::new(raw.value, citation, raw.confidence))
}

fn behavioral_trait(raw: RawTrait) -> Option<BehavioralTrait> {
    if raw.name.trim().is_empty() || raw.value.trim().is_empty() {
        return None;
    }
    let citation = Citation::new(raw.citation)?;
    Some(BehavioralTrait {
        name: raw.name,
        value: raw.value,
        evidence: raw.evidence,
        citation,
        confidence: raw.confidence,
    })
}

fn motivation(raw: RawMotivation) -> Option<Motivation> {
    if raw.value.trim().is_empty() {
        return None;
    }
    let citation = Citation::new(raw.citation)?;
    Some(Motivation {
        claim: CitedValue::new(raw.value, citation, raw.confidence),
        marketing_angle: raw.marketing_angle.filter(|a| !a.trim().is_empty()),
    })
}

/// Both pole names present makes a bipolar scale clamped to 0-100;
/// anything else is unipolar clamped to 0-10.
fn scale(raw: RawScale) -> Option<PersonalityScale> {
    if raw.name.trim().is_empty() {
        return None;
    }
    let citation = Citation::new(raw.citation)?;
    let kind = match (raw.left, raw.right) {
        (Some(left), Some(right)) if !left.trim().is_empty() && !right.trim().is_empty() => {
            ScaleKind::Bipolar { left, right, score: raw.score.clamp(0.0, 100.0) }
        }
        _ => ScaleKind::Unipolar { score: raw.score.clamp(0.0, 10.0) },
    };
    Some(PersonalityScale {
        name: raw.name,
        kind,
        citation,
        confidence: raw.confidence,
        marketing_impact: raw.marketing_impact.filter(|i| !i.trim().is_empty()),
    })
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
