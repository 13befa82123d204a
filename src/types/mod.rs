//! Core data types shared across the crate.

mod activity;
mod persona;

pub use activity::{
    top_subreddits, ActivityKind, ActivityRecord, AnalysisMeta, ProfileSummary,
};
pub use persona::{
    sort_by_confidence, BehavioralTrait, Citation, CitedValue, Confidence, DemographicProfile,
    Motivation, Motivations, PersonaDocument, PersonalityScale, ScaleKind,
};
