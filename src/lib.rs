//! persona-lens - Reddit persona card and report renderer
//!
//! Turns a structured analysis bundle (account profile, cited persona
//! attributes, public activity) into two artifacts: a fixed-size persona
//! card image and a plain-text or markdown report. Every rendered fact
//! carries its citation and confidence level.

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod logging;
pub mod render;
pub mod types;
pub mod version;
