//! Activity and account types.
//!
//! Read-only inputs supplied alongside the persona document: the subject's
//! public activity records and account profile summary. The rendering core
//! never mutates these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────
// Activity Records
// ─────────────────────────────────────────────────────────────────

/// Whether an activity record is a submission or a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Post,
    Comment,
}

/// One public post or comment, as fetched by the external collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub kind: ActivityKind,

    /// Submission title; comments have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Body text (selftext for posts).
    #[serde(default)]
    pub body: String,

    /// Permalink relative to the site root, e.g. "/r/rust/comments/...".
    pub permalink: String,

    /// Net vote score.
    #[serde(default)]
    pub score: i64,

    pub subreddit: String,

    pub created_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────
// Profile Summary
// ─────────────────────────────────────────────────────────────────

/// Account-level metadata for the analyzed user; consumed read-only and
/// passed through to the account-statistics report section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub username: String,

    /// Avatar image URL; empty string means no avatar is available and the
    /// default avatar is used without a fetch attempt.
    #[serde(default)]
    pub avatar_url: String,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub comment_karma: i64,

    #[serde(default)]
    pub link_karma: i64,

    #[serde(default)]
    pub is_gold: bool,

    #[serde(default)]
    pub is_mod: bool,

    #[serde(default)]
    pub email_verified: bool,
}

impl ProfileSummary {
    /// Human-readable account age relative to `now`, e.g.
    /// "2 years 3 months" or "14 days".
    pub fn account_age(&self, now: DateTime<Utc>) -> String {
        let days = (now - self.created_at).num_days().max(0);
        let years = days / 365;
        let months = (days % 365) / 30;
        let rem_days = (days % 365) % 30;

        let mut parts = Vec::new();
        if years > 0 {
            parts.push(format!("{} year{}", years, plural(years)));
        }
        if months > 0 {
            parts.push(format!("{} month{}", months, plural(months)));
        }
        if rem_days > 0 || parts.is_empty() {
            parts.push(format!("{} day{}", rem_days, plural(rem_days)));
        }
        parts.join(" ")
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

// ─────────────────────────────────────────────────────────────────
// Analysis Metadata
// ─────────────────────────────────────────────────────────────────

/// Metadata about one analysis run, carried into the report header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMeta {
    pub username: String,
    pub analyzed_at: DateTime<Utc>,
    pub post_count: usize,
    pub comment_count: usize,
}

/// Top subreddits by combined post+comment activity, descending by count.
/// Count ties keep first-seen order, so the result is deterministic.
pub fn top_subreddits(records: &[ActivityRecord], limit: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|(name, _)| *name == record.subreddit) {
            Some((_, n)) => *n += 1,
            None => counts.push((record.subreddit.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(kind: ActivityKind, subreddit: &str) -> ActivityRecord {
        ActivityRecord {
            kind,
            title: None,
            body: "text".to_string(),
            permalink: "/r/test/comments/abc".to_string(),
            score: 1,
            subreddit: subreddit.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_account_age_formats() {
        let profile = ProfileSummary {
            username: "kojied".to_string(),
            avatar_url: String::new(),
            created_at: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            comment_karma: 0,
            link_karma: 0,
            is_gold: false,
            is_mod: false,
            email_verified: false,
        };
        let now = Utc.with_ymd_and_hms(2022, 2, 5, 0, 0, 0).unwrap();
        let age = profile.account_age(now);
        assert!(age.starts_with("2 years"), "got: {}", age);
    }

    #[test]
    fn test_account_age_fresh_account() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let profile = ProfileSummary {
            username: "new".to_string(),
            avatar_url: String::new(),
            created_at: now,
            comment_karma: 0,
            link_karma: 0,
            is_gold: false,
            is_mod: false,
            email_verified: false,
        };
        assert_eq!(profile.account_age(now), "0 days");
    }

    #[test]
    fn test_top_subreddits_counts_and_order() {
        let records = vec![
            record(ActivityKind::Post, "rust"),
            record(ActivityKind::Comment, "gamedev"),
            record(ActivityKind::Comment, "rust"),
            record(ActivityKind::Post, "cooking"),
            record(ActivityKind::Comment, "rust"),
            record(ActivityKind::Comment, "gamedev"),
        ];
        let top = top_subreddits(&records, 2);
        assert_eq!(top, vec![("rust".to_string(), 3), ("gamedev".to_string(), 2)]);
    }

    #[test]
    fn test_top_subreddits_tie_keeps_first_seen() {
        let records = vec![
            record(ActivityKind::Post, "alpha"),
            record(ActivityKind::Post, "beta"),
        ];
        let top = top_subreddits(&records, 5);
        assert_eq!(top[0].0, "alpha");
        assert_eq!(top[1].0, "beta");
    }

    #[test]
    fn test_activity_record_deserialize() {
        let json = r#"{
            "kind": "comment",
            "body": "great post",
            "permalink": "/r/rust/comments/xyz",
            "score": 12,
            "subreddit": "rust",
            "created_at": "2024-03-01T12:00:00Z"
        }"#;
        let rec: ActivityRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.kind, ActivityKind::Comment);
        assert!(rec.title.is_none());
        assert_eq!(rec.score, 12);
    }
}
