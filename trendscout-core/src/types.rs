use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::qualify::QualificationResult;

/// Snapshot of a community post as returned by the content source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub comment_count: u32,
    pub community: String,
    pub permalink: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub body: String,
    pub score: i64,
}

impl Comment {
    pub fn new(body: impl Into<String>, score: i64) -> Self {
        Self {
            body: body.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Hot,
    Rising,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Hot => "hot",
            ListingKind::Rising => "rising",
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentSort {
    Top,
    Best,
    New,
}

impl CommentSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentSort::Top => "top",
            CommentSort::Best => "best",
            CommentSort::New => "new",
        }
    }
}

/// An eligible post waiting in the run's candidate pool.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub post: Post,
    pub velocity: f64,
    pub qualification: QualificationResult,
    pub priority: f64,
    pub community: String,
    /// Comment window fetched during collection, reused as scorer context.
    pub comments: Vec<Comment>,
}

impl Candidate {
    pub fn new(
        post: Post,
        velocity: f64,
        qualification: QualificationResult,
        comments: Vec<Comment>,
    ) -> Self {
        let community = post.community.clone();
        Self {
            post,
            velocity,
            qualification,
            priority: 0.0,
            community,
            comments,
        }
    }

    pub fn buying_signal_count(&self) -> usize {
        self.qualification.buying_signal_count
    }
}

/// Scorer verdict for one candidate. A score of 0 means the scorer failed or
/// did not produce a usable score line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    pub rationale: String,
    pub variations: String,
    pub target: String,
    pub angle: String,
}

impl ScoreResult {
    pub const API_ERROR: &'static str = "API error";
    pub const ANALYSIS_FAILED: &'static str = "Analysis failed";

    pub fn failed(rationale: &str) -> Self {
        Self {
            rationale: rationale.to_string(),
            ..Self::default()
        }
    }
}
