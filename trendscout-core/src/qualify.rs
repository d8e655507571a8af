//! Cheap gate deciding whether a post is worth an expensive scorer call.
//!
//! Exclusion rules run first and short-circuit; inclusion paths are then all
//! evaluated so that every satisfied path is reported, in declaration order.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{FilterRules, Thresholds};
use crate::signals::SignalReport;
use crate::types::Post;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualificationPath {
    /// A: velocity alone is high enough.
    HighVelocity,
    /// B: explicit purchase intent at a lower growth rate.
    BuyingSignal,
    /// C: any buying signal plus normal velocity.
    SignalNormalVelocity,
    /// D: busy discussion plus normal velocity.
    HighEngagement,
}

impl QualificationPath {
    pub const ALL: [QualificationPath; 4] = [
        QualificationPath::HighVelocity,
        QualificationPath::BuyingSignal,
        QualificationPath::SignalNormalVelocity,
        QualificationPath::HighEngagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualificationPath::HighVelocity => "high_velocity",
            QualificationPath::BuyingSignal => "buying_signal",
            QualificationPath::SignalNormalVelocity => "signal_normal_velocity",
            QualificationPath::HighEngagement => "high_engagement",
        }
    }
}

impl fmt::Display for QualificationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a post was rejected before any inclusion path was considered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Exclusion {
    Brand(String),
    News(String),
    TitleTooLong { chars: usize, max: usize },
    TooFewComments { count: u32, min: u32 },
    TooFewWords { words: usize, min: usize },
    Question,
    PersonalRelation(String),
    NewsArticle(String),
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::Brand(term) => write!(f, "brand term '{}'", term),
            Exclusion::News(term) => write!(f, "news term '{}'", term),
            Exclusion::TitleTooLong { chars, max } => {
                write!(f, "title has {} chars (max {})", chars, max)
            }
            Exclusion::TooFewComments { count, min } => {
                write!(f, "{} comments (min {})", count, min)
            }
            Exclusion::TooFewWords { words, min } => {
                write!(f, "{} words (min {})", words, min)
            }
            Exclusion::Question => f.write_str("title is a question"),
            Exclusion::PersonalRelation(term) => write!(f, "personal marker '{}'", term),
            Exclusion::NewsArticle(term) => write!(f, "article marker '{}'", term),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualificationResult {
    pub eligible: bool,
    pub paths: Vec<QualificationPath>,
    pub buying_signal_count: usize,
    pub excerpts: Vec<String>,
    pub exclusion: Option<Exclusion>,
}

impl QualificationResult {
    pub fn has_path(&self, path: QualificationPath) -> bool {
        self.paths.contains(&path)
    }
}

#[derive(Debug, Clone)]
pub struct Qualifier {
    thresholds: Thresholds,
    filters: FilterRules,
}

impl Qualifier {
    pub fn new(thresholds: Thresholds, filters: FilterRules) -> Self {
        Self {
            thresholds,
            filters,
        }
    }

    /// Lowest velocity at which any inclusion path can still match.
    pub fn min_inclusion_velocity(&self) -> f64 {
        self.thresholds
            .high_velocity
            .min(self.thresholds.normal_velocity)
            .min(self.thresholds.buying_signal_velocity)
    }

    pub fn exclusion(&self, post: &Post) -> Option<Exclusion> {
        let filters = &self.filters;
        let title = post.title.to_lowercase();

        if let Some(term) = filters.brand_denylist.first_match_in_lowercase(&title) {
            return Some(Exclusion::Brand(term.to_string()));
        }
        if let Some(term) = filters.news_denylist.first_match_in_lowercase(&title) {
            return Some(Exclusion::News(term.to_string()));
        }

        let chars = post.title.chars().count();
        if chars > filters.title_max_chars {
            return Some(Exclusion::TitleTooLong {
                chars,
                max: filters.title_max_chars,
            });
        }

        if post.comment_count < filters.min_comments {
            return Some(Exclusion::TooFewComments {
                count: post.comment_count,
                min: filters.min_comments,
            });
        }

        if filters.strict {
            return self.strict_exclusion(&title);
        }

        None
    }

    fn strict_exclusion(&self, title: &str) -> Option<Exclusion> {
        let filters = &self.filters;

        let words = title.split_whitespace().count();
        if words < filters.min_words {
            return Some(Exclusion::TooFewWords {
                words,
                min: filters.min_words,
            });
        }

        if title.trim_end().ends_with('?') {
            let first = title
                .split_whitespace()
                .next()
                .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
                .unwrap_or_default();
            if filters.interrogatives.iter().any(|word| word == first) {
                return Some(Exclusion::Question);
            }
        }

        if let Some(term) = filters.relation_markers.first_match_in_lowercase(title) {
            return Some(Exclusion::PersonalRelation(term.to_string()));
        }
        if let Some(term) = filters.article_markers.first_match_in_lowercase(title) {
            return Some(Exclusion::NewsArticle(term.to_string()));
        }

        None
    }

    pub fn qualify(&self, post: &Post, velocity: f64, signals: &SignalReport) -> QualificationResult {
        let mut result = QualificationResult {
            buying_signal_count: signals.count,
            excerpts: signals.excerpts.clone(),
            ..QualificationResult::default()
        };

        if let Some(exclusion) = self.exclusion(post) {
            result.exclusion = Some(exclusion);
            return result;
        }

        // Out-of-window posts carry velocity 0 and never qualify.
        if !velocity.is_finite() || velocity <= 0.0 {
            return result;
        }

        let t = &self.thresholds;
        let buying_signal_present = signals.count >= t.min_buying_signals.max(1);

        if velocity >= t.high_velocity {
            result.paths.push(QualificationPath::HighVelocity);
        }
        if buying_signal_present && velocity >= t.buying_signal_velocity {
            result.paths.push(QualificationPath::BuyingSignal);
        }
        if signals.is_present() && velocity >= t.normal_velocity {
            result.paths.push(QualificationPath::SignalNormalVelocity);
        }
        if post.comment_count > t.high_engagement_comments && velocity >= t.normal_velocity {
            result.paths.push(QualificationPath::HighEngagement);
        }

        result.eligible = !result.paths.is_empty();
        result
    }
}
