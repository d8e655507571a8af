//! Run configuration.
//!
//! Built once at startup from defaults, an optional TOML file and `TRENDSCOUT_*`
//! environment overrides, validated, then handed to the coordinator as an
//! immutable value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::phrases::PhraseSet;
use crate::qualify::Qualifier;
use crate::rank::DEFAULT_BUYING_SIGNAL_BONUS;
use crate::tier::TierCutoffs;
use crate::velocity::VelocityWindow;

pub const CONFIG_PATH_VAR: &str = "TRENDSCOUT_CONFIG";
pub const DEFAULT_USER_AGENT: &str = "trendscout/0.1 (trend detector)";

const DEFAULT_COMMUNITIES: &[&str] = &[
    "all",
    "brandnewsentence",
    "suspiciouslyspecific",
    "antiwork",
    "nursing",
    "teachers",
    "conservative",
    "politics",
    "nfl",
    "nba",
    "soccer",
    "blackpeopletwitter",
    "whitepeopletwitter",
    "rareinsults",
    "wallstreetbets",
];

const DEFAULT_BRANDS: &[&str] = &[
    "disney",
    "marvel",
    "nike",
    "nintendo",
    "pokemon",
    "coca-cola",
    "mcdonalds",
    "star wars",
    "harry potter",
    "netflix",
    "spotify",
];

const DEFAULT_NEWS_TERMS: &[&str] = &[
    "died",
    "killed",
    "arrested",
    "convicted",
    "sentenced",
    "breaking:",
    "update:",
    "megathread",
];

const DEFAULT_BUYING_PHRASES: &[&str] = &[
    "need this on a shirt",
    "need this shirt",
    "i'd buy this",
    "i would buy this",
    "i'd buy that",
    "would buy",
    "take my money",
    "put this on a shirt",
    "put it on a shirt",
    "make this a shirt",
    "this needs to be a shirt",
    "someone make this a shirt",
    "i'd wear this",
    "i would wear this",
    "where can i buy",
    "on a t-shirt",
    "bumper sticker",
];

const DEFAULT_INTERROGATIVES: &[&str] = &[
    "what", "why", "how", "who", "when", "where", "which", "is", "are", "do", "does", "did",
    "can", "could", "should", "would", "will", "has", "have", "anyone",
];

const DEFAULT_RELATION_MARKERS: &[&str] = &[
    "my mom",
    "my dad",
    "my wife",
    "my husband",
    "my son",
    "my daughter",
    "my girlfriend",
    "my boyfriend",
    "my brother",
    "my sister",
    "my grandma",
    "my grandpa",
];

const DEFAULT_ARTICLE_MARKERS: &[&str] = &[
    "study:",
    "poll:",
    "survey:",
    "report:",
    "lawsuit",
    "according to",
    "judge rules",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub high_velocity: f64,
    pub normal_velocity: f64,
    pub buying_signal_velocity: f64,
    /// Signal count at which buying intent counts as present for path B.
    pub min_buying_signals: usize,
    /// Comment count that must be exceeded for the engagement path.
    pub high_engagement_comments: u32,
    pub buying_signal_bonus: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high_velocity: 1000.0,
            normal_velocity: 500.0,
            buying_signal_velocity: 300.0,
            min_buying_signals: 1,
            high_engagement_comments: 100,
            buying_signal_bonus: DEFAULT_BUYING_SIGNAL_BONUS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    pub brand_denylist: PhraseSet,
    pub news_denylist: PhraseSet,
    pub title_max_chars: usize,
    pub min_comments: u32,
    pub strict: bool,
    pub min_words: usize,
    pub interrogatives: PhraseSet,
    pub relation_markers: PhraseSet,
    pub article_markers: PhraseSet,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            brand_denylist: PhraseSet::new(DEFAULT_BRANDS),
            news_denylist: PhraseSet::new(DEFAULT_NEWS_TERMS),
            title_max_chars: 100,
            min_comments: 20,
            strict: false,
            min_words: 3,
            interrogatives: PhraseSet::new(DEFAULT_INTERROGATIVES),
            relation_markers: PhraseSet::new(DEFAULT_RELATION_MARKERS),
            article_markers: PhraseSet::new(DEFAULT_ARTICLE_MARKERS),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerSettings {
    /// Scorer calls allowed per run.
    pub budget: usize,
    pub context_comments: usize,
    pub comment_excerpt_chars: usize,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ScorerSettings {
    fn default() -> Self {
        Self {
            budget: 20,
            context_comments: 10,
            comment_excerpt_chars: 150,
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.3,
            max_tokens: 250,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    pub community_delay_ms: u64,
    pub scorer_delay_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            community_delay_ms: 2000,
            scorer_delay_ms: 1000,
        }
    }
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            community_delay_ms: 0,
            scorer_delay_ms: 0,
        }
    }

    pub fn community_delay(&self) -> Duration {
        Duration::from_millis(self.community_delay_ms)
    }

    pub fn scorer_delay(&self) -> Duration {
        Duration::from_millis(self.scorer_delay_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    #[default]
    Discord,
    Desktop,
    Log,
}

impl FromStr for NotifierKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "discord" | "webhook" => Ok(NotifierKind::Discord),
            "desktop" => Ok(NotifierKind::Desktop),
            "log" | "none" => Ok(NotifierKind::Log),
            other => Err(ConfigError::InvalidValue {
                field: "notifier.kind".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierSettings {
    pub kind: NotifierKind,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub communities: Vec<String>,
    /// Posts requested per listing kind per community.
    pub listing_limit: u32,
    /// Comments scanned for buying signals per post.
    pub signal_comment_limit: u32,
    pub velocity: VelocityWindow,
    pub thresholds: Thresholds,
    pub filters: FilterRules,
    pub buying_phrases: PhraseSet,
    pub scorer: ScorerSettings,
    pub pacing: Pacing,
    pub tiers: TierCutoffs,
    pub notifier: NotifierSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            communities: DEFAULT_COMMUNITIES.iter().map(|s| s.to_string()).collect(),
            listing_limit: 10,
            signal_comment_limit: 10,
            velocity: VelocityWindow::default(),
            thresholds: Thresholds::default(),
            filters: FilterRules::default(),
            buying_phrases: PhraseSet::new(DEFAULT_BUYING_PHRASES),
            scorer: ScorerSettings::default(),
            pacing: Pacing::default(),
            tiers: TierCutoffs::default(),
            notifier: NotifierSettings::default(),
        }
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        field: key.to_string(),
        value: raw.to_string(),
    })
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

impl AppConfig {
    /// Defaults, then the file named by `TRENDSCOUT_CONFIG` if set, then
    /// process environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `TRENDSCOUT_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("TRENDSCOUT_COMMUNITIES") {
            self.communities = v
                .split(',')
                .map(|s| s.trim().trim_start_matches("r/").to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = get("TRENDSCOUT_LISTING_LIMIT") {
            self.listing_limit = parse_value("TRENDSCOUT_LISTING_LIMIT", &v)?;
        }
        if let Some(v) = get("TRENDSCOUT_SIGNAL_COMMENT_LIMIT") {
            self.signal_comment_limit = parse_value("TRENDSCOUT_SIGNAL_COMMENT_LIMIT", &v)?;
        }
        if let Some(v) = get("TRENDSCOUT_MIN_AGE_HOURS") {
            self.velocity.min_age_hours = parse_value("TRENDSCOUT_MIN_AGE_HOURS", &v)?;
        }
        if let Some(v) = get("TRENDSCOUT_MAX_AGE_HOURS") {
            self.velocity.max_age_hours = parse_value("TRENDSCOUT_MAX_AGE_HOURS", &v)?;
        }
        if let Some(v) = get("TRENDSCOUT_HIGH_VELOCITY") {
            self.thresholds.high_velocity = parse_value("TRENDSCOUT_HIGH_VELOCITY", &v)?;
        }
        if let Some(v) = get("TRENDSCOUT_NORMAL_VELOCITY") {
            self.thresholds.normal_velocity = parse_value("TRENDSCOUT_NORMAL_VELOCITY", &v)?;
        }
        if let Some(v) = get("TRENDSCOUT_BUYING_SIGNAL_VELOCITY") {
            self.thresholds.buying_signal_velocity =
                parse_value("TRENDSCOUT_BUYING_SIGNAL_VELOCITY", &v)?;
        }
        if let Some(v) = get("TRENDSCOUT_SCORER_BUDGET") {
            self.scorer.budget = parse_value("TRENDSCOUT_SCORER_BUDGET", &v)?;
        }
        if let Some(v) = get("TRENDSCOUT_SCORER_MODEL") {
            self.scorer.model = v.trim().to_string();
        }
        if let Some(v) = get("TRENDSCOUT_BRAND_DENYLIST") {
            self.filters.brand_denylist = PhraseSet::from_csv(&v);
        }
        if let Some(v) = get("TRENDSCOUT_NEWS_DENYLIST") {
            self.filters.news_denylist = PhraseSet::from_csv(&v);
        }
        if let Some(v) = get("TRENDSCOUT_MIN_COMMENTS") {
            self.filters.min_comments = parse_value("TRENDSCOUT_MIN_COMMENTS", &v)?;
        }
        if let Some(v) = get("TRENDSCOUT_TITLE_MAX_CHARS") {
            self.filters.title_max_chars = parse_value("TRENDSCOUT_TITLE_MAX_CHARS", &v)?;
        }
        if let Some(v) = get("TRENDSCOUT_STRICT_FILTERS") {
            self.filters.strict = parse_bool("TRENDSCOUT_STRICT_FILTERS", &v)?;
        }
        if let Some(v) = get("TRENDSCOUT_BUYING_PHRASES") {
            self.buying_phrases = PhraseSet::from_csv(&v);
        }
        if let Some(v) = get("TRENDSCOUT_COMMUNITY_DELAY_MS") {
            self.pacing.community_delay_ms = parse_value("TRENDSCOUT_COMMUNITY_DELAY_MS", &v)?;
        }
        if let Some(v) = get("TRENDSCOUT_SCORER_DELAY_MS") {
            self.pacing.scorer_delay_ms = parse_value("TRENDSCOUT_SCORER_DELAY_MS", &v)?;
        }
        if let Some(v) = get("TRENDSCOUT_HIGH_SCORE") {
            self.tiers.high = parse_value("TRENDSCOUT_HIGH_SCORE", &v)?;
        }
        if let Some(v) = get("TRENDSCOUT_MEDIUM_SCORE") {
            self.tiers.medium = parse_value("TRENDSCOUT_MEDIUM_SCORE", &v)?;
        }
        if let Some(v) = get("TRENDSCOUT_NOTIFIER") {
            self.notifier.kind = v.parse()?;
        }
        if let Some(v) = get("DISCORD_WEBHOOK") {
            self.notifier.webhook_url = Some(v.trim().to_string());
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |reason: String| Err(ConfigError::ValidationFailed { reason });

        if self.communities.is_empty() {
            return fail("at least one community must be configured".to_string());
        }
        let t = &self.thresholds;
        // Out-of-window posts have velocity 0 and must never reach a path.
        for (name, value) in [
            ("high_velocity", t.high_velocity),
            ("normal_velocity", t.normal_velocity),
            ("buying_signal_velocity", t.buying_signal_velocity),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return fail(format!("{} must be a positive number", name));
            }
        }
        if !t.buying_signal_bonus.is_finite() || t.buying_signal_bonus < 0.0 {
            return fail("buying_signal_bonus must be a non-negative number".to_string());
        }
        if !(self.velocity.min_age_hours > 0.0
            && self.velocity.min_age_hours < self.velocity.max_age_hours)
        {
            return fail(format!(
                "velocity window [{}, {}] must start above zero and be non-empty",
                self.velocity.min_age_hours, self.velocity.max_age_hours
            ));
        }
        if self.scorer.budget == 0 {
            return fail("scorer budget must be at least 1".to_string());
        }
        // Score 0 means failed or absent and must stay Low.
        if self.tiers.medium == 0 || self.tiers.high > 10 || self.tiers.medium > self.tiers.high {
            return fail(format!(
                "tier cutoffs must satisfy 1 <= medium <= high <= 10 (got medium={}, high={})",
                self.tiers.medium, self.tiers.high
            ));
        }
        if self.listing_limit == 0 {
            return fail("listing_limit must be at least 1".to_string());
        }
        if self.notifier.kind == NotifierKind::Discord {
            let raw = self.notifier.webhook_url.as_deref().ok_or_else(|| {
                ConfigError::MissingEnvironmentVariable {
                    var_name: "DISCORD_WEBHOOK".to_string(),
                }
            })?;
            url::Url::parse(raw).map_err(|_| ConfigError::InvalidValue {
                field: "notifier.webhook_url".to_string(),
                value: raw.to_string(),
            })?;
        }

        Ok(())
    }

    pub fn qualifier(&self) -> Qualifier {
        Qualifier::new(self.thresholds.clone(), self.filters.clone())
    }
}

/// Secrets needed by the remote collaborators. Kept apart from `AppConfig` so
/// the run configuration can be logged.
#[derive(Clone)]
pub struct Credentials {
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
    pub openai_api_key: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvironmentVariable {
                    var_name: key.to_string(),
                })
        };

        Ok(Self {
            reddit_client_id: required("REDDIT_CLIENT_ID")?,
            reddit_client_secret: required("REDDIT_CLIENT_SECRET")?,
            reddit_user_agent: lookup("REDDIT_USER_AGENT")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            openai_api_key: required("OPENAI_API_KEY")?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("reddit_client_id", &self.reddit_client_id)
            .field("reddit_client_secret", &"<redacted>")
            .field("reddit_user_agent", &self.reddit_user_agent)
            .field("openai_api_key", &"<redacted>")
            .finish()
    }
}
