//! Alert delivery for high-tier results.

pub mod desktop;
pub mod discord;
pub mod logger;

pub use desktop::DesktopNotifier;
pub use discord::DiscordWebhook;
pub use logger::LogNotifier;

use serde::Serialize;
use trendscout_core::{
    Candidate, ConfigError, CoreError, NotifierKind, NotifierSettings, ScoreResult, Tier,
};

/// Everything a notifier needs to describe one result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub post_id: String,
    pub title: String,
    pub community: String,
    pub permalink: String,
    pub upvotes: i64,
    pub velocity: f64,
    pub buying_signal_count: usize,
    pub tier: Tier,
    pub result: ScoreResult,
}

impl Alert {
    pub fn new(candidate: &Candidate, result: &ScoreResult, tier: Tier) -> Self {
        Self {
            post_id: candidate.post.id.clone(),
            title: candidate.post.title.clone(),
            community: candidate.community.clone(),
            permalink: candidate.post.permalink.clone(),
            upvotes: candidate.post.score,
            velocity: candidate.velocity,
            buying_signal_count: candidate.buying_signal_count(),
            tier,
            result: result.clone(),
        }
    }

    pub fn post_url(&self) -> String {
        format!("https://reddit.com{}", self.permalink)
    }
}

/// One-way push of an [`Alert`]. Failures are reported, never retried.
pub trait Notifier {
    async fn send(&self, alert: &Alert) -> Result<(), CoreError>;
}

/// The configured delivery channel.
pub enum NotifierBackend {
    Discord(DiscordWebhook),
    Desktop(DesktopNotifier),
    Log(LogNotifier),
}

impl NotifierBackend {
    pub fn from_settings(settings: &NotifierSettings) -> Result<Self, CoreError> {
        match settings.kind {
            NotifierKind::Discord => {
                let url = settings.webhook_url.clone().ok_or_else(|| {
                    ConfigError::MissingEnvironmentVariable {
                        var_name: "DISCORD_WEBHOOK".to_string(),
                    }
                })?;
                Ok(Self::Discord(DiscordWebhook::new(url)?))
            }
            NotifierKind::Desktop => Ok(Self::Desktop(DesktopNotifier::new())),
            NotifierKind::Log => Ok(Self::Log(LogNotifier)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Discord(_) => "discord",
            Self::Desktop(_) => "desktop",
            Self::Log(_) => "log",
        }
    }
}

impl Notifier for NotifierBackend {
    async fn send(&self, alert: &Alert) -> Result<(), CoreError> {
        match self {
            Self::Discord(backend) => backend.send(alert).await,
            Self::Desktop(backend) => backend.send(alert).await,
            Self::Log(backend) => backend.send(alert).await,
        }
    }
}

/// Cuts `text` to at most `max` characters for display.
pub(crate) fn clip(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
