use crate::error::*;
use std::fmt::Display;
use tracing::{error, info, warn};

pub trait ErrorExt: Display {
    /// Whether the failure is expected to clear up on its own (network blips,
    /// rate limits, upstream 5xx). Nothing retries on this; it only decides
    /// how loudly a failure is reported.
    fn is_transient(&self) -> bool;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> &'static str;

    fn log_error(&self) -> &Self {
        error!(code = self.error_code(), "{}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!(code = self.error_code(), "{}", self);
        self
    }
}

impl ErrorExt for CoreError {
    fn is_transient(&self) -> bool {
        match self {
            CoreError::RedditApi(e) => e.is_transient(),
            CoreError::Llm(e) => e.is_transient(),
            CoreError::Notify(e) => e.is_transient(),
            CoreError::Network(_) => true,
            CoreError::RequestFailed { status_code, .. } => {
                matches!(status_code, Some(429) | Some(500..=599))
            }
            _ => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::Llm(e) => e.user_friendly_message(),
            CoreError::Notify(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => "Could not reach a remote service.".to_string(),
            CoreError::RequestFailed { message, .. } => format!("Request failed: {}", message),
            _ => "Unexpected failure; see the log for details.".to_string(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CoreError::RedditApi(_) => "REDDIT_API",
            CoreError::Llm(_) => "LLM",
            CoreError::Notify(_) => "NOTIFY",
            CoreError::Config(_) => "CONFIG",
            CoreError::Network(_) => "NETWORK",
            CoreError::Internal { .. } => "INTERNAL",
            CoreError::RequestFailed { .. } => "REQUEST_FAILED",
        }
    }

    fn log_error(&self) -> &Self {
        let detail: Option<&dyn std::fmt::Debug> = match self {
            CoreError::RedditApi(e) => Some(e),
            CoreError::Llm(e) => Some(e),
            CoreError::Notify(e) => Some(e),
            CoreError::Config(e) => Some(e),
            _ => None,
        };
        match detail {
            Some(detail) => error!(code = self.error_code(), detail = ?detail, "{}", self),
            None => error!(code = self.error_code(), "{}", self),
        }
        self
    }
}

impl ErrorExt for RedditApiError {
    fn is_transient(&self) -> bool {
        match self {
            RedditApiError::RateLimitExceeded { .. } | RedditApiError::RequestTimeout => true,
            RedditApiError::ServerError { status_code } => *status_code >= 500,
            _ => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => {
                "Reddit refused the app credentials; check REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET."
                    .to_string()
            }
            RedditApiError::RateLimitExceeded { retry_after } => {
                format!("Reddit is throttling this app for {} seconds.", retry_after)
            }
            RedditApiError::Forbidden { resource } => {
                format!("{} is private, quarantined or banned.", resource)
            }
            RedditApiError::SubredditNotFound { subreddit } => {
                format!("r/{} does not exist; remove it from the community list.", subreddit)
            }
            RedditApiError::PostNotFound { post_id } => {
                format!("Post {} was removed before it could be read.", post_id)
            }
            RedditApiError::InvalidToken => {
                "Reddit rejected the access token; a new one is requested next time.".to_string()
            }
            RedditApiError::RequestTimeout => "Reddit did not answer in time.".to_string(),
            RedditApiError::InvalidResponse { .. } | RedditApiError::ServerError { .. } => {
                "Reddit returned something unusable.".to_string()
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RedditApiError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED",
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT",
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN",
            RedditApiError::SubredditNotFound { .. } => "REDDIT_SUBREDDIT_NOT_FOUND",
            RedditApiError::PostNotFound { .. } => "REDDIT_POST_NOT_FOUND",
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN",
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT",
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE",
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR",
        }
    }
}

impl ErrorExt for LlmError {
    fn is_transient(&self) -> bool {
        match self {
            LlmError::RateLimitExceeded { .. }
            | LlmError::ServiceUnavailable { .. }
            | LlmError::RequestTimeout { .. } => true,
            LlmError::UnexpectedStatus { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            LlmError::InvalidApiKey { provider } => {
                format!("{} rejected OPENAI_API_KEY.", provider)
            }
            LlmError::RateLimitExceeded { provider } => {
                format!("{} quota reached; lower the scoring budget.", provider)
            }
            LlmError::ServiceUnavailable { provider } => format!("{} is down.", provider),
            _ => "The candidate could not be scored.".to_string(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            LlmError::InvalidApiKey { .. } => "LLM_INVALID_API_KEY",
            LlmError::RateLimitExceeded { .. } => "LLM_RATE_LIMIT",
            LlmError::UnexpectedStatus { .. } => "LLM_UNEXPECTED_STATUS",
            LlmError::ServiceUnavailable { .. } => "LLM_SERVICE_UNAVAILABLE",
            LlmError::RequestTimeout { .. } => "LLM_TIMEOUT",
            LlmError::InvalidResponseFormat { .. } => "LLM_INVALID_RESPONSE",
        }
    }
}

impl ErrorExt for NotifyError {
    fn is_transient(&self) -> bool {
        match self {
            NotifyError::WebhookRejected { status_code } => {
                *status_code == 429 || *status_code >= 500
            }
            NotifyError::Desktop { .. } => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            NotifyError::WebhookRejected { status_code } => {
                format!("Webhook refused the alert (status {}).", status_code)
            }
            NotifyError::Desktop { reason } => {
                format!("No desktop notification service: {}", reason)
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            NotifyError::WebhookRejected { .. } => "NOTIFY_WEBHOOK_REJECTED",
            NotifyError::Desktop { .. } => "NOTIFY_DESKTOP",
        }
    }
}

impl ErrorExt for ConfigError {
    fn is_transient(&self) -> bool {
        false
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => format!("Cannot read {}.", path),
            ConfigError::InvalidValue { field, value } => {
                format!("'{}' is not a valid value for {}.", value, field)
            }
            ConfigError::MissingEnvironmentVariable { var_name } => {
                format!("Set {} before starting a scan.", var_name)
            }
            ConfigError::ValidationFailed { reason } => format!("Configuration rejected: {}", reason),
            ConfigError::Parse(e) => format!("Config file is not valid TOML: {}", e),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND",
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE",
            ConfigError::MissingEnvironmentVariable { .. } => "CONFIG_MISSING_ENV_VAR",
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED",
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR",
        }
    }
}

/// Central sink for failures that are caught and absorbed at a run boundary.
pub struct ErrorReporter {
    report_errors: bool,
    report_warnings: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            report_errors: true,
            report_warnings: true,
        }
    }

    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn with_warning_reporting(mut self, enabled: bool) -> Self {
        self.report_warnings = enabled;
        self
    }

    pub fn report_error(&self, error: &CoreError) {
        if self.report_errors {
            error.log_error();
            info!(code = error.error_code(), "{}", error.user_friendly_message());
        }
    }

    pub fn report_warning(&self, error: &CoreError) {
        if self.report_warnings {
            error.log_warn();
        }
    }

    /// Transient failures are warnings, anything else is an error.
    pub fn report(&self, error: &CoreError) {
        if error.is_transient() {
            self.report_warning(error);
        } else {
            self.report_error(error);
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
