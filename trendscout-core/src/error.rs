use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Reddit API error: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("Scorer error: {0}")]
    Llm(#[from] LlmError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Remote answered with a status no narrower variant covers.
    #[error("Request failed: {message}")]
    RequestFailed {
        message: String,
        status_code: Option<u16>,
    },
}

#[derive(Error, Debug, Clone)]
pub enum RedditApiError {
    #[error("App-only authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Rate limited, retry after {retry_after}s")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Access to {resource} is forbidden")]
    Forbidden { resource: String },

    #[error("Community r/{subreddit} does not exist")]
    SubredditNotFound { subreddit: String },

    #[error("Post {post_id} does not exist")]
    PostNotFound { post_id: String },

    #[error("Access token rejected")]
    InvalidToken,

    #[error("Reddit did not answer in time")]
    RequestTimeout,

    #[error("Unreadable response: {details}")]
    InvalidResponse { details: String },

    #[error("Reddit server error {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("{provider} rejected the API key")]
    InvalidApiKey { provider: String },

    #[error("{provider} rate limit reached")]
    RateLimitExceeded { provider: String },

    #[error("{provider} returned status {status_code}: {body}")]
    UnexpectedStatus {
        provider: String,
        status_code: u16,
        body: String,
    },

    #[error("{provider} is unavailable")]
    ServiceUnavailable { provider: String },

    #[error("{provider} did not answer in time")]
    RequestTimeout { provider: String },

    #[error("{provider} reply could not be decoded")]
    InvalidResponseFormat { provider: String },
}

#[derive(Error, Debug, Clone)]
pub enum NotifyError {
    #[error("Webhook returned status {status_code}")]
    WebhookRejected { status_code: u16 },

    #[error("Desktop notification failed: {reason}")]
    Desktop { reason: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}")]
    FileNotFound { path: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Environment variable {var_name} is not set")]
    MissingEnvironmentVariable { var_name: String },

    #[error("Invalid configuration: {reason}")]
    ValidationFailed { reason: String },

    #[error("Config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
}
