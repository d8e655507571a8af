use oauth2::basic::BasicClient;
use oauth2::{
    AuthType, AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, TokenResponse, TokenUrl,
};
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use trendscout_core::{CoreError, Credentials, RedditApiError};

const AUTHORIZE_URL: &str = "https://www.reddit.com/api/v1/authorize";
const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct RedditOAuth2Config {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl RedditOAuth2Config {
    pub fn new(client_id: String, client_secret: String, user_agent: String) -> Self {
        Self {
            client_id,
            client_secret,
            user_agent,
        }
    }

    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::new(
            credentials.reddit_client_id.clone(),
            credentials.reddit_client_secret.clone(),
            credentials.reddit_user_agent.clone(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: Instant,
}

impl RedditToken {
    pub fn new(access_token: String, lifetime: Duration) -> Self {
        Self {
            access_token,
            expires_at: Instant::now() + lifetime,
        }
    }

    pub fn is_usable(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN < self.expires_at
    }
}

/// App-only (client credentials) authentication. Tokens are cached until
/// shortly before they expire.
pub struct AppAuthenticator {
    oauth_client: BasicClient,
    token: Mutex<Option<RedditToken>>,
}

impl AppAuthenticator {
    pub fn new(config: &RedditOAuth2Config) -> Result<Self, CoreError> {
        let auth_url = AuthUrl::new(AUTHORIZE_URL.to_string()).map_err(|e| CoreError::Internal {
            message: format!("Invalid authorize URL: {}", e),
        })?;
        let token_url = TokenUrl::new(TOKEN_URL.to_string()).map_err(|e| CoreError::Internal {
            message: format!("Invalid token URL: {}", e),
        })?;

        let oauth_client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::BasicAuth);

        Ok(Self {
            oauth_client,
            token: Mutex::new(None),
        })
    }

    pub async fn access_token(&self, http: &Client) -> Result<String, CoreError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_usable()) {
            return Ok(token.access_token.clone());
        }

        debug!("Requesting app-only Reddit token");
        let response = self
            .oauth_client
            .exchange_client_credentials()
            .request_async(|request| send_token_request(http, request))
            .await
            .map_err(|e| {
                warn!("Reddit token request failed: {}", e);
                RedditApiError::AuthenticationFailed {
                    reason: e.to_string(),
                }
            })?;

        let lifetime = response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let token = RedditToken::new(response.access_token().secret().clone(), lifetime);
        info!(expires_in_secs = lifetime.as_secs(), "Obtained Reddit access token");

        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Drops the cached token so the next call fetches a fresh one.
    pub async fn invalidate(&self) {
        *self.token.lock().await = None;
    }
}

/// Sends the token exchange through the shared client so the configured
/// User-Agent goes out with it. Reddit throttles anonymous agents.
async fn send_token_request(
    http: &Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = http
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RedditOAuth2Config {
        RedditOAuth2Config::new(
            "test_client_id".to_string(),
            "test_client_secret".to_string(),
            "trendscout/test".to_string(),
        )
    }

    #[test]
    fn test_config_from_credentials() {
        let credentials = Credentials {
            reddit_client_id: "id".to_string(),
            reddit_client_secret: "secret".to_string(),
            reddit_user_agent: "agent/1.0".to_string(),
            openai_api_key: "sk".to_string(),
        };
        let config = RedditOAuth2Config::from_credentials(&credentials);
        assert_eq!(config.client_id, "id");
        assert_eq!(config.client_secret, "secret");
        assert_eq!(config.user_agent, "agent/1.0");
    }

    #[test]
    fn test_token_usability() {
        let fresh = RedditToken::new("a".to_string(), Duration::from_secs(3600));
        assert!(fresh.is_usable());

        let nearly_expired = RedditToken::new("b".to_string(), Duration::from_secs(30));
        assert!(!nearly_expired.is_usable());
    }

    #[tokio::test]
    async fn test_cached_token_is_reused() {
        let auth = AppAuthenticator::new(&test_config()).unwrap();
        *auth.token.lock().await = Some(RedditToken::new(
            "cached".to_string(),
            Duration::from_secs(3600),
        ));

        let http = Client::new();
        let token = tokio_test::assert_ok!(auth.access_token(&http).await);
        assert_eq!(token, "cached");

        auth.invalidate().await;
        assert!(auth.token.lock().await.is_none());
    }
}
