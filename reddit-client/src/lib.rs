pub mod api;
pub mod auth;

pub use api::{RedditApiClient, RedditCommentData, RedditListing, RedditPostData};
pub use auth::{AppAuthenticator, RedditOAuth2Config, RedditToken};

use tracing::warn;
use trendscout_core::{
    Comment, CommentSort, ContentSource, CoreError, ListingKind, Post, RedditApiError,
};

/// Reddit-backed [`ContentSource`] using app-only OAuth.
pub struct RedditClient {
    api: RedditApiClient,
    auth: AppAuthenticator,
}

impl RedditClient {
    pub fn new(config: RedditOAuth2Config) -> Result<Self, CoreError> {
        let api = RedditApiClient::new(config.user_agent.clone())?;
        let auth = AppAuthenticator::new(&config)?;
        Ok(Self { api, auth })
    }

    async fn token(&self) -> Result<String, CoreError> {
        self.auth.access_token(self.api.http()).await
    }

    /// A rejected token is dropped so the next request re-authenticates.
    async fn forget_rejected_token<T>(&self, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if let Err(CoreError::RedditApi(RedditApiError::InvalidToken)) = &result {
            warn!("Reddit rejected the access token; it will be refreshed");
            self.auth.invalidate().await;
        }
        result
    }
}

impl ContentSource for RedditClient {
    async fn list_posts(
        &self,
        community: &str,
        kind: ListingKind,
        limit: u32,
    ) -> Result<Vec<Post>, CoreError> {
        let token = self.token().await?;
        let result = self.api.get_listing(&token, community, kind, limit).await;
        self.forget_rejected_token(result).await
    }

    async fn list_comments(
        &self,
        post_id: &str,
        sort: CommentSort,
        limit: u32,
    ) -> Result<Vec<Comment>, CoreError> {
        let token = self.token().await?;
        let result = self.api.get_comments(&token, post_id, sort, limit).await;
        self.forget_rejected_token(result).await
    }
}
