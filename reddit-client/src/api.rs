use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use trendscout_core::{Comment, CommentSort, CoreError, ListingKind, Post, RedditApiError};

const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    pub subreddit: String,
    pub permalink: String,
    pub created_utc: f64,
    pub score: i64,
    pub num_comments: u32,
    #[serde(default)]
    pub stickied: bool,
}

/// Comment listings mix `t1` comments with `more` stubs; every field
/// defaults so both shapes deserialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedditCommentData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub score: i64,
}

/// `/comments/{id}` answers with the post listing followed by the comment
/// listing.
pub type CommentsResponse = (
    RedditListing<serde_json::Value>,
    RedditListing<RedditCommentData>,
);

pub const COMMENT_KIND: &str = "t1";

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    user_agent: String,
    base_url: String,
}

impl RedditApiClient {
    pub fn new(user_agent: String) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            user_agent,
            base_url: REDDIT_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn http(&self) -> &Client {
        &self.http_client
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Sends an authorized request. `not_found` is returned for a 404 so
    /// callers can name the missing resource.
    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: &[(&str, &str)],
        not_found: RedditApiError,
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!("Making Reddit API request: {} {}", method, endpoint);
        let response = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .query(query_params)
            .send()
            .await
            .map_err(|e| {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    CoreError::RedditApi(RedditApiError::RequestTimeout)
                } else {
                    CoreError::Network(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok())
            .map(|secs| secs.ceil() as u64);

        Err(status_error(status, endpoint, retry_after, not_found))
    }

    pub async fn get_listing(
        &self,
        access_token: &str,
        subreddit: &str,
        kind: ListingKind,
        limit: u32,
    ) -> Result<Vec<Post>, CoreError> {
        let endpoint = format!("/r/{}/{}", subreddit, kind.as_str());
        let limit = limit.to_string();
        let params = [("limit", limit.as_str()), ("raw_json", "1")];

        let response = self
            .make_request(
                Method::GET,
                &endpoint,
                access_token,
                &params,
                RedditApiError::SubredditNotFound {
                    subreddit: subreddit.to_string(),
                },
            )
            .await?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit posts: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse {} posts for r/{}", kind, subreddit),
            })
        })?;

        let posts = listing_posts(listing)?;
        info!(
            community = subreddit,
            listing = %kind,
            "Retrieved {} posts",
            posts.len()
        );
        Ok(posts)
    }

    pub async fn get_comments(
        &self,
        access_token: &str,
        post_id: &str,
        sort: CommentSort,
        limit: u32,
    ) -> Result<Vec<Comment>, CoreError> {
        let endpoint = format!("/comments/{}", post_id);
        let limit = limit.to_string();
        let params = [
            ("sort", sort.as_str()),
            ("limit", limit.as_str()),
            ("depth", "1"),
            ("raw_json", "1"),
        ];

        let response = self
            .make_request(
                Method::GET,
                &endpoint,
                access_token,
                &params,
                RedditApiError::PostNotFound {
                    post_id: post_id.to_string(),
                },
            )
            .await?;

        let (_, comments): CommentsResponse = response.json().await.map_err(|e| {
            error!("Failed to parse comments: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse comments for {}", post_id),
            })
        })?;

        let comments = listing_comments(comments);
        debug!(post_id, "Retrieved {} comments", comments.len());
        Ok(comments)
    }
}

fn status_error(
    status: StatusCode,
    endpoint: &str,
    retry_after: Option<u64>,
    not_found: RedditApiError,
) -> CoreError {
    let error = match status.as_u16() {
        429 => {
            let retry_after = retry_after.unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        401 => RedditApiError::InvalidToken,
        403 => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        404 => not_found,
        code if status.is_server_error() => RedditApiError::ServerError { status_code: code },
        code => {
            return CoreError::RequestFailed {
                message: format!("Unexpected status for {}", endpoint),
                status_code: Some(code),
            }
        }
    };
    CoreError::RedditApi(error)
}

fn created_at(created_utc: f64) -> Result<DateTime<Utc>, CoreError> {
    let secs = created_utc.trunc() as i64;
    let nanos = (created_utc.fract() * 1e9) as u32;
    Utc.timestamp_opt(secs, nanos).single().ok_or_else(|| {
        CoreError::RedditApi(RedditApiError::InvalidResponse {
            details: format!("Invalid created_utc {}", created_utc),
        })
    })
}

impl TryFrom<RedditPostData> for Post {
    type Error = CoreError;

    fn try_from(post_data: RedditPostData) -> Result<Self, Self::Error> {
        Ok(Self {
            created_at: created_at(post_data.created_utc)?,
            id: post_data.id,
            title: post_data.title,
            score: post_data.score,
            comment_count: post_data.num_comments,
            community: post_data.subreddit,
            permalink: post_data.permalink,
        })
    }
}

/// Pinned moderator posts are skipped; they are not organic traffic.
pub fn listing_posts(listing: RedditListing<RedditPostData>) -> Result<Vec<Post>, CoreError> {
    listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .filter(|data| !data.stickied)
        .map(Post::try_from)
        .collect()
}

pub fn listing_comments(listing: RedditListing<RedditCommentData>) -> Vec<Comment> {
    listing
        .data
        .children
        .into_iter()
        .filter(|child| child.kind == COMMENT_KIND)
        .map(|child| Comment::new(child.data.body, child.data.score))
        .collect()
}
