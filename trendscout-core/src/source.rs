use crate::error::CoreError;
use crate::types::{Comment, CommentSort, ListingKind, Post};

/// Read access to a community feed.
///
/// Implementations report inaccessible or missing communities as errors; the
/// caller decides whether that skips the community.
pub trait ContentSource {
    async fn list_posts(
        &self,
        community: &str,
        kind: ListingKind,
        limit: u32,
    ) -> Result<Vec<Post>, CoreError>;

    async fn list_comments(
        &self,
        post_id: &str,
        sort: CommentSort,
        limit: u32,
    ) -> Result<Vec<Comment>, CoreError>;
}
