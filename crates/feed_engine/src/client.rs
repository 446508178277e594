use feed_core::{Comment, ListingQuery, Post, PostId};

use crate::FetchError;

/// Remote side of the feed: listings, post detail and comment pages.
#[async_trait::async_trait]
pub trait FeedClient: Send + Sync {
    async fn list_posts(&self, query: ListingQuery) -> Result<Vec<Post>, FetchError>;

    async fn get_post(&self, id: PostId) -> Result<Post, FetchError>;

    /// `page` follows the remote convention and starts at 1.
    async fn list_comments(
        &self,
        post_id: PostId,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Comment>, FetchError>;
}
