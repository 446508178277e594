use crate::{Comment, FeedError, ListingFilter, OpToken, Post, PostId, SortOrder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Fetch the next listing page.
    RetrieveMorePosts,
    /// Fetch one post's detail and add it to the store.
    RetrievePost { id: PostId },
    /// Fetch and attach every comment of a known post.
    RetrieveComments { post_id: PostId },
    /// Drop everything and restart from page 0.
    ClearStore,
    /// User picked another sort order.
    SetSortOrder(SortOrder),
    /// User picked another listing filter.
    SetListingFilter(ListingFilter),
    /// Engine completion for a listing page.
    PostsPageFetched {
        token: OpToken,
        result: Result<Vec<Post>, FeedError>,
    },
    /// Engine completion for a post detail request.
    PostDetailFetched {
        token: OpToken,
        result: Result<Post, FeedError>,
    },
    /// Engine completion for a post enrichment. Never fails.
    PostEnriched { token: OpToken, post: Box<Post> },
    /// Engine completion for all comment pages of a post.
    CommentsFetched {
        token: OpToken,
        result: Result<Vec<Comment>, FeedError>,
    },
}
