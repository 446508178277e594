use crate::{FeedConfig, FeedError, ListingQuery, OpToken, Post, PostId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Request one listing page from the remote service.
    FetchPosts { token: OpToken, query: ListingQuery },
    /// Request the full detail of one post.
    FetchPost { token: OpToken, id: PostId },
    /// Run the enrichment pipeline for a newly seen post.
    EnrichPost { token: OpToken, post: Box<Post> },
    /// Request `page_count` comment pages, highest page first.
    FetchComments {
        token: OpToken,
        post_id: PostId,
        page_count: u32,
        page_size: u32,
    },
    /// New posts may be available through `consume_last_added_posts`.
    PostsReady,
    /// Persist the feed configuration.
    SaveConfig(FeedConfig),
    /// Outcome of a caller-visible operation.
    OperationFinished {
        operation: Operation,
        result: Result<(), FeedError>,
    },
}

/// Caller-visible operations whose outcome is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    MorePosts { page: u64 },
    Post { id: PostId },
    Comments { post_id: PostId },
}

impl Effect {
    pub(crate) fn finished(operation: Operation, result: Result<(), FeedError>) -> Self {
        Effect::OperationFinished { operation, result }
    }
}
