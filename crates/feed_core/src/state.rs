use std::collections::HashMap;

use feed_logging::{feed_debug, feed_info, feed_trace, feed_warn};

use crate::batches::AddedBatches;
use crate::effect::Operation;
use crate::ops::{OpKind, PendingOps};
use crate::view_model::{AppViewModel, PostRowView};
use crate::{
    Comment, CommentForest, Effect, FeedConfig, FeedError, ListingFilter, ListingQuery, OpToken,
    Post, PostId, SortOrder,
};

/// Comments requested per remote page.
pub const COMMENT_PAGE_SIZE: u32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentState {
    /// Seen in a response, derived data still being resolved.
    Pending,
    /// Committed to the store.
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KnownPost {
    pub(crate) post: Post,
    pub(crate) comments: CommentForest,
}

/// The feed store: every piece of state the reader keeps for a session.
///
/// Only [`crate::update`] mutates it; async work reports back through
/// [`crate::Msg`] values carrying the token they were issued.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    config: FeedConfig,
    known_posts: HashMap<PostId, KnownPost>,
    next_page: u64,
    pending: PendingOps,
    last_added: AddedBatches,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FeedConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> FeedConfig {
        self.config
    }

    /// Zero-based index of the next listing page to fetch.
    pub fn next_page(&self) -> u64 {
        self.next_page
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.known_posts.get(&id).map(|known| &known.post)
    }

    pub fn comments(&self, id: PostId) -> Option<&CommentForest> {
        self.known_posts.get(&id).map(|known| &known.comments)
    }

    pub fn known_post_count(&self) -> usize {
        self.known_posts.len()
    }

    pub fn enrichment_state(&self, id: PostId) -> Option<EnrichmentState> {
        if self.known_posts.contains_key(&id) {
            Some(EnrichmentState::Ready)
        } else if self.pending.contains_kind(OpKind::Post { id }) {
            Some(EnrichmentState::Pending)
        } else {
            None
        }
    }

    /// Labels of the operations currently in flight, sorted.
    pub fn pending_tokens(&self) -> Vec<String> {
        self.pending.labels()
    }

    /// Returns, and forgets, the ids of posts committed since the last call.
    ///
    /// A listing batch is only reported once none of its posts is still
    /// being enriched; earlier batches hold back later ones.
    pub fn consume_last_added_posts(&mut self) -> Vec<PostId> {
        self.last_added.consume_ready()
    }

    /// Empties the store and invalidates every outstanding operation.
    pub fn clear_store(&mut self) {
        feed_info!(
            "Clearing store: {} posts, {} pending operations dropped.",
            self.known_posts.len(),
            self.pending.labels().len()
        );
        self.known_posts.clear();
        self.next_page = 0;
        self.pending.clear();
        self.last_added.clear();
        self.dirty = true;
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            config: self.config,
            post_count: self.known_posts.len(),
            next_page: self.next_page,
            pending: self.pending.labels(),
            generation: self.pending.generation(),
            dirty: self.dirty,
        }
    }

    pub fn post_rows(&self, ids: &[PostId]) -> Vec<PostRowView> {
        ids.iter()
            .filter_map(|id| self.known_posts.get(id))
            .map(|known| PostRowView::from_post(&known.post, known.comments.len()))
            .collect()
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn retrieve_more_posts(&mut self) -> Vec<Effect> {
        let page = self.next_page;
        let operation = Operation::MorePosts { page };
        let token = if self.pending.any_listing() {
            None
        } else {
            self.pending.register(OpKind::List { page })
        };
        let Some(token) = token else {
            feed_warn!("Already retrieving posts, ignoring request for page {page}.");
            return vec![Effect::finished(
                operation,
                Err(FeedError::AlreadyInProgress(OpKind::List { page }.to_string())),
            )];
        };

        feed_info!("Retrieving posts from page {page}...");
        self.dirty = true;
        vec![Effect::FetchPosts {
            token,
            query: ListingQuery {
                sort: self.config.sort,
                filter: self.config.filter,
                page,
            },
        }]
    }

    pub(crate) fn posts_page_fetched(
        &mut self,
        token: OpToken,
        result: Result<Vec<Post>, FeedError>,
    ) -> Vec<Effect> {
        let OpKind::List { page } = token.kind() else {
            feed_warn!("Listing result delivered with token {token}, ignoring.");
            return Vec::new();
        };
        if let Err(stale) = self.pending.complete(token) {
            feed_debug!("{stale}; discarding page {page}.");
            return Vec::new();
        }
        self.dirty = true;

        match result {
            Ok(posts) => {
                feed_info!("Posts from page {page} retrieved: {} posts.", posts.len());
                self.next_page += 1;
                let mut effects = self.ingest(posts);
                effects.push(Effect::finished(Operation::MorePosts { page }, Ok(())));
                effects
            }
            Err(err) => {
                feed_warn!("Posts from page {page} failed: {err}");
                vec![Effect::finished(Operation::MorePosts { page }, Err(err))]
            }
        }
    }

    pub(crate) fn retrieve_post(&mut self, id: PostId) -> Vec<Effect> {
        let operation = Operation::Post { id };
        if self.known_posts.contains_key(&id) {
            feed_debug!("Post {id} already known, nothing to fetch.");
            return vec![Effect::finished(operation, Ok(()))];
        }
        match self.pending.register(OpKind::Detail { id }) {
            Some(token) => vec![Effect::FetchPost { token, id }],
            None => vec![Effect::finished(
                operation,
                Err(FeedError::AlreadyInProgress(OpKind::Detail { id }.to_string())),
            )],
        }
    }

    pub(crate) fn post_detail_fetched(
        &mut self,
        token: OpToken,
        result: Result<Post, FeedError>,
    ) -> Vec<Effect> {
        let OpKind::Detail { id } = token.kind() else {
            feed_warn!("Post detail delivered with token {token}, ignoring.");
            return Vec::new();
        };
        if let Err(stale) = self.pending.complete(token) {
            feed_debug!("{stale}; discarding post {id}.");
            return Vec::new();
        }

        match result {
            Ok(post) => {
                let mut effects = self.ingest(vec![post]);
                effects.push(Effect::finished(Operation::Post { id }, Ok(())));
                effects
            }
            Err(err) => {
                feed_warn!("Post {id} retrieval failed: {err}");
                vec![Effect::finished(Operation::Post { id }, Err(err))]
            }
        }
    }

    pub(crate) fn post_enriched(&mut self, token: OpToken, post: Post) -> Vec<Effect> {
        let OpKind::Post { id } = token.kind() else {
            feed_warn!("Enriched post delivered with token {token}, ignoring.");
            return Vec::new();
        };
        if self.pending.complete(token).is_err() {
            feed_debug!("Process for post {id} not needed anymore, skipping.");
            return Vec::new();
        }

        if self.known_posts.contains_key(&id) {
            feed_debug!("Post {id} was committed meanwhile, keeping existing entry.");
            self.last_added.mark_not_found(id);
        } else {
            self.known_posts.insert(
                id,
                KnownPost {
                    post,
                    comments: CommentForest::new(),
                },
            );
            self.last_added.mark_ready(id);
            feed_info!(
                "Added new post {id} to store with {} posts.",
                self.known_posts.len()
            );
        }
        self.dirty = true;

        if self.last_added.has_ready() {
            vec![Effect::PostsReady]
        } else {
            Vec::new()
        }
    }

    pub(crate) fn retrieve_comments(&mut self, post_id: PostId) -> Vec<Effect> {
        let operation = Operation::Comments { post_id };
        let Some(known) = self.known_posts.get(&post_id) else {
            feed_warn!("Comments requested for post {post_id}, which is not in the store.");
            return vec![Effect::finished(operation, Err(FeedError::UnknownPost(post_id)))];
        };

        let page_count = known.post.comment_count.div_ceil(COMMENT_PAGE_SIZE);
        if page_count == 0 {
            feed_debug!("Post {post_id} has no comments, nothing to fetch.");
            return vec![Effect::finished(operation, Ok(()))];
        }
        match self.pending.register(OpKind::Comments { post_id }) {
            Some(token) => {
                feed_info!("Retrieving {page_count} comment pages for post {post_id}...");
                vec![Effect::FetchComments {
                    token,
                    post_id,
                    page_count,
                    page_size: COMMENT_PAGE_SIZE,
                }]
            }
            None => vec![Effect::finished(
                operation,
                Err(FeedError::AlreadyInProgress(
                    OpKind::Comments { post_id }.to_string(),
                )),
            )],
        }
    }

    pub(crate) fn comments_fetched(
        &mut self,
        token: OpToken,
        result: Result<Vec<Comment>, FeedError>,
    ) -> Vec<Effect> {
        let OpKind::Comments { post_id } = token.kind() else {
            feed_warn!("Comments delivered with token {token}, ignoring.");
            return Vec::new();
        };
        let operation = Operation::Comments { post_id };
        // A comment token only disappears when the store is cleared, which
        // also removed the post it was fetched for.
        if let Err(stale) = self.pending.complete(token) {
            feed_debug!("{stale}; post {post_id} left the store.");
            return vec![Effect::finished(operation, Err(FeedError::UnknownPost(post_id)))];
        }

        let comments = match result {
            Ok(comments) => comments,
            Err(err) => {
                feed_warn!("Comments for post {post_id} failed: {err}");
                return vec![Effect::finished(operation, Err(err))];
            }
        };
        let Some(known) = self.known_posts.get_mut(&post_id) else {
            feed_warn!("Post {post_id} couldn't be found in the store.");
            return vec![Effect::finished(operation, Err(FeedError::UnknownPost(post_id)))];
        };

        let report = known.comments.insert_batch(comments);
        if !report.anomalies.is_empty() {
            feed_warn!(
                "Post {post_id}: {} comments dropped while building the tree.",
                report.anomalies.len()
            );
        }
        self.dirty = true;
        vec![Effect::finished(operation, Ok(()))]
    }

    pub(crate) fn set_sort_order(&mut self, sort: SortOrder) -> Vec<Effect> {
        if self.config.sort == sort {
            return Vec::new();
        }
        self.config.sort = sort;
        self.restart_listing()
    }

    pub(crate) fn set_listing_filter(&mut self, filter: ListingFilter) -> Vec<Effect> {
        if self.config.filter == filter {
            return Vec::new();
        }
        self.config.filter = filter;
        self.restart_listing()
    }

    fn restart_listing(&mut self) -> Vec<Effect> {
        self.clear_store();
        let mut effects = vec![Effect::SaveConfig(self.config)];
        effects.extend(self.retrieve_more_posts());
        effects
    }

    /// Registers enrichment for every post not already known or in flight,
    /// recording one batch slot per incoming post.
    fn ingest(&mut self, posts: Vec<Post>) -> Vec<Effect> {
        feed_debug!("Adding {} posts to the store.", posts.len());
        let mut effects = Vec::with_capacity(posts.len());
        let mut slots = Vec::with_capacity(posts.len());

        for post in posts {
            let id = post.id;
            if self.known_posts.contains_key(&id) {
                feed_trace!("Post {id} already known, skipping.");
                slots.push(None);
                continue;
            }
            match self.pending.register(OpKind::Post { id }) {
                Some(token) => {
                    slots.push(Some(id));
                    effects.push(Effect::EnrichPost {
                        token,
                        post: Box::new(post),
                    });
                }
                None => {
                    feed_trace!("Post {id} already being enriched, skipping.");
                    slots.push(None);
                }
            }
        }

        let mut batch = self.last_added.open_batch();
        for slot in slots {
            match slot {
                Some(id) => batch.pending(id),
                None => batch.settled(),
            }
        }
        effects
    }
}
