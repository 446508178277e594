#![allow(dead_code)]

use std::sync::Once;

use feed_core::{update, AppState, Comment, Effect, Msg, OpToken, Post, PostId};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(feed_logging::initialize_for_tests);
}

pub fn post(id: PostId, comment_count: u32) -> Post {
    let mut post = Post::new(id, format!("Post {id}"));
    post.comment_count = comment_count;
    post
}

pub fn comment(id: i64, path: &str) -> Comment {
    Comment::new(id, 1, path)
}

/// Token of the single `FetchPosts` effect, with the page it asked for.
pub fn fetch_posts_token(effects: &[Effect]) -> (OpToken, u64) {
    let found: Vec<_> = effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::FetchPosts { token, query } => Some((*token, query.page)),
            _ => None,
        })
        .collect();
    assert_eq!(found.len(), 1, "expected one FetchPosts in {effects:?}");
    found[0]
}

/// Enrichment requests in emission order.
pub fn enrich_requests(effects: &[Effect]) -> Vec<(OpToken, Post)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::EnrichPost { token, post } => Some((*token, post.as_ref().clone())),
            _ => None,
        })
        .collect()
}

/// Requests a page and answers it with `posts`, returning the enrichment requests.
pub fn load_page(state: AppState, posts: Vec<Post>) -> (AppState, Vec<(OpToken, Post)>) {
    let (state, effects) = update(state, Msg::RetrieveMorePosts);
    let (token, _) = fetch_posts_token(&effects);
    let (state, effects) = update(
        state,
        Msg::PostsPageFetched {
            token,
            result: Ok(posts),
        },
    );
    (state, enrich_requests(&effects))
}

pub fn finish_enrichment(state: AppState, token: OpToken, post: Post) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::PostEnriched {
            token,
            post: Box::new(post),
        },
    )
}

/// Loads `posts` as one page and completes all their enrichments.
pub fn store_with_posts(posts: Vec<Post>) -> AppState {
    let (mut state, requests) = load_page(AppState::new(), posts);
    for (token, post) in requests {
        state = finish_enrichment(state, token, post).0;
    }
    state.consume_last_added_posts();
    state
}
