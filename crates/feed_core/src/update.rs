use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RetrieveMorePosts => state.retrieve_more_posts(),
        Msg::RetrievePost { id } => state.retrieve_post(id),
        Msg::RetrieveComments { post_id } => state.retrieve_comments(post_id),
        Msg::ClearStore => {
            state.clear_store();
            Vec::new()
        }
        Msg::SetSortOrder(sort) => state.set_sort_order(sort),
        Msg::SetListingFilter(filter) => state.set_listing_filter(filter),
        Msg::PostsPageFetched { token, result } => state.posts_page_fetched(token, result),
        Msg::PostDetailFetched { token, result } => state.post_detail_fetched(token, result),
        Msg::PostEnriched { token, post } => state.post_enriched(token, *post),
        Msg::CommentsFetched { token, result } => state.comments_fetched(token, result),
    };

    (state, effects)
}
