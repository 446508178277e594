use chrono::{DateTime, Utc};

use crate::{FeedConfig, Post, PostId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub config: FeedConfig,
    pub post_count: usize,
    pub next_page: u64,
    /// Labels of in-flight operations, e.g. `list:3`.
    pub pending: Vec<String>,
    pub generation: u64,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRowView {
    pub id: PostId,
    pub title: String,
    pub community: String,
    pub author: String,
    pub score: i64,
    pub comment_count: u32,
    pub attached_comments: usize,
    pub published: DateTime<Utc>,
    pub is_image_post: bool,
    pub link: String,
    pub has_preview: bool,
    pub has_community_icon: bool,
}

impl PostRowView {
    pub(crate) fn from_post(post: &Post, attached_comments: usize) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            community: post.community.name.clone(),
            author: post.author.shown_name().to_string(),
            score: post.score,
            comment_count: post.comment_count,
            attached_comments,
            published: post.published,
            is_image_post: post.enrichment.is_image_post,
            link: post.enrichment.link.clone(),
            has_preview: post.enrichment.preview.is_some(),
            has_community_icon: post.enrichment.community_icon.is_some(),
        }
    }
}
