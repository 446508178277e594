use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

pub type PostId = i64;
pub type CommentId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Community {
    pub name: String,
    pub title: String,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Author {
    pub name: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl Author {
    /// Display name when the author set one, account name otherwise.
    pub fn shown_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// A decoded RGBA8 bitmap.
#[derive(Clone, PartialEq, Eq)]
pub struct PostImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Arc<[u8]>,
}

impl fmt::Debug for PostImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostImage")
            .field("url", &self.url)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Values derived from a post after it is first seen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Enrichment {
    pub is_image_post: bool,
    /// External link to show; empty when the post URL is the image itself.
    pub link: String,
    pub preview: Option<PostImage>,
    pub community_icon: Option<PostImage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: Option<String>,
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub community: Community,
    pub author: Author,
    pub score: i64,
    pub comment_count: u32,
    pub published: DateTime<Utc>,
    pub enrichment: Enrichment,
}

impl Post {
    /// Minimal post with only the remote identity filled in.
    pub fn new(id: PostId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            body: None,
            url: None,
            thumbnail_url: None,
            community: Community::default(),
            author: Author::default(),
            score: 0,
            comment_count: 0,
            published: DateTime::<Utc>::UNIX_EPOCH,
            enrichment: Enrichment::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    /// Wire ancestry: `0.<ancestor ids>.<own id>`.
    pub path: String,
    pub score: i64,
    pub author: Author,
    pub content: String,
    pub published: DateTime<Utc>,
}

impl Comment {
    pub fn new(id: CommentId, post_id: PostId, path: impl Into<String>) -> Self {
        Self {
            id,
            post_id,
            path: path.into(),
            score: 0,
            author: Author::default(),
            content: String::new(),
            published: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}
