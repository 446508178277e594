//! [`FeedClient`] over the Lemmy v3 HTTP API.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use feed_core::{Author, Comment, Community, Enrichment, ListingQuery, Post, PostId};
use feed_logging::{feed_debug, feed_warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::{FailureKind, FeedClient, FetchError, ResourceFetcher};

pub struct LemmyClient {
    base: Url,
    fetcher: Arc<dyn ResourceFetcher>,
}

impl LemmyClient {
    pub fn new(instance_url: &str, fetcher: Arc<dyn ResourceFetcher>) -> Result<Self, FetchError> {
        let mut base = Url::parse(instance_url.trim())
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base, fetcher })
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, FetchError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        feed_debug!("GET {}", url);
        let output = self.fetcher.fetch(url.as_str()).await?;
        serde_json::from_slice(&output.bytes)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl FeedClient for LemmyClient {
    async fn list_posts(&self, query: ListingQuery) -> Result<Vec<Post>, FetchError> {
        let url = self.endpoint(
            "api/v3/post/list",
            &[
                ("type_", query.filter.as_str().to_string()),
                ("sort", query.sort.as_str().to_string()),
                ("page", (query.page + 1).to_string()),
            ],
        )?;
        let response: PostListResponse = self.get_json(url).await?;
        Ok(response.posts.into_iter().map(PostView::into_post).collect())
    }

    async fn get_post(&self, id: PostId) -> Result<Post, FetchError> {
        let url = self.endpoint("api/v3/post", &[("id", id.to_string())])?;
        let response: GetPostResponse = self.get_json(url).await?;
        Ok(response.post_view.into_post())
    }

    async fn list_comments(
        &self,
        post_id: PostId,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Comment>, FetchError> {
        let url = self.endpoint(
            "api/v3/comment/list",
            &[
                ("post_id", post_id.to_string()),
                ("limit", page_size.to_string()),
                ("page", page.to_string()),
            ],
        )?;
        let response: CommentListResponse = self.get_json(url).await?;
        Ok(response
            .comments
            .into_iter()
            .map(CommentView::into_comment)
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct PostListResponse {
    posts: Vec<PostView>,
}

#[derive(Debug, Deserialize)]
struct GetPostResponse {
    post_view: PostView,
}

#[derive(Debug, Deserialize)]
struct CommentListResponse {
    comments: Vec<CommentView>,
}

#[derive(Debug, Deserialize)]
struct PostView {
    post: WirePost,
    creator: WirePerson,
    community: WireCommunity,
    counts: PostCounts,
}

#[derive(Debug, Deserialize)]
struct WirePost {
    id: i64,
    name: String,
    body: Option<String>,
    url: Option<String>,
    thumbnail_url: Option<String>,
    #[serde(deserialize_with = "published_timestamp")]
    published: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct WirePerson {
    name: String,
    display_name: Option<String>,
    avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireCommunity {
    name: String,
    title: String,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostCounts {
    #[serde(default)]
    score: i64,
    #[serde(default)]
    comments: i64,
}

#[derive(Debug, Deserialize)]
struct CommentView {
    comment: WireComment,
    creator: WirePerson,
    counts: CommentCounts,
}

#[derive(Debug, Deserialize)]
struct WireComment {
    id: i64,
    post_id: i64,
    path: String,
    content: String,
    #[serde(deserialize_with = "published_timestamp")]
    published: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct CommentCounts {
    #[serde(default)]
    score: i64,
}

impl PostView {
    fn into_post(self) -> Post {
        Post {
            id: self.post.id,
            title: self.post.name,
            body: non_empty(self.post.body),
            url: non_empty(self.post.url),
            thumbnail_url: non_empty(self.post.thumbnail_url),
            community: Community {
                name: self.community.name,
                title: self.community.title,
                icon_url: non_empty(self.community.icon),
            },
            author: self.creator.into_author(),
            score: self.counts.score,
            comment_count: u32::try_from(self.counts.comments.max(0)).unwrap_or(u32::MAX),
            published: self.post.published,
            enrichment: Enrichment::default(),
        }
    }
}

impl CommentView {
    fn into_comment(self) -> Comment {
        Comment {
            id: self.comment.id,
            post_id: self.comment.post_id,
            path: self.comment.path,
            score: self.counts.score,
            author: self.creator.into_author(),
            content: self.comment.content,
            published: self.comment.published,
        }
    }
}

impl WirePerson {
    fn into_author(self) -> Author {
        Author {
            name: self.name,
            display_name: non_empty(self.display_name),
            avatar_url: non_empty(self.avatar),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accepts RFC 3339 and the zone-less form older instances send.
fn published_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_timestamp(&raw).unwrap_or_else(|| {
        feed_warn!("Unparseable timestamp '{}', using epoch.", raw);
        DateTime::<Utc>::UNIX_EPOCH
    }))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
