//! Per-post enrichment: classify the link, resolve the preview image,
//! resolve the community icon. Steps run in that order on one post.

use std::sync::Arc;
use std::time::Instant;

use feed_core::{Post, PostId, PostImage};
use feed_logging::{elapsed_ms, feed_debug, feed_warn};
use futures_util::FutureExt;

use crate::fetch::primary_mime_type;
use crate::task_chain::{Flow, TaskChain};
use crate::{FetchError, ImageCache, ResourceFetcher};

enum Derived {
    Classified { is_image: bool },
    Image(Option<PostImage>),
}

type StepResult = Result<Derived, FetchError>;

pub struct PostEnricher {
    fetcher: Arc<dyn ResourceFetcher>,
    images: Arc<ImageCache>,
}

impl PostEnricher {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, images: Arc<ImageCache>) -> Self {
        Self { fetcher, images }
    }

    /// Fills `post.enrichment`. Step failures are logged and leave the
    /// corresponding field at its default, so a post always comes back.
    pub async fn enrich(&self, post: Post) -> Post {
        let started = Instant::now();
        let id = post.id;
        let mut chain: TaskChain<'_, Post, StepResult> = TaskChain::new();

        let fetcher = self.fetcher.clone();
        chain.add(
            move |post: &Post| classify(fetcher, post.url.clone()).boxed(),
            |post, result| {
                let is_image = matches!(
                    absorb(post.id, "classify", result),
                    Some(Derived::Classified { is_image: true })
                );
                post.enrichment.is_image_post = is_image;
                post.enrichment.link = if is_image {
                    String::new()
                } else {
                    post.url.clone().unwrap_or_default()
                };
                Flow::Continue
            },
        );

        let images = self.images.clone();
        chain.add(
            move |post: &Post| {
                let target = if post.enrichment.is_image_post {
                    post.url.clone()
                } else {
                    post.thumbnail_url.clone()
                };
                fetch_image(images, target)
            },
            |post, result| {
                post.enrichment.preview = image_of(absorb(post.id, "preview", result));
                Flow::Continue
            },
        );

        let images = self.images.clone();
        chain.add(
            move |post: &Post| fetch_image(images, post.community.icon_url.clone()),
            |post, result| {
                post.enrichment.community_icon =
                    image_of(absorb(post.id, "community icon", result));
                Flow::Continue
            },
        );

        let (post, _) = chain.execute(post).await;
        feed_debug!("Enriched post {} in {}ms", id, elapsed_ms(started));
        post
    }
}

async fn classify(fetcher: Arc<dyn ResourceFetcher>, url: Option<String>) -> StepResult {
    let Some(url) = url else {
        return Ok(Derived::Classified { is_image: false });
    };
    let content_type = fetcher.content_type(&url).await?;
    Ok(Derived::Classified {
        is_image: content_type.is_some_and(|value| primary_mime_type(&value) == "image"),
    })
}

fn fetch_image(
    images: Arc<ImageCache>,
    url: Option<String>,
) -> futures_util::future::BoxFuture<'static, StepResult> {
    async move {
        match url.filter(|u| !u.trim().is_empty()) {
            Some(url) => images.fetch(&url).await.map(|img| Derived::Image(Some(img))),
            None => Ok(Derived::Image(None)),
        }
    }
    .boxed()
}

fn absorb(post_id: PostId, step: &str, result: StepResult) -> Option<Derived> {
    match result {
        Ok(derived) => Some(derived),
        Err(err) => {
            feed_warn!("Post {}: {} step failed: {}", post_id, step, err);
            None
        }
    }
}

fn image_of(derived: Option<Derived>) -> Option<PostImage> {
    match derived {
        Some(Derived::Image(image)) => image,
        _ => None,
    }
}
