#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

use feed_core::{Comment, ListingQuery, Post, PostId};
use feed_engine::{
    FailureKind, FeedClient, FetchError, FetchMetadata, FetchOutput, ResourceFetcher,
};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(feed_logging::initialize_for_tests);
}

/// Encodes a solid `width` x `height` PNG.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 255]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn not_found(url: &str) -> FetchError {
    FetchError::new(FailureKind::HttpStatus(404), format!("{url} not found"))
}

/// In-memory fetcher that counts requests per URL.
#[derive(Default)]
pub struct FakeFetcher {
    heads: HashMap<String, String>,
    bodies: HashMap<String, Vec<u8>>,
    head_calls: AtomicUsize,
    get_calls: Mutex<HashMap<String, usize>>,
    delay: Option<Duration>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `bytes` on GET and `content_type` on HEAD.
    pub fn serve(mut self, url: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        self.heads.insert(url.to_string(), content_type.to_string());
        self.bodies.insert(url.to_string(), bytes);
        self
    }

    /// Holds every GET for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn gets(&self, url: &str) -> usize {
        self.get_calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn heads(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ResourceFetcher for FakeFetcher {
    async fn content_type(&self, url: &str) -> Result<Option<String>, FetchError> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        self.heads
            .get(url)
            .cloned()
            .map(Some)
            .ok_or_else(|| not_found(url))
    }

    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        *self
            .get_calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let bytes = self.bodies.get(url).cloned().ok_or_else(|| not_found(url))?;
        Ok(FetchOutput {
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url: url.to_string(),
                redirect_count: 0,
                content_type: self.heads.get(url).cloned(),
                byte_len: bytes.len() as u64,
            },
            bytes,
        })
    }
}

/// Feed client answering from fixed data and recording comment pages asked for.
#[derive(Default)]
pub struct FakeFeed {
    pub posts: Vec<Post>,
    pub comment_pages: HashMap<u32, Vec<Comment>>,
    pub failing_page: Option<u32>,
    pub pages_requested: Mutex<Vec<u32>>,
}

#[async_trait::async_trait]
impl FeedClient for FakeFeed {
    async fn list_posts(&self, _query: ListingQuery) -> Result<Vec<Post>, FetchError> {
        Ok(self.posts.clone())
    }

    async fn get_post(&self, id: PostId) -> Result<Post, FetchError> {
        self.posts
            .iter()
            .find(|post| post.id == id)
            .cloned()
            .ok_or_else(|| not_found(&format!("post {id}")))
    }

    async fn list_comments(
        &self,
        _post_id: PostId,
        page: u32,
        _page_size: u32,
    ) -> Result<Vec<Comment>, FetchError> {
        self.pages_requested.lock().unwrap().push(page);
        if self.failing_page == Some(page) {
            return Err(FetchError::new(FailureKind::Network, "connection reset"));
        }
        Ok(self.comment_pages.get(&page).cloned().unwrap_or_default())
    }
}
