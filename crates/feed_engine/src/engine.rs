use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use feed_core::{Comment, ListingQuery, OpToken, Post, PostId};
use feed_logging::{feed_debug, feed_info, feed_warn};
use tokio_util::sync::CancellationToken;

use crate::fetch::{FetchSettings, ReqwestFetcher, ResourceFetcher};
use crate::{EngineEvent, FeedClient, FetchError, ImageCache, LemmyClient, PostEnricher};

/// Where the engine talks to and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub instance_url: String,
    pub auth_token: Option<String>,
    pub fetch: FetchSettings,
}

enum EngineCommand {
    FetchPosts {
        token: OpToken,
        query: ListingQuery,
    },
    FetchPost {
        token: OpToken,
        id: PostId,
    },
    FetchComments {
        token: OpToken,
        post_id: PostId,
        page_count: u32,
        page_size: u32,
    },
    EnrichPost {
        token: OpToken,
        post: Box<Post>,
    },
}

struct Services {
    feed: Arc<dyn FeedClient>,
    enricher: PostEnricher,
}

/// Sending half of the engine. Cheap to clone.
#[derive(Clone)]
pub struct EngineCommands {
    cmd_tx: mpsc::Sender<EngineCommand>,
    cancel: CancellationToken,
}

impl EngineCommands {
    pub fn fetch_posts(&self, token: OpToken, query: ListingQuery) {
        self.send(EngineCommand::FetchPosts { token, query });
    }

    pub fn fetch_post(&self, token: OpToken, id: PostId) {
        self.send(EngineCommand::FetchPost { token, id });
    }

    /// Requests pages `page_count..=1`, highest first.
    pub fn fetch_comments(
        &self,
        token: OpToken,
        post_id: PostId,
        page_count: u32,
        page_size: u32,
    ) {
        self.send(EngineCommand::FetchComments {
            token,
            post_id,
            page_count,
            page_size,
        });
    }

    pub fn enrich_post(&self, token: OpToken, post: Box<Post>) {
        self.send(EngineCommand::EnrichPost { token, post });
    }

    /// Aborts in-flight work. Aborted commands report nothing.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn send(&self, command: EngineCommand) {
        if self.cancel.is_cancelled() {
            return;
        }
        let _ = self.cmd_tx.send(command);
    }
}

/// Receiving half of the engine.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineEvents {
    /// Blocks until the next event; `None` once the engine is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

pub struct EngineHandle {
    commands: EngineCommands,
    events: EngineEvents,
}

impl EngineHandle {
    /// The auth token only goes to the instance. Post links, thumbnails
    /// and community icons are fetched without it.
    pub fn new(config: EngineConfig) -> Result<Self, FetchError> {
        let instance_fetcher =
            ReqwestFetcher::new(config.fetch.clone()).with_bearer_token(config.auth_token);
        let feed = LemmyClient::new(&config.instance_url, Arc::new(instance_fetcher))?;
        let public_fetcher: Arc<dyn ResourceFetcher> = Arc::new(ReqwestFetcher::new(config.fetch));
        feed_info!("Engine talking to {}", config.instance_url);
        Ok(Self::with_services(Arc::new(feed), public_fetcher))
    }

    /// Starts the worker thread over the given feed client. `fetcher` serves
    /// enrichment requests to arbitrary hosts and must not carry credentials.
    pub fn with_services(feed: Arc<dyn FeedClient>, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let images = Arc::new(ImageCache::new(fetcher.clone()));
        let services = Arc::new(Services {
            feed,
            enricher: PostEnricher::new(fetcher, images),
        });

        let worker_cancel = cancel.clone();
        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let services = services.clone();
                let event_tx = event_tx.clone();
                let cancel = worker_cancel.clone();
                runtime.spawn(async move {
                    tokio::select! {
                        _ = cancel.cancelled() => feed_debug!("Engine command cancelled"),
                        _ = handle_command(&services, command, &event_tx) => {}
                    }
                });
            }
            runtime.shutdown_background();
        });

        Self {
            commands: EngineCommands { cmd_tx, cancel },
            events: EngineEvents { event_rx },
        }
    }

    pub fn commands(&self) -> &EngineCommands {
        &self.commands
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.events.event_rx.recv_timeout(timeout).ok()
    }

    pub fn shutdown(&self) {
        self.commands.shutdown();
    }

    /// Splits the handle so events can be pumped on another thread.
    pub fn into_parts(self) -> (EngineCommands, EngineEvents) {
        (self.commands, self.events)
    }
}

async fn handle_command(
    services: &Services,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::FetchPosts { token, query } => {
            feed_info!(
                "Listing page {} ({} / {})",
                query.page,
                query.sort,
                query.filter
            );
            let result = services.feed.list_posts(query).await;
            match &result {
                Ok(posts) => feed_debug!("{}: {} posts", token, posts.len()),
                Err(err) => feed_warn!("{}: {}", token, err),
            }
            EngineEvent::PostsFetched { token, result }
        }
        EngineCommand::FetchPost { token, id } => {
            let result = services.feed.get_post(id).await;
            if let Err(err) = &result {
                feed_warn!("{}: {}", token, err);
            }
            EngineEvent::PostFetched { token, result }
        }
        EngineCommand::FetchComments {
            token,
            post_id,
            page_count,
            page_size,
        } => {
            let result =
                fetch_comment_pages(services.feed.as_ref(), post_id, page_count, page_size).await;
            if let Err(err) = &result {
                feed_warn!("{}: {}", token, err);
            }
            EngineEvent::CommentsFetched { token, result }
        }
        EngineCommand::EnrichPost { token, post } => {
            let post = services.enricher.enrich(*post).await;
            EngineEvent::PostEnriched {
                token,
                post: Box::new(post),
            }
        }
    };
    let _ = event_tx.send(event);
}

async fn fetch_comment_pages(
    feed: &dyn FeedClient,
    post_id: PostId,
    page_count: u32,
    page_size: u32,
) -> Result<Vec<Comment>, FetchError> {
    let mut comments = Vec::new();
    for page in (1..=page_count).rev() {
        let batch = feed.list_comments(post_id, page, page_size).await?;
        feed_debug!("Post {} comment page {}: {}", post_id, page, batch.len());
        comments.extend(batch);
    }
    Ok(comments)
}
