//! Feed engine: remote client, enrichment pipeline and effect execution.
mod client;
mod engine;
mod enrich;
mod fetch;
mod image_cache;
mod lemmy;
mod persist;
pub mod task_chain;
mod types;

pub use client::FeedClient;
pub use engine::{EngineCommands, EngineConfig, EngineEvents, EngineHandle};
pub use enrich::PostEnricher;
pub use fetch::{primary_mime_type, FetchSettings, ReqwestFetcher, ResourceFetcher};
pub use image_cache::{decode_image, ImageCache};
pub use lemmy::LemmyClient;
pub use persist::{AtomicFileWriter, PersistError};
pub use types::{EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput};
