//! Feed core: post store, comment tree reconstruction and the pure update
//! state machine driving them.
mod batches;
mod comment_tree;
mod config;
mod effect;
mod error;
mod model;
mod msg;
mod ops;
mod state;
mod update;
mod view_model;

pub use comment_tree::{Anomaly, BuildReport, CommentForest, CommentNode, CommentPath, PathError};
pub use config::{FeedConfig, ListingFilter, ListingQuery, ParseConfigError, SortOrder};
pub use effect::{Effect, Operation};
pub use error::FeedError;
pub use model::{Author, Comment, CommentId, Community, Enrichment, Post, PostId, PostImage};
pub use msg::Msg;
pub use ops::{OpKind, OpToken};
pub use state::{AppState, EnrichmentState, COMMENT_PAGE_SIZE};
pub use update::update;
pub use view_model::{AppViewModel, PostRowView};
