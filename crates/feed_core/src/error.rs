use thiserror::Error;

use crate::{OpToken, PostId};

/// Failures reported back to whoever asked for an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// Network or decoding failure; the same operation may be retried.
    #[error("transport error: {0}")]
    Transport(String),
    /// Rejected because the same logical operation is still in flight.
    #[error("{0} is already in progress")]
    AlreadyInProgress(String),
    /// The post is not (or no longer) in the store.
    #[error("post {0} is not in the store")]
    UnknownPost(PostId),
}

/// A finished async result whose token is no longer registered.
///
/// Only used inside the store; stale results are dropped, never reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("operation {0} is no longer wanted")]
pub(crate) struct StaleOperation(pub(crate) OpToken);
