use std::collections::HashSet;
use std::fmt;

use crate::error::StaleOperation;
use crate::PostId;

/// The logical unit of work a token stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Fetch of listing page `page` (zero-based cursor value).
    List { page: u64 },
    /// Enrichment of a post seen in a listing or detail response.
    Post { id: PostId },
    /// Fetch of a single post's detail.
    Detail { id: PostId },
    /// Fetch of every comment page of a post.
    Comments { post_id: PostId },
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::List { page } => write!(f, "list:{page}"),
            OpKind::Post { id } => write!(f, "post:{id}"),
            OpKind::Detail { id } => write!(f, "detail:{id}"),
            OpKind::Comments { post_id } => write!(f, "comments:{post_id}"),
        }
    }
}

/// Opaque handle for one in-flight operation.
///
/// Carries the store generation it was issued under, so a token issued
/// before a store clear never matches one issued after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpToken {
    generation: u64,
    kind: OpKind,
}

impl OpToken {
    pub fn kind(&self) -> OpKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for OpToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct PendingOps {
    generation: u64,
    tokens: HashSet<OpToken>,
}

impl PendingOps {
    /// Registers `kind` unless an operation of that kind is already in flight.
    pub(crate) fn register(&mut self, kind: OpKind) -> Option<OpToken> {
        let token = OpToken {
            generation: self.generation,
            kind,
        };
        self.tokens.insert(token).then_some(token)
    }

    pub(crate) fn contains_kind(&self, kind: OpKind) -> bool {
        self.tokens.contains(&OpToken {
            generation: self.generation,
            kind,
        })
    }

    pub(crate) fn any_listing(&self) -> bool {
        self.tokens
            .iter()
            .any(|token| matches!(token.kind, OpKind::List { .. }))
    }

    /// Unregisters `token`; fails when it was already dropped by a clear.
    pub(crate) fn complete(&mut self, token: OpToken) -> Result<(), StaleOperation> {
        if self.tokens.remove(&token) {
            Ok(())
        } else {
            Err(StaleOperation(token))
        }
    }

    /// Forgets every token and starts a new generation.
    pub(crate) fn clear(&mut self) {
        self.tokens.clear();
        self.generation += 1;
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.tokens.iter().map(|t| t.kind.to_string()).collect();
        labels.sort();
        labels
    }
}
