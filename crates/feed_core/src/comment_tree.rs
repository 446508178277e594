//! Reconstruction of a post's comment forest from path-addressed comments.
//!
//! Comments arrive flat and in any order, each carrying its ancestry as a
//! dotted path (`0.<ancestor ids>.<own id>`). Paths are parsed once into id
//! sequences; nodes live in an arena owned by [`CommentForest`] and refer
//! to their children by index, so every node has exactly one owner.

use std::collections::HashMap;
use std::fmt;

use feed_logging::{feed_debug, feed_trace, feed_warn};

use crate::{Comment, CommentId};

const ROOT_MARKER: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,
    #[error("path does not start with the root marker")]
    MissingRootMarker,
    #[error("path has no comment segment")]
    NoSegments,
    #[error("segment '{0}' is not a comment id")]
    BadSegment(String),
}

/// Parsed comment ancestry, root marker excluded, own id last.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentPath {
    ids: Vec<CommentId>,
}

impl CommentPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        let mut segments = raw.split('.');
        if segments.next() != Some(ROOT_MARKER) {
            return Err(PathError::MissingRootMarker);
        }
        let ids = segments
            .map(|segment| {
                segment
                    .parse::<CommentId>()
                    .map_err(|_| PathError::BadSegment(segment.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if ids.is_empty() {
            return Err(PathError::NoSegments);
        }
        Ok(Self { ids })
    }

    pub fn ids(&self) -> &[CommentId] {
        &self.ids
    }

    /// Number of comment segments; root-level comments have depth 1.
    pub fn depth(&self) -> usize {
        self.ids.len()
    }

    pub fn own_id(&self) -> CommentId {
        self.ids[self.ids.len() - 1]
    }

    /// Ancestor ids, empty for a root-level comment.
    pub fn parent(&self) -> &[CommentId] {
        &self.ids[..self.ids.len() - 1]
    }
}

impl fmt::Display for CommentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROOT_MARKER)?;
        for id in &self.ids {
            write!(f, ".{id}")?;
        }
        Ok(())
    }
}

/// A comment that could not be placed in the forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// The parent path is neither in the batch nor already attached.
    Orphaned { comment_id: CommentId, parent: String },
    MalformedPath {
        comment_id: CommentId,
        path: String,
        error: PathError,
    },
    /// The path's last segment is not the comment's own id.
    MismatchedId { comment_id: CommentId, path: String },
}

impl Anomaly {
    pub fn comment_id(&self) -> CommentId {
        match self {
            Anomaly::Orphaned { comment_id, .. }
            | Anomaly::MalformedPath { comment_id, .. }
            | Anomaly::MismatchedId { comment_id, .. } => *comment_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildReport {
    /// Roots added by this batch, in processing order.
    pub new_roots: Vec<CommentId>,
    /// Nodes added by this batch, roots included.
    pub attached: usize,
    /// Comments skipped because their id was already in the forest.
    pub already_known: usize,
    pub anomalies: Vec<Anomaly>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    comment: Comment,
    path: CommentPath,
    children: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentForest {
    nodes: Vec<Node>,
    roots: Vec<usize>,
    index: HashMap<CommentId, usize>,
}

impl CommentForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fresh forest from one batch.
    pub fn build(comments: Vec<Comment>) -> (Self, BuildReport) {
        let mut forest = Self::new();
        let report = forest.insert_batch(comments);
        (forest, report)
    }

    /// Adds a batch of flat comments to the forest.
    ///
    /// Parents are always processed before their children regardless of
    /// arrival order. Re-ingesting ids that are already present is a no-op
    /// for those ids.
    pub fn insert_batch(&mut self, comments: Vec<Comment>) -> BuildReport {
        let mut report = BuildReport::default();

        let mut parsed = Vec::with_capacity(comments.len());
        for comment in comments {
            match CommentPath::parse(&comment.path) {
                Ok(path) if path.own_id() == comment.id => parsed.push((path, comment)),
                Ok(_) => {
                    feed_warn!(
                        "Comment {} has path {} ending in another id, dropping.",
                        comment.id,
                        comment.path
                    );
                    report.anomalies.push(Anomaly::MismatchedId {
                        comment_id: comment.id,
                        path: comment.path,
                    });
                }
                Err(error) => {
                    feed_warn!(
                        "Comment {} has malformed path '{}': {}",
                        comment.id,
                        comment.path,
                        error
                    );
                    report.anomalies.push(Anomaly::MalformedPath {
                        comment_id: comment.id,
                        path: comment.path,
                        error,
                    });
                }
            }
        }
        parsed.sort_by_key(|(path, _)| path.depth());

        for (path, comment) in parsed {
            if self.index.contains_key(&comment.id) {
                feed_trace!("Comment {} already known, skipping.", comment.id);
                report.already_known += 1;
                continue;
            }

            let parent_idx = match path.parent().last() {
                None => None,
                Some(parent_id) => match self.index.get(parent_id) {
                    Some(&idx) if self.nodes[idx].path.ids() == path.parent() => Some(idx),
                    _ => {
                        let parent = parent_path_label(path.parent());
                        feed_warn!(
                            "Couldn't find parent {} of comment {}, dropping.",
                            parent,
                            comment.id
                        );
                        report.anomalies.push(Anomaly::Orphaned {
                            comment_id: comment.id,
                            parent,
                        });
                        continue;
                    }
                },
            };

            let idx = self.nodes.len();
            let id = comment.id;
            self.nodes.push(Node {
                comment,
                path,
                children: Vec::new(),
            });
            self.index.insert(id, idx);
            match parent_idx {
                Some(parent) => self.nodes[parent].children.push(idx),
                None => {
                    self.roots.push(idx);
                    report.new_roots.push(id);
                }
            }
            report.attached += 1;
        }

        feed_debug!(
            "Comment batch: {} attached ({} roots), {} known, {} dropped.",
            report.attached,
            report.new_roots.len(),
            report.already_known,
            report.anomalies.len()
        );
        report
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: CommentId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: CommentId) -> Option<CommentNode<'_>> {
        self.index.get(&id).map(|&idx| CommentNode { forest: self, idx })
    }

    pub fn roots(&self) -> impl Iterator<Item = CommentNode<'_>> + '_ {
        self.roots
            .iter()
            .map(move |&idx| CommentNode { forest: self, idx })
    }

    /// Depth-first walk yielding each node with its nesting level.
    pub fn walk(&self) -> Vec<(usize, CommentNode<'_>)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&i| (0, i)).collect();
        while let Some((level, idx)) = stack.pop() {
            out.push((level, CommentNode { forest: self, idx }));
            for &child in self.nodes[idx].children.iter().rev() {
                stack.push((level + 1, child));
            }
        }
        out
    }
}

/// Borrowed view of one node of a [`CommentForest`].
#[derive(Clone, Copy)]
pub struct CommentNode<'a> {
    forest: &'a CommentForest,
    idx: usize,
}

impl<'a> CommentNode<'a> {
    pub fn comment(&self) -> &'a Comment {
        &self.forest.nodes[self.idx].comment
    }

    pub fn path(&self) -> &'a CommentPath {
        &self.forest.nodes[self.idx].path
    }

    pub fn children(&self) -> impl Iterator<Item = CommentNode<'a>> + 'a {
        let forest = self.forest;
        forest.nodes[self.idx]
            .children
            .iter()
            .map(move |&idx| CommentNode { forest, idx })
    }

    pub fn child_count(&self) -> usize {
        self.forest.nodes[self.idx].children.len()
    }
}

impl fmt::Debug for CommentNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommentNode")
            .field("id", &self.comment().id)
            .field("children", &self.child_count())
            .finish()
    }
}

fn parent_path_label(ids: &[CommentId]) -> String {
    let mut label = String::from(ROOT_MARKER);
    for id in ids {
        label.push('.');
        label.push_str(&id.to_string());
    }
    label
}
