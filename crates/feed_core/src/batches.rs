use std::collections::VecDeque;

use crate::PostId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Enrichment still running.
    Pending(PostId),
    /// Committed, waiting to be consumed.
    Ready(PostId),
    /// Nothing to report for this position (already known, duplicate, stale).
    Settled,
}

/// Arrival-ordered record of ingested listing batches.
///
/// A batch becomes visible only once none of its slots is pending, and
/// batches are released strictly in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct AddedBatches {
    batches: VecDeque<Vec<Slot>>,
}

impl AddedBatches {
    pub(crate) fn open_batch(&mut self) -> BatchWriter<'_> {
        self.batches.push_back(Vec::new());
        let last = self.batches.len() - 1;
        BatchWriter {
            slots: &mut self.batches[last],
        }
    }

    /// Marks the pending slot for `id` ready. Returns false if none exists.
    pub(crate) fn mark_ready(&mut self, id: PostId) -> bool {
        self.replace_pending(id, Slot::Ready(id))
    }

    /// Settles the pending slot for `id` without reporting it.
    pub(crate) fn mark_not_found(&mut self, id: PostId) -> bool {
        self.replace_pending(id, Slot::Settled)
    }

    fn replace_pending(&mut self, id: PostId, next: Slot) -> bool {
        for batch in self.batches.iter_mut() {
            if let Some(slot) = batch.iter_mut().find(|slot| **slot == Slot::Pending(id)) {
                *slot = next;
                return true;
            }
        }
        false
    }

    /// Drains every fully settled batch at the front, in order.
    pub(crate) fn consume_ready(&mut self) -> Vec<PostId> {
        let mut ready = Vec::new();
        while let Some(front) = self.batches.front() {
            if front.iter().any(|slot| matches!(slot, Slot::Pending(_))) {
                break;
            }
            if let Some(batch) = self.batches.pop_front() {
                ready.extend(batch.into_iter().filter_map(|slot| match slot {
                    Slot::Ready(id) => Some(id),
                    _ => None,
                }));
            }
        }
        ready
    }

    pub(crate) fn has_ready(&self) -> bool {
        self.batches
            .iter()
            .any(|batch| batch.iter().any(|slot| matches!(slot, Slot::Ready(_))))
    }

    pub(crate) fn clear(&mut self) {
        self.batches.clear();
    }
}

pub(crate) struct BatchWriter<'a> {
    slots: &'a mut Vec<Slot>,
}

impl BatchWriter<'_> {
    pub(crate) fn pending(&mut self, id: PostId) {
        self.slots.push(Slot::Pending(id));
    }

    pub(crate) fn settled(&mut self) {
        self.slots.push(Slot::Settled);
    }
}
