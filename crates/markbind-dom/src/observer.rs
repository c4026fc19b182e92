#![forbid(unsafe_code)]

//! Subtree `childList` observers.
//!
//! An observer watches one root. Every insertion or removal whose parent is
//! the root or one of its descendants *at the time of the change* appends a
//! [`MutationRecord`] to the observer's queue. Nothing is delivered
//! automatically: the host drains the queue with [`Document::take_records`],
//! which plays the role of the browser's microtask delivery. Records keep
//! the order in which the changes happened.

use crate::{Document, DomError, NodeId, Result};

/// Handle to an observer registered with [`Document::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);

/// One structural change to the children of `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// The parent whose child list changed.
    pub target: NodeId,
    /// Inserted nodes, in insertion order.
    pub added_nodes: Vec<NodeId>,
    /// Removed nodes, in their former order.
    pub removed_nodes: Vec<NodeId>,
}

pub(crate) struct ObserverSlot {
    root: NodeId,
    active: bool,
    queue: Vec<MutationRecord>,
}

impl Document {
    /// Start observing the subtree rooted at `root`.
    pub fn observe(&mut self, root: NodeId) -> Result<ObserverId> {
        if !self.contains(root) {
            return Err(DomError::UnknownNode(root));
        }
        let id = ObserverId(self.observers.len());
        self.observers.push(ObserverSlot {
            root,
            active: true,
            queue: Vec::new(),
        });
        Ok(id)
    }

    /// Drain every record queued for `observer`, oldest first.
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .get_mut(observer.0)
            .map(|slot| std::mem::take(&mut slot.queue))
            .unwrap_or_default()
    }

    /// Number of undelivered records for `observer`.
    #[must_use]
    pub fn pending_records(&self, observer: ObserverId) -> usize {
        self.observers.get(observer.0).map_or(0, |slot| slot.queue.len())
    }

    /// Whether `observer` is still recording.
    #[must_use]
    pub fn is_observing(&self, observer: ObserverId) -> bool {
        self.observers.get(observer.0).is_some_and(|slot| slot.active)
    }

    /// Stop recording for `observer` and drop its pending records.
    pub fn disconnect_observer(&mut self, observer: ObserverId) {
        if let Some(slot) = self.observers.get_mut(observer.0) {
            slot.active = false;
            slot.queue.clear();
        }
    }

    pub(crate) fn record(
        &mut self,
        target: NodeId,
        added_nodes: Vec<NodeId>,
        removed_nodes: Vec<NodeId>,
    ) {
        let interested: Vec<usize> = self
            .observers
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active && self.is_inclusive_ancestor(slot.root, target))
            .map(|(index, _)| index)
            .collect();
        if interested.is_empty() {
            return;
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target_node = target.index(),
            added = added_nodes.len(),
            removed = removed_nodes.len(),
            observers = interested.len(),
            "mutation recorded"
        );

        let record = MutationRecord {
            target,
            added_nodes,
            removed_nodes,
        };
        for index in interested {
            self.observers[index].queue.push(record.clone());
        }
    }
}
