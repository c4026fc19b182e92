#![forbid(unsafe_code)]

//! `markbind-dom` is a small, host-driven element tree.
//!
//! It stands in for the browser DOM so the binder in `markbind-runtime` can
//! be driven deterministically:
//! - **Arena nodes**: every node lives in a [`Document`] and is addressed by a
//!   copyable [`NodeId`]. Removed nodes stay addressable, the way a script can
//!   keep a reference to a detached element.
//! - **childList observation**: [`Document::observe`] registers a subtree
//!   observer. Structural changes are queued as [`MutationRecord`]s and handed
//!   out in batches by [`Document::take_records`]; the host decides when a
//!   batch is delivered.
//! - **Events**: listeners are shared callables compared by identity, so a
//!   caller that keeps the exact [`Listener`] it added can always remove it.
//!
//! Attribute changes are never recorded. Observers only see nodes being
//! added and removed.

mod document;
pub mod event;
pub mod markup;
pub mod observer;

use core::fmt;

pub use document::{Document, NodeKind};
pub use event::{Event, Listener, listener};
pub use observer::{MutationRecord, ObserverId};

/// Handle to a node owned by a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors raised by tree operations and markup parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The handle does not belong to this document.
    UnknownNode(NodeId),
    /// An element was required (text nodes carry no attributes or children).
    NotAnElement(NodeId),
    /// `child` is not a child of `parent`.
    NotAChild { parent: NodeId, child: NodeId },
    /// The insertion would make a node its own ancestor.
    HierarchyRequest { parent: NodeId, child: NodeId },
    /// Markup could not be parsed.
    Markup { offset: usize, reason: &'static str },
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(node) => write!(f, "unknown node {node}"),
            Self::NotAnElement(node) => write!(f, "node {node} is not an element"),
            Self::NotAChild { parent, child } => {
                write!(f, "node {child} is not a child of {parent}")
            }
            Self::HierarchyRequest { parent, child } => {
                write!(f, "cannot insert {child} under its own descendant {parent}")
            }
            Self::Markup { offset, reason } => {
                write!(f, "malformed markup at byte {offset}: {reason}")
            }
        }
    }
}

impl std::error::Error for DomError {}

/// Result alias for tree operations.
pub type Result<T> = std::result::Result<T, DomError>;
