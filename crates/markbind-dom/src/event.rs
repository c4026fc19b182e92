#![forbid(unsafe_code)]

//! Events and listener identity.
//!
//! A [`Listener`] is a reference-counted callable. Registrations are matched
//! by the address of the shared allocation, never by behaviour: two closures
//! with identical bodies are different listeners, and a clone of the same
//! `Rc` is the same listener. Callers that need to unsubscribe must keep the
//! exact `Listener` they registered.

use std::rc::Rc;

use crate::{Document, NodeId};

/// Shared event callback. It receives the document so it may read or mutate
/// the tree while handling the event.
pub type Listener = Rc<dyn Fn(&mut Document, &Event)>;

/// Wrap a closure as a [`Listener`].
pub fn listener(callback: impl Fn(&mut Document, &Event) + 'static) -> Listener {
    Rc::new(callback)
}

/// Identity comparison on the data pointer only. Comparing the fat pointer
/// would also compare vtables, which may be duplicated across codegen units.
pub(crate) fn same_listener(a: &Listener, b: &Listener) -> bool {
    std::ptr::eq(Rc::as_ptr(a).cast::<()>(), Rc::as_ptr(b).cast::<()>())
}

pub(crate) struct RegisteredListener {
    pub(crate) id: u64,
    pub(crate) event_type: String,
    pub(crate) listener: Listener,
}

/// A dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    event_type: String,
    bubbles: bool,
    target: Option<NodeId>,
    current_target: Option<NodeId>,
}

impl Event {
    /// A non-bubbling event of the given type.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            bubbles: false,
            target: None,
            current_target: None,
        }
    }

    #[must_use]
    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    #[must_use]
    pub const fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// The node the event was dispatched at. `None` before dispatch.
    #[must_use]
    pub const fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// The node whose listeners are currently running.
    #[must_use]
    pub const fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    pub(crate) fn set_target(&mut self, target: NodeId) {
        self.target = Some(target);
        self.current_target = Some(target);
    }

    pub(crate) fn set_current_target(&mut self, node: NodeId) {
        self.current_target = Some(node);
    }
}
