#![forbid(unsafe_code)]

//! The controller contract.
//!
//! A controller is a behaviour object bound to one element, its root node.
//! The binder never knows a controller's concrete type. It reaches the
//! controller through three lookups the type provides:
//!
//! - [`Controller::targets`]: the target names the class wants assigned.
//! - [`Controller::action`]: name to callable, resolved when actions are
//!   bound. A name that resolves to nothing is skipped.
//! - [`Controller::target_slot`]: name to the `<name>Target` slot. A missing
//!   slot is skipped.
//!
//! Instances live behind `Rc<RefCell<_>>`. Listeners hold a weak handle, so
//! an action firing after its instance was dropped does nothing.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use markbind_dom::{Document, Event, Listener, NodeId, listener};
use tracing::warn;

/// An action method: runs with the controller as receiver.
pub type ActionFn<C> = fn(&mut C, &mut Document, &Event);

/// Behaviour bound to a marked element.
///
/// # Example
///
/// ```
/// use markbind_dom::{Document, Event, NodeId};
/// use markbind_runtime::{ActionFn, Controller};
///
/// struct Counter {
///     node: NodeId,
///     count: u32,
///     display: Option<NodeId>,
/// }
///
/// impl Counter {
///     fn increment(&mut self, doc: &mut Document, _event: &Event) {
///         self.count += 1;
///         if let Some(display) = self.display {
///             let _ = doc.set_text_content(display, &self.count.to_string());
///         }
///     }
/// }
///
/// impl Controller for Counter {
///     fn targets() -> &'static [&'static str] {
///         &["display"]
///     }
///
///     fn action(name: &str) -> Option<ActionFn<Self>> {
///         match name {
///             "increment" => Some(Self::increment),
///             _ => None,
///         }
///     }
///
///     fn node(&self) -> NodeId {
///         self.node
///     }
///
///     fn target_slot(&mut self, name: &str) -> Option<&mut Option<NodeId>> {
///         match name {
///             "display" => Some(&mut self.display),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Controller: 'static {
    /// Target names this class declares. Order is irrelevant.
    fn targets() -> &'static [&'static str] {
        &[]
    }

    /// Resolve an action method by name.
    fn action(name: &str) -> Option<ActionFn<Self>>
    where
        Self: Sized,
    {
        let _ = name;
        None
    }

    /// The root element this instance is bound to.
    fn node(&self) -> NodeId;

    /// Called once, after actions are bound and targets assigned.
    fn connect(&mut self, doc: &mut Document) {
        let _ = doc;
    }

    /// Called once, before actions are unbound and the instance is dropped.
    fn disconnect(&mut self, doc: &mut Document) {
        let _ = doc;
    }

    /// The slot for target `name`, or `None` if this class has no such slot.
    fn target_slot(&mut self, name: &str) -> Option<&mut Option<NodeId>> {
        let _ = name;
        None
    }
}

/// Type-erased view of a live controller, used by the instance table.
pub(crate) trait LiveController {
    fn node(&self) -> NodeId;
    fn connect(&self, doc: &mut Document);
    fn disconnect(&self, doc: &mut Document);
    /// A fresh listener invoking `method` on this instance, or `None` when
    /// the class has no such action.
    fn bind_action(&self, method: &str) -> Option<Listener>;
    /// Store `element` in the `name` slot. `false` when the slot is missing.
    fn assign_target(&self, name: &str, element: NodeId) -> bool;
    fn handle(&self) -> Rc<dyn Any>;
}

struct Bound<C: Controller> {
    class: Rc<str>,
    inner: Rc<RefCell<C>>,
}

impl<C: Controller> LiveController for Bound<C> {
    fn node(&self) -> NodeId {
        self.inner.borrow().node()
    }

    fn connect(&self, doc: &mut Document) {
        match self.inner.try_borrow_mut() {
            Ok(mut controller) => controller.connect(doc),
            Err(_) => warn!(class = %self.class, "controller busy, connect skipped"),
        }
    }

    fn disconnect(&self, doc: &mut Document) {
        match self.inner.try_borrow_mut() {
            Ok(mut controller) => controller.disconnect(doc),
            Err(_) => warn!(class = %self.class, "controller busy, disconnect skipped"),
        }
    }

    fn bind_action(&self, method: &str) -> Option<Listener> {
        let action = C::action(method)?;
        let receiver: Weak<RefCell<C>> = Rc::downgrade(&self.inner);
        let class = Rc::clone(&self.class);
        let method: Rc<str> = Rc::from(method);
        Some(listener(move |doc: &mut Document, event: &Event| {
            let Some(inner) = receiver.upgrade() else {
                return;
            };
            let Ok(mut controller) = inner.try_borrow_mut() else {
                warn!(
                    class = %class,
                    method = %method,
                    event_type = event.event_type(),
                    "re-entrant action skipped"
                );
                return;
            };
            action(&mut *controller, doc, event);
        }))
    }

    fn assign_target(&self, name: &str, element: NodeId) -> bool {
        let Ok(mut controller) = self.inner.try_borrow_mut() else {
            return false;
        };
        match controller.target_slot(name) {
            Some(slot) => {
                *slot = Some(element);
                true
            }
            None => false,
        }
    }

    fn handle(&self) -> Rc<dyn Any> {
        let any: Rc<dyn Any> = self.inner.clone();
        any
    }
}

/// Registered factory for one controller class.
pub(crate) struct Constructor {
    targets: &'static [&'static str],
    build: Box<dyn Fn(Rc<str>, NodeId) -> Box<dyn LiveController>>,
}

impl Constructor {
    pub(crate) fn new<C, F>(factory: F) -> Self
    where
        C: Controller,
        F: Fn(NodeId) -> C + 'static,
    {
        Self {
            targets: C::targets(),
            build: Box::new(move |class: Rc<str>, node: NodeId| -> Box<dyn LiveController> {
                Box::new(Bound {
                    class,
                    inner: Rc::new(RefCell::new(factory(node))),
                })
            }),
        }
    }

    pub(crate) fn targets(&self) -> &'static [&'static str] {
        self.targets
    }

    /// Build an instance bound to `node`.
    pub(crate) fn construct(&self, class: &str, node: NodeId) -> Box<dyn LiveController> {
        (self.build)(Rc::from(class), node)
    }
}
