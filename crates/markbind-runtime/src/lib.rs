#![forbid(unsafe_code)]

//! markbind runtime
//!
//! Wires plain markup to controller objects. A host marks elements with
//! three attributes:
//!
//! | Attribute | Value | Meaning |
//! |---|---|---|
//! | `data-controller` | `<class>` | Root of one controller instance. |
//! | `data-action` | `<event>-><class>#<method>` | Event to method binding. |
//! | `data-<class>-target` | `<target>` | Named element reference. |
//!
//! The [`Binder`] observes a root element. When marked elements appear it
//! builds the registered [`Controller`], binds its actions, assigns its
//! targets, and calls `connect`. When they disappear it calls `disconnect`
//! and unbinds everything it bound.
//!
//! # Example
//!
//! ```
//! use markbind_dom::{Document, Event, NodeId};
//! use markbind_runtime::{ActionFn, Binder, Controller};
//!
//! struct Hello {
//!     node: NodeId,
//!     output: Option<NodeId>,
//! }
//!
//! impl Hello {
//!     fn greet(&mut self, doc: &mut Document, _event: &Event) {
//!         if let Some(output) = self.output {
//!             let _ = doc.set_text_content(output, "Hello!");
//!         }
//!     }
//! }
//!
//! impl Controller for Hello {
//!     fn targets() -> &'static [&'static str] {
//!         &["output"]
//!     }
//!     fn action(name: &str) -> Option<ActionFn<Self>> {
//!         (name == "greet").then_some(Self::greet as ActionFn<Self>)
//!     }
//!     fn node(&self) -> NodeId {
//!         self.node
//!     }
//!     fn target_slot(&mut self, name: &str) -> Option<&mut Option<NodeId>> {
//!         (name == "output").then_some(&mut self.output)
//!     }
//! }
//!
//! let mut doc = Document::new();
//! let root = doc.body();
//! let mut binder = Binder::new(&mut doc, root).unwrap();
//! binder
//!     .register("hello", |node| Hello { node, output: None })
//!     .unwrap();
//!
//! doc.set_inner_markup(
//!     root,
//!     r#"<div data-controller="hello">
//!          <button data-action="click->hello#greet"></button>
//!          <span data-hello-target="output"></span>
//!        </div>"#,
//! )
//! .unwrap();
//! binder.flush(&mut doc);
//!
//! let button = doc.first_by_tag(root, "button").unwrap();
//! doc.dispatch_event(button, Event::new("click")).unwrap();
//! let span = doc.first_by_tag(root, "span").unwrap();
//! assert_eq!(doc.text_content(span), "Hello!");
//! ```

pub mod action;
pub mod binder;
pub mod config;
pub mod controller;
pub mod error;
mod registry;

pub use action::ActionDescriptor;
pub use binder::Binder;
pub use config::{BinderConfig, ConfigError};
pub use controller::{ActionFn, Controller};
pub use error::BinderError;
