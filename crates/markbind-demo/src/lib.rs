#![forbid(unsafe_code)]

//! Counter page used by the `markbind-demo` binary.
//!
//! The page holds a `#root` element with two counter fragments and a
//! `reset` button. The reset button carries a raw listener (not a controller
//! action) that removes itself, empties `#root`, and asks the host to
//! rebuild the page on its next turn.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use markbind::prelude::*;
use markbind::{Listener, listener, outer_markup};

/// Controller class name used by the page markup.
pub const COUNTER_CLASS: &str = "counter";

const TEMPLATE: &str = r#"
  <div data-controller="counter">
    <button type="button" data-action="click->counter#increment">
      Increment Count
    </button>
    <p data-counter-target="display"></p>
  </div>

  <div data-controller="counter">
    <button type="button" data-action="click->counter#increment">
      Increment Count
    </button>
    <p data-counter-target="display"></p>
  </div>
"#;

/// Counts clicks and renders the count into its `display` target.
#[derive(Debug)]
pub struct Counter {
    node: NodeId,
    count: u32,
    display: Option<NodeId>,
}

impl Counter {
    #[must_use]
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            count: 0,
            display: None,
        }
    }

    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    fn refresh_display(&self, doc: &mut Document) {
        if let Some(display) = self.display {
            if let Err(err) = doc.set_text_content(display, &self.count.to_string()) {
                tracing::warn!(error = %err, "display not updated");
            }
        }
    }

    fn increment(&mut self, doc: &mut Document, _event: &Event) {
        self.count += 1;
        tracing::debug!(node = self.node.index(), count = self.count, "increment");
        self.refresh_display(doc);
    }
}

impl Controller for Counter {
    fn targets() -> &'static [&'static str] {
        &["display"]
    }

    fn action(name: &str) -> Option<ActionFn<Self>> {
        match name {
            "increment" => Some(Self::increment),
            _ => None,
        }
    }

    fn node(&self) -> NodeId {
        self.node
    }

    fn connect(&mut self, doc: &mut Document) {
        tracing::info!(node = self.node.index(), "connected");
        if let Err(err) = doc.set_attribute(self.node, "style", "background-color: red") {
            tracing::warn!(error = %err, "style not applied");
        }
        self.refresh_display(doc);
    }

    fn disconnect(&mut self, _doc: &mut Document) {
        tracing::info!(node = self.node.index(), count = self.count, "disconnected");
    }

    fn target_slot(&mut self, name: &str) -> Option<&mut Option<NodeId>> {
        match name {
            "display" => Some(&mut self.display),
            _ => None,
        }
    }
}

/// The demo document, its binder, and the host's pending-rebuild flag.
pub struct Page {
    doc: Document,
    binder: Binder,
    root: NodeId,
    rebuild_requested: Rc<Cell<bool>>,
}

impl Page {
    /// Build the document, start the binder on `#root`, and request the
    /// first build. Nothing is bound until [`Page::run_pending`].
    pub fn new() -> Result<Self> {
        let mut doc = Document::new();
        let root = doc.create_element("div");
        doc.set_attribute(root, "id", "root")?;
        let body = doc.body();
        doc.append_child(body, root)?;

        let mut binder = Binder::new(&mut doc, root)?;
        binder.register(COUNTER_CLASS, Counter::new)?;

        let mut page = Self {
            doc,
            binder,
            root,
            rebuild_requested: Rc::new(Cell::new(false)),
        };
        page.reset()?;
        Ok(page)
    }

    /// Empty `#root` and request a rebuild on the next host turn.
    pub fn reset(&mut self) -> Result<()> {
        clear(&mut self.doc, self.root, &self.rebuild_requested)?;
        Ok(())
    }

    /// One host turn: deliver pending mutations, run a requested rebuild,
    /// then deliver again. Returns the number of records processed.
    pub fn run_pending(&mut self) -> Result<usize> {
        let mut processed = self.binder.settle(&mut self.doc);
        if self.rebuild_requested.replace(false) {
            self.populate()?;
            processed += self.binder.settle(&mut self.doc);
        }
        Ok(processed)
    }

    fn populate(&mut self) -> Result<()> {
        let wrapper = self.doc.create_element("div");
        self.doc.set_inner_markup(wrapper, TEMPLATE)?;
        self.doc.append_child(self.root, wrapper)?;

        let button = self.doc.create_element("button");
        self.doc.set_text_content(button, "reset")?;
        let reset = reset_listener(button, self.root, Rc::clone(&self.rebuild_requested));
        self.doc.add_event_listener(button, "click", reset)?;
        self.doc.append_child(self.root, button)?;
        tracing::debug!(root = self.root.index(), "page populated");
        Ok(())
    }

    /// Dispatch a click at `node`.
    pub fn click(&mut self, node: NodeId) -> Result<usize> {
        Ok(self.doc.dispatch_event(node, Event::new("click"))?)
    }

    /// Increment buttons of the current counters, in document order.
    #[must_use]
    pub fn counter_buttons(&self) -> Vec<NodeId> {
        self.doc.query_attribute(self.root, "data-action")
    }

    /// The current reset button, if the page is built.
    #[must_use]
    pub fn reset_button(&self) -> Option<NodeId> {
        self.doc.children(self.root).last().copied()
    }

    /// Rendered text of every counter display, in document order.
    #[must_use]
    pub fn displays(&self) -> Vec<String> {
        self.doc
            .query_attribute(self.root, "data-counter-target")
            .into_iter()
            .map(|p| self.doc.text_content(p))
            .collect()
    }

    #[must_use]
    pub fn markup(&self) -> String {
        outer_markup(&self.doc, self.root)
    }

    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    #[must_use]
    pub const fn binder(&self) -> &Binder {
        &self.binder
    }
}

fn clear(doc: &mut Document, root: NodeId, rebuild: &Cell<bool>) -> markbind::dom::Result<()> {
    doc.replace_children(root, &[])?;
    rebuild.set(true);
    Ok(())
}

/// A listener that unregisters itself from `button` before resetting.
fn reset_listener(button: NodeId, root: NodeId, rebuild: Rc<Cell<bool>>) -> Listener {
    let own: Rc<Cell<Option<Weak<dyn Fn(&mut Document, &Event)>>>> = Rc::default();
    let handle = Rc::clone(&own);
    let reset = listener(move |doc: &mut Document, _event: &Event| {
        if let Some(me) = handle.take().and_then(|weak| weak.upgrade()) {
            let _ = doc.remove_event_listener(button, "click", &me);
        }
        if let Err(err) = clear(doc, root, &rebuild) {
            tracing::warn!(error = %err, "reset failed");
        }
    });
    own.set(Some(Rc::downgrade(&reset)));
    reset
}
