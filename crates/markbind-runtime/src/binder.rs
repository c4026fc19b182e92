#![forbid(unsafe_code)]

//! Mutation-driven controller binder.
//!
//! # Lifecycle
//!
//! Each `(class, root node)` pair moves through
//! `absent -> attached -> hydrated (connect fired) -> dehydrating (disconnect
//! fired) -> absent`. Both ends are idempotent: attaching a tracked pair or
//! detaching an untracked one does nothing.
//!
//! # Delivery
//!
//! The binder observes its root from construction on, but nothing existing at
//! that moment is scanned. Changes queue up in the document and are handled
//! when the host calls [`Binder::flush`] (one batch) or [`Binder::settle`]
//! (until quiet). Processing is synchronous and never interleaves with
//! another batch. Changes made by `connect`, `disconnect`, or action
//! listeners land in the next batch rather than recursing.
//!
//! # Listener identity
//!
//! Every listener registered during hydrate is stored on its instance, keyed
//! by `(element, event, method)`. Dehydrate removes those exact listeners, so
//! unbinding cannot miss. Bindings on elements that left the subtree since
//! hydrate are removed too.

use std::cell::RefCell;
use std::rc::Rc;

use markbind_dom::{Document, MutationRecord, NodeId, ObserverId};
use tracing::{debug, debug_span, trace, warn};

use crate::action::ActionDescriptor;
use crate::config::BinderConfig;
use crate::controller::{Constructor, Controller};
use crate::error::BinderError;
use crate::registry::{BindingKey, Instance, InstanceTable, Registry};

/// Binds controllers to marked elements under one observed root.
pub struct Binder {
    root: NodeId,
    observer: ObserverId,
    config: BinderConfig,
    registry: Registry,
    instances: InstanceTable,
}

impl std::fmt::Debug for Binder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binder")
            .field("root", &self.root)
            .field("observer", &self.observer)
            .field("classes", &self.registry.classes())
            .field("instances", &self.instances.total())
            .finish_non_exhaustive()
    }
}

impl Binder {
    /// Start observing `root` with the default attribute schema.
    pub fn new(doc: &mut Document, root: NodeId) -> Result<Self, BinderError> {
        Self::with_config(doc, root, BinderConfig::default())
    }

    /// Start observing `root` with a custom attribute schema.
    pub fn with_config(
        doc: &mut Document,
        root: NodeId,
        config: BinderConfig,
    ) -> Result<Self, BinderError> {
        let problems = config.validate();
        if !problems.is_empty() {
            return Err(BinderError::InvalidConfig(problems));
        }
        let observer = doc.observe(root)?;
        debug!(root = root.index(), "binder observing");
        Ok(Self {
            root,
            observer,
            config,
            registry: Registry::default(),
            instances: InstanceTable::default(),
        })
    }

    /// Register a controller class.
    ///
    /// `factory` builds an instance for a marked element. Fails if `class`
    /// is already registered; the registry is left unchanged.
    pub fn register<C, F>(&mut self, class: &str, factory: F) -> Result<(), BinderError>
    where
        C: Controller,
        F: Fn(NodeId) -> C + 'static,
    {
        self.registry.insert(class, Constructor::new(factory))?;
        debug!(class = %class, targets = ?C::targets(), "controller registered");
        Ok(())
    }

    #[must_use]
    pub fn is_registered(&self, class: &str) -> bool {
        self.registry.contains(class)
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub const fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Live instances of `class`.
    #[must_use]
    pub fn instance_count(&self, class: &str) -> usize {
        self.instances.count(class)
    }

    /// Root nodes of the live instances of `class`, in creation order.
    #[must_use]
    pub fn instance_nodes(&self, class: &str) -> Vec<NodeId> {
        self.instances.nodes(class)
    }

    /// Shared handle to the live `class` instance bound to `node`.
    ///
    /// `None` when no such instance exists or `C` is not its type.
    #[must_use]
    pub fn controller<C: Controller>(
        &self,
        class: &str,
        node: NodeId,
    ) -> Option<Rc<RefCell<C>>> {
        self.instances
            .find(class, node)?
            .controller
            .handle()
            .downcast::<RefCell<C>>()
            .ok()
    }

    /// Deliver one batch: every record queued since the last delivery.
    ///
    /// Returns the number of records processed.
    pub fn flush(&mut self, doc: &mut Document) -> usize {
        let records = doc.take_records(self.observer);
        if records.is_empty() {
            return 0;
        }
        let _span = debug_span!("markbind.flush", records = records.len()).entered();
        self.on_mutate(doc, &records);
        records.len()
    }

    /// Deliver batches until none are pending or `settle_limit` batches ran.
    ///
    /// Returns the total number of records processed.
    pub fn settle(&mut self, doc: &mut Document) -> usize {
        let mut total = 0;
        for _ in 0..self.config.settle_limit {
            let processed = self.flush(doc);
            if processed == 0 {
                return total;
            }
            total += processed;
        }
        let pending = doc.pending_records(self.observer);
        if pending > 0 {
            warn!(
                limit = self.config.settle_limit,
                pending, "settle limit reached with records pending"
            );
        }
        total
    }

    /// Handle a mutation batch.
    ///
    /// Records are processed in order; within each record, added nodes are
    /// attached before removed nodes are detached.
    pub fn on_mutate(&mut self, doc: &mut Document, records: &[MutationRecord]) {
        for record in records {
            for &node in &record.added_nodes {
                self.attach(doc, node);
            }
            for &node in &record.removed_nodes {
                self.detach(doc, node);
            }
        }
    }

    /// Instantiate controllers for `node` and every marked descendant.
    ///
    /// Marked elements are visited in document order. Unknown classes and
    /// already-tracked pairs are skipped. For each new instance, actions are
    /// bound and targets assigned before `connect` runs.
    pub fn attach(&mut self, doc: &mut Document, node: NodeId) {
        if !doc.is_element(node) {
            return;
        }
        for element in doc.query_attribute(node, &self.config.controller_attribute) {
            let Some(class) = self.class_of(doc, element) else {
                continue;
            };
            let Some(ctor) = self.registry.get(&class) else {
                debug!(class = %class, element = element.index(), "no controller registered");
                continue;
            };
            if self.instances.find(&class, element).is_some() {
                trace!(class = %class, element = element.index(), "already attached");
                continue;
            }

            let controller = ctor.construct(&class, element);
            if controller.node() != element {
                warn!(
                    class = %class,
                    element = element.index(),
                    reported = controller.node().index(),
                    "controller reports a different root node"
                );
            }
            self.instances.push(&class, Instance::new(controller, element));
            self.hydrate(doc, &class, element);
            if let Some(instance) = self.instances.find(&class, element) {
                debug!(class = %class, element = element.index(), "controller connected");
                instance.controller.connect(doc);
            }
        }
    }

    /// Tear down controllers for `node` and every marked descendant.
    ///
    /// For each tracked pair: `disconnect`, then unbind actions, then drop
    /// the instance. Untracked pairs are ignored.
    pub fn detach(&mut self, doc: &mut Document, node: NodeId) {
        if !doc.is_element(node) {
            return;
        }
        for element in doc.query_attribute(node, &self.config.controller_attribute) {
            let Some(class) = self.class_of(doc, element) else {
                continue;
            };
            let Some(instance) = self.instances.find(&class, element) else {
                continue;
            };
            debug!(class = %class, element = element.index(), "controller disconnected");
            instance.controller.disconnect(doc);
            self.dehydrate(doc, &class, element);
            self.instances.remove(&class, element);
        }
    }

    /// Disconnect every live instance and stop observing.
    ///
    /// Classes are visited in registration order, instances in creation
    /// order. Pending records are discarded.
    pub fn teardown(mut self, doc: &mut Document) {
        doc.disconnect_observer(self.observer);
        let classes = self.registry.classes().to_vec();
        for class in classes {
            for mut instance in self.instances.take(&class) {
                instance.controller.disconnect(doc);
                unbind_all(doc, &class, &mut instance);
            }
        }
        debug!(root = self.root.index(), "binder torn down");
    }

    fn class_of(&self, doc: &Document, element: NodeId) -> Option<String> {
        doc.attribute(element, &self.config.controller_attribute)
            .filter(|class| !class.is_empty())
            .map(str::to_owned)
    }

    /// Descriptors in `node`'s subtree addressed to `class`, in document order.
    fn actions_for(
        &self,
        doc: &Document,
        class: &str,
        node: NodeId,
    ) -> Vec<(NodeId, ActionDescriptor)> {
        let attribute = &self.config.action_attribute;
        let mut found = Vec::new();
        for element in doc.query_attribute(node, attribute) {
            let Some(value) = doc.attribute(element, attribute) else {
                continue;
            };
            found.extend(
                ActionDescriptor::parse_list(value)
                    .filter(|d| d.controller == class)
                    .map(|d| (element, d)),
            );
        }
        found
    }

    fn hydrate(&mut self, doc: &mut Document, class: &str, node: NodeId) {
        let actions = self.actions_for(doc, class, node);
        let target_attribute = self.config.target_attribute(class);
        let Some(targets) = self.registry.get(class).map(Constructor::targets) else {
            return;
        };
        let Some(instance) = self.instances.find_mut(class, node) else {
            return;
        };

        for (element, descriptor) in actions {
            if descriptor.method.is_empty() {
                continue;
            }
            let key = BindingKey {
                element,
                event: descriptor.event,
                method: descriptor.method,
            };
            if instance.bindings.contains_key(&key) {
                continue;
            }
            let Some(listener) = instance.controller.bind_action(&key.method) else {
                debug!(class = %class, method = %key.method, "action not found, skipped");
                continue;
            };
            match doc.add_event_listener(element, &key.event, Rc::clone(&listener)) {
                Ok(_) => {
                    trace!(
                        class = %class,
                        element = element.index(),
                        event = %key.event,
                        method = %key.method,
                        "action bound"
                    );
                    instance.bindings.insert(key, listener);
                }
                Err(err) => debug!(class = %class, error = %err, "action not bound"),
            }
        }

        for &target in targets {
            for element in doc.query_attribute_value(node, &target_attribute, target) {
                if !instance.controller.assign_target(target, element) {
                    debug!(class = %class, target_name = target, "target slot missing, skipped");
                    break;
                }
                trace!(
                    class = %class,
                    target_name = target,
                    element = element.index(),
                    "target assigned"
                );
            }
        }
    }

    fn dehydrate(&mut self, doc: &mut Document, class: &str, node: NodeId) {
        let actions = self.actions_for(doc, class, node);
        let Some(instance) = self.instances.find_mut(class, node) else {
            return;
        };

        for (element, descriptor) in actions {
            let key = BindingKey {
                element,
                event: descriptor.event,
                method: descriptor.method,
            };
            if let Some(listener) = instance.bindings.remove(&key) {
                let _ = doc.remove_event_listener(element, &key.event, &listener);
                trace!(
                    class = %class,
                    element = element.index(),
                    event = %key.event,
                    method = %key.method,
                    "action unbound"
                );
            }
        }
        unbind_all(doc, class, instance);
    }
}

/// Remove every stored listener of `instance`.
fn unbind_all(doc: &mut Document, class: &str, instance: &mut Instance) {
    for (key, listener) in instance.bindings.drain() {
        let _ = doc.remove_event_listener(key.element, &key.event, &listener);
        trace!(
            class = %class,
            element = key.element.index(),
            event = %key.event,
            method = %key.method,
            "stale action unbound"
        );
    }
}
