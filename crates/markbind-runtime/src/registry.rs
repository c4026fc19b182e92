#![forbid(unsafe_code)]

//! Constructor registry and the table of live instances.

use ahash::AHashMap;
use markbind_dom::{Listener, NodeId};

use crate::controller::{Constructor, LiveController};
use crate::error::BinderError;

/// Class name to constructor. Append-only; registration order is kept.
#[derive(Default)]
pub(crate) struct Registry {
    constructors: AHashMap<String, Constructor>,
    order: Vec<String>,
}

impl Registry {
    pub(crate) fn insert(&mut self, class: &str, ctor: Constructor) -> Result<(), BinderError> {
        if self.constructors.contains_key(class) {
            return Err(BinderError::AlreadyRegistered(class.to_owned()));
        }
        self.constructors.insert(class.to_owned(), ctor);
        self.order.push(class.to_owned());
        Ok(())
    }

    pub(crate) fn get(&self, class: &str) -> Option<&Constructor> {
        self.constructors.get(class)
    }

    pub(crate) fn contains(&self, class: &str) -> bool {
        self.constructors.contains_key(class)
    }

    /// Class names in registration order.
    pub(crate) fn classes(&self) -> &[String] {
        &self.order
    }
}

/// Identity of one bound action within an instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct BindingKey {
    pub(crate) element: NodeId,
    pub(crate) event: String,
    pub(crate) method: String,
}

/// A live controller plus the exact listeners registered for it.
pub(crate) struct Instance {
    pub(crate) controller: Box<dyn LiveController>,
    pub(crate) node: NodeId,
    pub(crate) bindings: AHashMap<BindingKey, Listener>,
}

impl Instance {
    pub(crate) fn new(controller: Box<dyn LiveController>, node: NodeId) -> Self {
        Self {
            controller,
            node,
            bindings: AHashMap::new(),
        }
    }
}

/// Class name to live instances, in creation order.
///
/// At most one instance exists per `(class, node)` pair; callers check with
/// [`InstanceTable::find`] before pushing.
#[derive(Default)]
pub(crate) struct InstanceTable {
    by_class: AHashMap<String, Vec<Instance>>,
}

impl InstanceTable {
    pub(crate) fn find(&self, class: &str, node: NodeId) -> Option<&Instance> {
        self.by_class.get(class)?.iter().find(|i| i.node == node)
    }

    pub(crate) fn find_mut(&mut self, class: &str, node: NodeId) -> Option<&mut Instance> {
        self.by_class
            .get_mut(class)?
            .iter_mut()
            .find(|i| i.node == node)
    }

    pub(crate) fn push(&mut self, class: &str, instance: Instance) {
        self.by_class
            .entry(class.to_owned())
            .or_default()
            .push(instance);
    }

    pub(crate) fn remove(&mut self, class: &str, node: NodeId) -> Option<Instance> {
        let instances = self.by_class.get_mut(class)?;
        let index = instances.iter().position(|i| i.node == node)?;
        Some(instances.remove(index))
    }

    /// Remove and return every instance of `class`.
    pub(crate) fn take(&mut self, class: &str) -> Vec<Instance> {
        self.by_class.remove(class).unwrap_or_default()
    }

    pub(crate) fn count(&self, class: &str) -> usize {
        self.by_class.get(class).map_or(0, Vec::len)
    }

    pub(crate) fn total(&self) -> usize {
        self.by_class.values().map(Vec::len).sum()
    }

    /// Root nodes of the live instances of `class`, in creation order.
    pub(crate) fn nodes(&self, class: &str) -> Vec<NodeId> {
        self.by_class
            .get(class)
            .map(|instances| instances.iter().map(|i| i.node).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Controller;
    use markbind_dom::Document;

    struct Plain(NodeId);

    impl Controller for Plain {
        fn node(&self) -> NodeId {
            self.0
        }
    }

    #[test]
    fn duplicate_registration_leaves_registry_unchanged() {
        let mut registry = Registry::default();
        registry.insert("plain", Constructor::new(Plain)).unwrap();
        let err = registry.insert("plain", Constructor::new(Plain)).unwrap_err();
        assert_eq!(err, BinderError::AlreadyRegistered("plain".into()));
        assert_eq!(err.to_string(), "plain is already registered.");
        assert_eq!(registry.classes(), &["plain".to_owned()]);
        assert!(registry.contains("plain"));
        assert!(!registry.contains("other"));
    }

    #[test]
    fn table_tracks_instances_by_class_and_node() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let ctor = Constructor::new(Plain);
        let mut table = InstanceTable::default();
        table.push("plain", Instance::new(ctor.construct("plain", a), a));
        table.push("plain", Instance::new(ctor.construct("plain", b), b));

        assert_eq!(table.count("plain"), 2);
        assert_eq!(table.nodes("plain"), vec![a, b]);
        assert!(table.find("plain", a).is_some());
        assert!(table.find("other", a).is_none());

        assert!(table.remove("plain", a).is_some());
        assert!(table.remove("plain", a).is_none());
        assert_eq!(table.nodes("plain"), vec![b]);
        assert_eq!(table.take("plain").len(), 1);
        assert_eq!(table.total(), 0);
    }
}
