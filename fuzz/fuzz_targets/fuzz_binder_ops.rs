#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use markbind_dom::{Document, Event, NodeId};
use markbind_runtime::{ActionFn, Binder, Controller};

struct Probe {
    node: NodeId,
    hits: u32,
    slot: Option<NodeId>,
}

impl Probe {
    fn hit(&mut self, doc: &mut Document, _event: &Event) {
        self.hits += 1;
        if let Some(slot) = self.slot {
            let _ = doc.set_text_content(slot, &self.hits.to_string());
        }
    }
}

impl Controller for Probe {
    fn targets() -> &'static [&'static str] {
        &["slot"]
    }

    fn action(name: &str) -> Option<ActionFn<Self>> {
        (name == "hit").then_some(Self::hit as ActionFn<Self>)
    }

    fn node(&self) -> NodeId {
        self.node
    }

    fn target_slot(&mut self, name: &str) -> Option<&mut Option<NodeId>> {
        (name == "slot").then_some(&mut self.slot)
    }
}

#[derive(Arbitrary, Debug)]
enum Op {
    Mount(String),
    Remove(u8),
    Move { node: u8, parent: u8 },
    Click(u8),
    Flush,
}

const PREFIX: &str = r#"<div data-controller="probe"><b data-action="click->probe#hit"></b><i data-probe-target="slot"></i>"#;

fuzz_target!(|ops: Vec<Op>| {
    let mut doc = Document::new();
    let root = doc.body();
    let mut binder = Binder::new(&mut doc, root).expect("default config is valid");
    binder
        .register("probe", |node| Probe { node, hits: 0, slot: None })
        .expect("fresh registry");

    for op in ops.iter().take(64) {
        let nodes = doc.descendants(root);
        let pick = |index: u8| nodes.get(usize::from(index) % nodes.len().max(1)).copied();
        match op {
            Op::Mount(inner) => {
                let _ = doc.append_markup(root, &format!("{PREFIX}{inner}</div>"));
            }
            Op::Remove(index) => {
                if let Some(node) = pick(*index) {
                    let _ = doc.remove(node);
                }
            }
            Op::Move { node, parent } => {
                if let (Some(node), Some(parent)) = (pick(*node), pick(*parent)) {
                    let _ = doc.append_child(parent, node);
                }
            }
            Op::Click(index) => {
                if let Some(node) = pick(*index) {
                    let _ = doc.dispatch_event(node, Event::new("click").with_bubbles(true));
                }
            }
            Op::Flush => {
                binder.flush(&mut doc);
            }
        }
    }

    binder.settle(&mut doc);
    let live = binder.instance_nodes("probe");
    let mut unique = live.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), live.len(), "duplicate instance for one element");

    // Dropping the whole tree must leave no listener behind.
    let all = doc.descendants(root);
    let _ = doc.replace_children(root, &[]);
    binder.settle(&mut doc);
    assert_eq!(binder.instance_count("probe"), 0);
    for node in all {
        assert_eq!(doc.listener_count(node), 0, "listener leaked on {node}");
    }
});
