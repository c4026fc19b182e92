#![no_main]

use libfuzzer_sys::fuzz_target;
use markbind_dom::Document;
use markbind_dom::markup::inner_markup;

fuzz_target!(|data: &[u8]| {
    let Ok(markup) = std::str::from_utf8(data) else {
        return;
    };

    let mut doc = Document::new();
    let host = doc.create_element("div");
    if doc.set_inner_markup(host, markup).is_err() {
        return;
    }

    // Serialized output must parse again and serialize to itself.
    let first = inner_markup(&doc, host);
    let again = doc.create_element("div");
    doc.set_inner_markup(again, &first)
        .expect("serialized markup must reparse");
    assert_eq!(inner_markup(&doc, again), first, "serialization not stable");

    for node in doc.descendants(host) {
        let parent = doc.parent(node).expect("descendant without parent");
        assert!(doc.children(parent).contains(&node), "parent link broken");
    }
});
