#![no_main]

use libfuzzer_sys::fuzz_target;
use markbind_runtime::ActionDescriptor;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    for descriptor in ActionDescriptor::parse_list(raw) {
        assert!(!descriptor.event.is_empty(), "empty event parsed");
        assert!(!descriptor.controller.is_empty(), "empty class parsed");
        assert!(!descriptor.controller.contains('#'), "class holds '#'");
        assert!(!descriptor.method.contains('#'), "method holds '#'");
    }
});
