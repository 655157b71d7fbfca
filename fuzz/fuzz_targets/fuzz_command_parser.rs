#![no_main]
use libfuzzer_sys::fuzz_target;
use lift_core::command::{parse_line, Event};

fuzz_target!(|data: &str| {
    // Any line either parses or yields a typed error; edge channels stay in u8 range.
    if let Ok(Event::GoTo { floor, .. }) = parse_line(data) {
        let _ = u8::try_from(floor);
    }
});
