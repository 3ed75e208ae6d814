#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = std::str::from_utf8(data) {
        // Any line must classify or fail cleanly, never panic.
        let _ = aimarketing_llm::streaming::parse_line(line);
    }
});
