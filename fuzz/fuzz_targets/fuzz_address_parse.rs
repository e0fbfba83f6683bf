#![no_main]

use libfuzzer_sys::fuzz_target;

use iov_types::NewAddress;

// Address parsing and memo scanning never panic; anything found in a memo
// parses on its own.
fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = NewAddress::parse(text);
        if let Some(found) = NewAddress::find_in(text) {
            assert!(NewAddress::parse(found.as_str()).is_ok());
        }
    }
});
