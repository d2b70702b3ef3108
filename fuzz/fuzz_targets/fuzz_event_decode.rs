#![no_main]

use libfuzzer_sys::fuzz_target;
use shopcrab::fuzz_api::decode;

fuzz_target!(|data: &[u8]| {
    if let Ok(events) = decode(data) {
        for event in events {
            let _ = format!("{:?}", event);
        }
    }
});
