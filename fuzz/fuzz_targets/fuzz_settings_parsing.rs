#![no_main]

use std::path::Path;

use bhejo::Settings;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = Settings::parse(content, Path::new("bhejo.toml"));
    }
});
