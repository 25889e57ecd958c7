#![no_main]

use std::path::Path;

use bhejo::view::ViewDescription;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let content = String::from_utf8_lossy(data);

    // Errors are fine, panics are not. A parse error must carry a span that
    // fits inside the source so miette can render it.
    if let Err(bhejo::LoadError::Parse { span: Some(span), .. }) =
        ViewDescription::parse(&content, Path::new("fuzz.view"))
    {
        assert!(span.offset() + span.len() <= content.len());
    }
});
