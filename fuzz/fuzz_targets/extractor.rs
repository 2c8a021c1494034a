#![no_main]

use libfuzzer_sys::fuzz_target;
use url::Url;

use newsprobe::extractor::ExtractionChain;

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);
    let Ok(url) = Url::parse("https://example.com/news/story") else {
        return;
    };

    // Every heuristic must tolerate arbitrary markup.
    let _ = ExtractionChain::default().extract(&html, &url);
});
