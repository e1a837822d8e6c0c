#![no_main]

use libfuzzer_sys::fuzz_target;
use trim_multispaces::{Language, TransformConfig, transform};

fuzz_target!(|data: &[u8]| {
    let data = if data.len() > 256 * 1024 {
        &data[..256 * 1024]
    } else {
        data
    };

    let source = String::from_utf8_lossy(data);
    let config = TransformConfig::default();

    for &(language, filename) in &[
        (Language::JavaScript, "input.js"),
        (Language::TypeScript, "input.ts"),
        (Language::Tsx, "input.tsx"),
    ] {
        if let Ok(out) = transform(&source, filename, language, &config) {
            // If creation succeeds, the sourcemap must be parseable JSON.
            // Any panic here is a bug we want the fuzzer to catch.
            let _ = serde_json::from_str::<serde_json::Value>(&out.map)
                .expect("sourcemap must be valid JSON when transform() returns Ok");
            assert!(out.code.len() <= source.len(), "rewrite only ever removes bytes");
        }
    }
});
