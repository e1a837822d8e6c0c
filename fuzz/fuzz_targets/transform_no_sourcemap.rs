#![no_main]

use libfuzzer_sys::fuzz_target;
use trim_multispaces::{DEFAULT_CALLEE, Language, TransformConfig, transform_no_sourcemap};

fuzz_target!(|data: &[u8]| {
    // Limit input size to keep the fuzzer fast and avoid OOM in pathological cases.
    let data = if data.len() > 256 * 1024 {
        &data[..256 * 1024]
    } else {
        data
    };

    let source = String::from_utf8_lossy(data);
    let config = TransformConfig::default();

    // Broken syntax is expected input and must never crash. The rewrite only ever deletes
    // bytes, and a file without the callee must come back untouched.
    for &language in &[Language::JavaScript, Language::TypeScript, Language::Tsx] {
        if let Ok(out) = transform_no_sourcemap(&source, language, &config) {
            assert!(out.len() <= source.len(), "rewrite only ever removes bytes");
            if !source.contains(DEFAULT_CALLEE) {
                assert_eq!(out, source, "no callee, no change");
            }
        }
    }
});
