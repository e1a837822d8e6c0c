#![no_main]

use libfuzzer_sys::fuzz_target;
use trim_multispaces::{Language, TransformConfig, transform, transform_with_sourcemap};

fuzz_target!(|data: &[u8]| {
    let data = if data.len() > 256 * 1024 {
        &data[..256 * 1024]
    } else {
        data
    };

    let source = String::from_utf8_lossy(data);
    let config = TransformConfig::default();

    // Create a sourcemap, then feed the output back through with that map.
    if let Ok(created) = transform(&source, "fuzz.ts", Language::TypeScript, &config) {
        let _ = transform_with_sourcemap(&created.code, &created.map, Language::TypeScript, &config);

        // A truncated map must be reported as Err, never crash.
        let cut = created.map.len() / 2;
        let corrupted = created.map.get(..cut).filter(|s| !s.is_empty()).unwrap_or("{");
        let _ = transform_with_sourcemap(&source, corrupted, Language::TypeScript, &config);
    }
});
