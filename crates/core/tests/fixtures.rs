use std::path::PathBuf;

use pretty_assertions::assert_eq;
use trim_multispaces::{
    Language, TransformConfig, transform, transform_no_sourcemap, transform_with_sourcemap,
};

const CASES: [(&str, &str); 7] = [
    ("basic.ts", "basic.out.ts"),
    ("interpolation.ts", "interpolation.out.ts"),
    ("passthrough.js", "passthrough.out.js"),
    ("markup.tsx", "markup.out.tsx"),
    ("unicode.ts", "unicode.out.ts"),
    ("nested.js", "nested.out.js"),
    ("statements.js", "statements.out.js"),
];

fn fixtures_dir() -> PathBuf {
    #[cfg(target_os = "wasi")]
    {
        PathBuf::from("/workspace/fixtures")
    }

    #[cfg(not(target_os = "wasi"))]
    {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
    }
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixtures_dir().join(name)).expect("read fixture")
}

fn detect_language(filename: &str) -> Language {
    filename
        .rsplit_once('.')
        .and_then(|(_, ext)| Language::from_extension(ext))
        .unwrap_or_else(|| panic!("unknown file extension: {filename}"))
}

#[test]
fn fixtures_match_expected_output() {
    for (input_name, expected_name) in CASES {
        let input = read_fixture(input_name);
        let expected = read_fixture(expected_name);
        let language = detect_language(input_name);

        let actual =
            transform_no_sourcemap(&input, language, &TransformConfig::default()).unwrap();
        assert_eq!(actual, expected, "fixture mismatch: {input_name}");

        // Idempotence: once rewritten, rewriting again should not change.
        let actual2 =
            transform_no_sourcemap(&actual, language, &TransformConfig::default()).unwrap();
        assert_eq!(actual2, actual, "not idempotent: {input_name}");
    }
}

#[test]
fn fixtures_emit_parseable_sourcemaps() {
    for (input_name, expected_name) in CASES {
        let input = read_fixture(input_name);
        let expected = read_fixture(expected_name);
        let language = detect_language(input_name);

        // Source filename is the fixture filename; tests assert this gets recorded.
        let res = transform(&input, input_name, language, &TransformConfig::default()).unwrap();
        assert_eq!(res.code, expected, "code mismatch: {input_name}");

        let map = sourcemap::SourceMap::from_slice(res.map.as_bytes())
            .expect("sourcemap JSON must parse");
        assert_eq!(map.get_source(0), Some(input_name));

        // Every output line start maps somewhere in the input.
        let lines = res.code.lines().count() as u32;
        for line in 0..lines {
            if res.code.lines().nth(line as usize).is_some_and(str::is_empty) {
                continue;
            }
            let tok = map
                .lookup_token(line, 0)
                .unwrap_or_else(|| panic!("{input_name}: no token for line {line}"));
            assert_eq!(tok.get_dst_line(), line, "{input_name}: line {line}");
        }
    }
}

#[test]
fn fixtures_survive_sourcemap_rewrite() {
    for (input_name, expected_name) in CASES {
        let input = read_fixture(input_name);
        let expected = read_fixture(expected_name);
        let language = detect_language(input_name);
        let cfg = TransformConfig::default();

        let first = transform(&input, input_name, language, &cfg).unwrap();
        let second = transform_with_sourcemap(&first.code, &first.map, language, &cfg).unwrap();
        assert_eq!(second.code, expected, "code mismatch: {input_name}");

        let map = sourcemap::SourceMap::from_slice(second.map.as_bytes())
            .expect("rewritten sourcemap JSON must parse");
        assert!(
            map.tokens().all(|t| t.get_source().is_none_or(|s| s == input_name)),
            "{input_name}: rewritten map must point at the original file"
        );
    }
}
