//! `TrimMultispaces` template literal rewriting for JavaScript and TypeScript sources.
//!
//! This crate finds calls of the form ``TrimMultispaces(`...`)`` and replaces each one with its
//! template literal argument, after removing every run of two or more consecutive spaces from the
//! literal's text segments. Interpolated expressions are copied through untouched, and every other
//! byte of the file is preserved as written.
//!
//! Entry points:
//!
//! - [`transform`] contains the public APIs for rewriting and (re)mapping sourcemaps.
//!
//! Internals:
//!
//! - [`rule`] is the rewrite rule itself: a pure node-to-replacement decision.
//! - [`template`] holds the rebuilt template literal model and the space-collapsing scan.
//! - [`traverse`] drives a rule over a parsed tree and turns replacements into edits.
//! - [`parse`] contains the tree-sitter parsing logic.
//! - [`edit`] holds the edit model and sourcemap creation/rewriting helpers.
//! - [`line_index`] provides line and UTF-16 column lookups for sourcemaps.
//! - [`alloc`] contains the tree-sitter allocator override for WASM targets.

use std::path::Path;

pub mod alloc;
pub mod edit;
pub mod line_index;
pub mod parse;
pub mod rule;
pub mod template;
pub mod transform;
pub mod traverse;

pub use transform::{
    CodeAndSourcemap, DEFAULT_CALLEE, TransformConfig, transform, transform_no_sourcemap,
    transform_with_sourcemap,
};

/// Source languages understood by the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    /// JavaScript, including JSX.
    JavaScript,
    TypeScript,
    /// TypeScript with JSX.
    Tsx,
}

impl Language {
    /// Infer the language from a file extension (without the leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "js" | "mjs" | "cjs" | "jsx" => Some(Language::JavaScript),
            "ts" | "mts" | "cts" => Some(Language::TypeScript),
            "tsx" => Some(Language::Tsx),
            _ => None,
        }
    }

    /// Infer the language from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Language::from_extension)
    }
}

/// Errors that can occur while transforming a source file.
///
/// The rewrite rule itself never fails; these cover parsing and sourcemap plumbing.
#[derive(thiserror::Error, Debug)]
pub enum TransformError {
    #[error("tree-sitter failed to parse input")]
    ParseFailed,

    #[error("invalid edit: {0}")]
    InvalidEdit(String),

    #[error("overlapping edits: [{a_start},{a_end}) overlaps [{b_start},{b_end})")]
    OverlappingEdits {
        a_start: usize,
        a_end: usize,
        b_start: usize,
        b_end: usize,
    },

    #[error("invalid sourcemap: {0}")]
    SourceMap(#[from] sourcemap::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_from_extension() {
        assert_eq!(Language::from_extension("js"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension("jsx"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension("mjs"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension("ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("cts"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("tsx"), Some(Language::Tsx));
        assert_eq!(Language::from_extension("py"), None);
    }

    #[test]
    fn language_from_path() {
        assert_eq!(
            Language::from_path(Path::new("src/view.tsx")),
            Some(Language::Tsx)
        );
        assert_eq!(Language::from_path(Path::new("Makefile")), None);
    }
}
