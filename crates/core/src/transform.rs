//! `TrimMultispaces` rewriting with optional sourcemap support.
//!
//! This module wires the pieces together: parse the source with tree-sitter, walk it with the
//! [`TrimMultispaces`] rule, validate and apply the resulting edits, and optionally emit a
//! sourcemap for the rewrite.
//!
//! A file that contains no matching call comes back byte-for-byte identical.

use std::borrow::Cow;

use crate::{
    Language, TransformError,
    edit::{Edit, apply_edits, create_sourcemap, rewrite_sourcemap, validate_edits},
    parse::parse,
    rule::TrimMultispaces,
    traverse::collect_edits,
};

/// Callee name matched by default.
pub const DEFAULT_CALLEE: &str = "TrimMultispaces";

/// Configuration options for the rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformConfig {
    /// Identifier the call must use, compared exactly. Defaults to [`DEFAULT_CALLEE`].
    pub callee: Cow<'static, str>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            callee: Cow::Borrowed(DEFAULT_CALLEE),
        }
    }
}

/// Output code and its corresponding sourcemap JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAndSourcemap {
    /// The rewritten source.
    pub code: String,
    /// The generated/re-written sourcemap JSON.
    pub map: String,
}

/// Rewrite `TrimMultispaces` calls and create a brand-new sourcemap.
///
/// The returned sourcemap maps the output back to `source`, recorded under `source_filename`.
pub fn transform(
    source: &str,
    source_filename: &str,
    language: Language,
    config: &TransformConfig,
) -> Result<CodeAndSourcemap, TransformError> {
    let (code, edits) = rewrite(source, language, config)?;
    let map = create_sourcemap(source, &code, source_filename, &edits)?;
    Ok(CodeAndSourcemap { code, map })
}

/// Rewrite `TrimMultispaces` calls without producing a sourcemap.
///
/// This is the cheapest entry point if you don't need mappings.
pub fn transform_no_sourcemap(
    source: &str,
    language: Language,
    config: &TransformConfig,
) -> Result<String, TransformError> {
    let (code, _) = rewrite(source, language, config)?;
    Ok(code)
}

/// Rewrite `TrimMultispaces` calls and carry an existing sourcemap through the rewrite.
///
/// `input_sourcemap` maps `source` back to its own originals (e.g. from a prior compile step).
pub fn transform_with_sourcemap(
    source: &str,
    input_sourcemap: &str,
    language: Language,
    config: &TransformConfig,
) -> Result<CodeAndSourcemap, TransformError> {
    let (code, edits) = rewrite(source, language, config)?;
    let map = rewrite_sourcemap(source, &code, input_sourcemap, &edits)?;
    Ok(CodeAndSourcemap { code, map })
}

/// Parse `source`, collect edits, apply them, and return `(output, edits)`.
///
/// This is the shared core used by all public entry points.
fn rewrite(
    source: &str,
    language: Language,
    config: &TransformConfig,
) -> Result<(String, Vec<Edit>), TransformError> {
    let tree = parse(source, language)?;

    let rule = TrimMultispaces::new(&config.callee);
    let edits = collect_edits(source, tree.root_node(), &rule);
    validate_edits(source.len(), &edits)?;

    tracing::debug!(
        ?language,
        callee = %config.callee,
        rewrites = edits.len(),
        "rewrote template literal calls"
    );

    let code = apply_edits(source, &edits);
    Ok((code, edits))
}
