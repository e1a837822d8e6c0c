//! Edit and sourcemap utilities.
//!
//! This module defines [`Edit`], a byte-range replacement over the input source, plus helpers to
//! apply edits and to produce sourcemaps for the rewritten output.
//!
//! Key ideas:
//!
//! - Internal offsets are byte-based (tree-sitter’s model).
//! - Sourcemap columns are emitted/consumed as UTF-16 code unit columns (matching typical JS
//!   sourcemap consumers).
//! - Every output byte of an edit records the input byte it came from. Most bytes are copies;
//!   the few spelled by the rewrite (a guarding `;`, a re-escaped `$` or `\0`) record the input
//!   byte they stand in for, so the whole output maps back to the input.
//! - Mapping tokens are anchored at output line starts and wherever the output stops being a
//!   contiguous copy of the input: after each removed run of spaces, and at the edges of each
//!   replaced call.
//!
//! Invariants:
//!
//! - `edits` are sorted by ascending `start` and do not overlap (see [`validate_edits`]).

use std::cmp::Ordering;

use crate::{TransformError, line_index::LineIndex};

/// A replacement of `input[start..end]` by `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Start byte offset (inclusive) in the input code.
    pub start: usize,
    /// End byte offset (exclusive) in the input code.
    pub end: usize,
    /// Replacement text inserted into the output code.
    pub replacement: String,
    /// For each byte of `replacement`, the input byte offset it was copied from.
    pub output_byte_to_input_byte: Vec<usize>,
}

/// Validate edit invariants required by this module.
///
/// This performs cheap structural checks only:
///
/// - `start <= end` and `end <= input_len`
/// - edits are in ascending order and non-overlapping
/// - `output_byte_to_input_byte.len() == replacement.len()`
/// - every origin is `< input_len`
pub fn validate_edits(input_len: usize, edits: &[Edit]) -> Result<(), TransformError> {
    for (idx, e) in edits.iter().enumerate() {
        if e.start > e.end {
            return Err(TransformError::InvalidEdit(format!(
                "start > end at index {idx}: start={}, end={}",
                e.start, e.end
            )));
        }
        if e.end > input_len {
            return Err(TransformError::InvalidEdit(format!(
                "edit out of bounds at index {idx}: end={} > input_len={input_len}",
                e.end
            )));
        }
        if let Some(prev) = idx.checked_sub(1).map(|i| &edits[i])
            && e.start < prev.end
        {
            return Err(TransformError::OverlappingEdits {
                a_start: prev.start,
                a_end: prev.end,
                b_start: e.start,
                b_end: e.end,
            });
        }
        if e.output_byte_to_input_byte.len() != e.replacement.len() {
            return Err(TransformError::InvalidEdit(format!(
                "origin map length mismatch at index {idx}: map_len={}, replacement_len={}",
                e.output_byte_to_input_byte.len(),
                e.replacement.len()
            )));
        }
        if let Some(&bad) = e
            .output_byte_to_input_byte
            .iter()
            .find(|&&in_byte| in_byte >= input_len)
        {
            return Err(TransformError::InvalidEdit(format!(
                "mapped input byte out of bounds at index {idx}: in_byte={bad} >= input_len={input_len}"
            )));
        }
    }
    Ok(())
}

/// Apply validated edits to `input`.
pub fn apply_edits(input: &str, edits: &[Edit]) -> String {
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0usize;
    for e in edits {
        out.push_str(&input[cursor..e.start]);
        out.push_str(&e.replacement);
        cursor = e.end;
    }
    out.push_str(&input[cursor..]);
    out
}

/// Create a brand-new sourcemap for `output_code`, mapping back to `input_code`.
///
/// If `output_code` is shorter than the edits imply, only the overlapping prefix is mapped.
pub fn create_sourcemap(
    input_code: &str,
    output_code: &str,
    source_filename: &str,
    edits: &[Edit],
) -> Result<String, TransformError> {
    let in_index = LineIndex::new(input_code);
    let out_index = LineIndex::new(output_code);

    let mut out_to_in = output_origins(input_code.len(), edits);
    out_to_in.truncate(output_code.len());

    let mut builder = sourcemap::SourceMapBuilder::new(None);
    builder.add_source(source_filename);
    builder.set_source_contents(0, Some(input_code));

    for out_byte in anchors(&out_to_in, out_index.line_starts()) {
        let (out_line, out_col) = out_index.byte_to_line_utf16_col(out_byte);
        let (in_line, in_col) = in_index.byte_to_line_utf16_col(out_to_in[out_byte]);
        builder.add(
            out_line as u32,
            out_col as u32,
            in_line as u32,
            in_col as u32,
            Some(source_filename),
            None,
            false,
        );
    }

    write_sourcemap(builder)
}

/// Rewrite an existing sourcemap for `input_code` so it applies to `output_code`.
///
/// Used when `input_code` is itself generated and `input_sourcemap_json` maps it back to the
/// original sources. Tokens are carried through the rewrite:
///
/// - a token whose generated byte survives moves to that byte's output position;
/// - a token whose generated byte was removed is dropped;
/// - each anchor point (see [`create_sourcemap`]) gets a token looked up from the input map so
///   removed bytes do not stretch the preceding token's span.
pub fn rewrite_sourcemap(
    input_code: &str,
    output_code: &str,
    input_sourcemap_json: &str,
    edits: &[Edit],
) -> Result<String, TransformError> {
    let input_map = sourcemap::SourceMap::from_slice(input_sourcemap_json.as_bytes())?;

    let in_index = LineIndex::new(input_code);
    let out_index = LineIndex::new(output_code);

    let mut out_to_in = output_origins(input_code.len(), edits);
    out_to_in.truncate(output_code.len());
    let in_to_out = input_destinations(input_code.len(), &out_to_in);

    let mut mappings: Vec<Mapping<'_>> = Vec::new();

    for token in input_map.tokens() {
        let Some(in_byte) =
            in_index.line_utf16_col_to_byte(token.get_dst_line() as usize, token.get_dst_col() as usize)
        else {
            continue;
        };
        let Some(out_byte) = in_to_out.get(in_byte).copied().flatten() else {
            continue;
        };
        let (out_line, out_col) = out_index.byte_to_line_utf16_col(out_byte);

        mappings.push(Mapping {
            dst_line: out_line as u32,
            dst_col: out_col as u32,
            src_line: token.get_src_line(),
            src_col: token.get_src_col(),
            source: token.get_source(),
            name: token.get_name(),
        });
    }

    for out_byte in anchors(&out_to_in, out_index.line_starts()) {
        let (out_line, out_col) = out_index.byte_to_line_utf16_col(out_byte);
        let (in_line, in_col) = in_index.byte_to_line_utf16_col(out_to_in[out_byte]);

        let (src_line, src_col, source, name) =
            match input_map.lookup_token(in_line as u32, in_col as u32) {
                Some(t) => (
                    t.get_src_line(),
                    t.get_src_col(),
                    t.get_source(),
                    t.get_name(),
                ),
                None => (u32::MAX, u32::MAX, None, None),
            };

        mappings.push(Mapping {
            dst_line: out_line as u32,
            dst_col: out_col as u32,
            src_line,
            src_col,
            source,
            name,
        });
    }

    sort_and_dedup_mappings(&mut mappings);

    let mut builder = sourcemap::SourceMapBuilder::new(None);
    for m in mappings {
        builder.add(
            m.dst_line, m.dst_col, m.src_line, m.src_col, m.source, m.name, false,
        );
    }

    write_sourcemap(builder)
}

fn write_sourcemap(builder: sourcemap::SourceMapBuilder) -> Result<String, TransformError> {
    let map = builder.into_sourcemap();
    let mut buf: Vec<u8> = Vec::new();
    map.to_writer(&mut buf)?;
    // The writer only ever emits JSON text.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// A single point mapping entry (destination -> original source).
///
/// `dst_*` refers to the rewritten code. `src_*` refers to the original sources referenced by the
/// input sourcemap; `u32::MAX` means unmapped.
#[derive(Debug, Clone, Copy)]
struct Mapping<'a> {
    dst_line: u32,
    dst_col: u32,
    src_line: u32,
    src_col: u32,
    source: Option<&'a str>,
    name: Option<&'a str>,
}

/// Sort mappings by destination and keep one entry per destination position.
///
/// Mapped entries win over unmapped ones at the same position.
fn sort_and_dedup_mappings(mappings: &mut Vec<Mapping<'_>>) {
    mappings.sort_by(|a, b| {
        (a.dst_line, a.dst_col)
            .cmp(&(b.dst_line, b.dst_col))
            .then_with(|| match (a.src_line == u32::MAX, b.src_line == u32::MAX) {
                (false, true) => Ordering::Less,
                (true, false) => Ordering::Greater,
                _ => Ordering::Equal,
            })
    });
    mappings.dedup_by(|a, b| a.dst_line == b.dst_line && a.dst_col == b.dst_col);
}

/// For every output byte, the input byte it was copied from.
///
/// The result has the length the edits imply for the output.
fn output_origins(input_len: usize, edits: &[Edit]) -> Vec<usize> {
    let removed: usize = edits.iter().map(|e| e.end - e.start).sum();
    let added: usize = edits.iter().map(|e| e.replacement.len()).sum();
    let mut out_to_in = Vec::with_capacity((input_len + added).saturating_sub(removed));

    let mut in_cursor = 0usize;
    for e in edits {
        out_to_in.extend(in_cursor..e.start);
        out_to_in.extend_from_slice(&e.output_byte_to_input_byte);
        in_cursor = e.end;
    }
    out_to_in.extend(in_cursor..input_len);

    out_to_in
}

/// For every input byte, its position in the output, or `None` if it was removed.
fn input_destinations(input_len: usize, out_to_in: &[usize]) -> Vec<Option<usize>> {
    let mut in_to_out = vec![None; input_len];
    for (out_byte, &in_byte) in out_to_in.iter().enumerate() {
        if let Some(slot) = in_to_out.get_mut(in_byte) {
            slot.get_or_insert(out_byte);
        }
    }
    in_to_out
}

/// Output offsets that need their own mapping token.
///
/// These are the start of every output line, plus every byte that does not directly follow its
/// predecessor's origin in the input.
fn anchors<'a>(out_to_in: &'a [usize], line_starts: &'a [usize]) -> impl Iterator<Item = usize> + 'a {
    (0..out_to_in.len()).filter(move |&i| {
        i == 0
            || out_to_in[i] != out_to_in[i - 1] + 1
            || line_starts.binary_search(&i).is_ok()
    })
}
