//! Rebuilt template literals.
//!
//! A [`TemplateLiteral`] is the replacement produced for a matched call: a head text segment
//! followed by `(expression, trailing segment)` spans. Text segments hold rewritten raw source
//! text; expressions are handles into the original parse tree and are reproduced byte for byte.
//!
//! Every byte of a rendered literal remembers the input byte it came from, so the traversal can
//! turn the replacement into an [`Edit`](crate::edit::Edit) with a complete origin map.

use tree_sitter::Node;

/// Where a trailing text segment sits inside its template literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentPosition {
    /// Followed by another `${ ... }` substitution.
    Interior,
    /// The last segment, closed by the final backtick.
    Terminator,
}

impl SegmentPosition {
    /// Position of the span at `index` in a literal with `count` spans.
    pub fn for_index(index: usize, count: usize) -> Self {
        if index + 1 == count {
            SegmentPosition::Terminator
        } else {
            SegmentPosition::Interior
        }
    }
}

/// Raw template text after space collapsing, with per-byte origins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSegment {
    text: String,
    /// For each byte of `text`, the input byte offset it was copied from.
    origins: Vec<usize>,
}

impl TextSegment {
    pub fn text(&self) -> &str {
        &self.text
    }

    fn push(&mut self, raw: &str, range: std::ops::Range<usize>, origin: usize) {
        self.text.push_str(&raw[range.clone()]);
        self.origins.extend(range.map(|i| origin + i));
    }

    /// Push text that has no byte-for-byte counterpart in the input; every byte maps to `at`.
    fn push_spelled(&mut self, text: &str, at: usize) {
        self.text.push_str(text);
        self.origins.extend(std::iter::repeat_n(at, text.len()));
    }

    fn append(&mut self, other: &TextSegment) {
        self.text.push_str(&other.text);
        self.origins.extend_from_slice(&other.origins);
    }
}

/// One lexical unit of raw template text, classified by what it cooks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    /// A literal space, or an escape that cooks to U+0020.
    Space,
    /// A line continuation: backslash plus line terminator, which cooks to nothing.
    Continuation,
    Other,
}

/// Classify the unit starting at byte `i` and return it with its width in bytes.
///
/// `i` must be on a char boundary; the returned width keeps it there.
fn unit_at(raw: &str, i: usize) -> (Unit, usize) {
    match raw.as_bytes()[i] {
        b' ' => (Unit::Space, 1),
        b'\\' => {
            let rest = &raw[i + 1..];
            if rest.starts_with(' ') {
                (Unit::Space, 2)
            } else if rest.starts_with("x20") {
                (Unit::Space, 4)
            } else if rest.starts_with("u0020") {
                (Unit::Space, 6)
            } else if let Some(len) = braced_space_escape(rest) {
                (Unit::Space, 1 + len)
            } else if rest.starts_with("\r\n") {
                (Unit::Continuation, 3)
            } else if let Some(c) = rest.chars().next() {
                let unit = match c {
                    '\n' | '\r' | '\u{2028}' | '\u{2029}' => Unit::Continuation,
                    _ => Unit::Other,
                };
                (unit, 1 + c.len_utf8())
            } else {
                (Unit::Other, 1)
            }
        }
        _ => (Unit::Other, raw[i..].chars().next().map_or(1, char::len_utf8)),
    }
}

/// Width of a `u{...}` escape body at the start of `rest` whose code point is U+0020.
fn braced_space_escape(rest: &str) -> Option<usize> {
    let digits = rest.strip_prefix("u{")?;
    let close = digits.find('}')?;
    let hex = &digits[..close];
    let is_space = !hex.is_empty()
        && hex.bytes().all(|b| b.is_ascii_hexdigit())
        && hex.trim_start_matches('0') == "20";
    is_space.then_some(2 + close + 1)
}

/// Remove every run of two or more spaces from `raw` template text.
///
/// `origin` is the input byte offset of `raw[0]`. Runs are counted on what the text cooks to:
/// escapes of U+0020 (`\ `, `\x20`, `\u0020`, `\u{20}`) are spaces, line continuations are
/// transparent, and every other escape is copied as a unit. A removed run takes its escapes and
/// any continuations between its spaces with it. Single spaces survive, as does all other
/// whitespace.
///
/// Removing a run must not change how its neighbours lex. `$` directly before `{` would open a
/// substitution and is kept as `\$`; `\0` directly before a digit would become a legacy octal
/// escape and is kept as `\x00`.
pub fn collapse_spaces(raw: &str, origin: usize) -> TextSegment {
    let bytes = raw.as_bytes();
    let mut segment = TextSegment {
        text: String::with_capacity(raw.len()),
        origins: Vec::with_capacity(raw.len()),
    };

    // Unchanged bytes are copied in one go; `keep_from` marks the start of the pending stretch.
    let mut keep_from = 0usize;
    // Start of the unit just before `i`, if it was not part of a run.
    let mut prev: Option<usize> = None;
    let mut i = 0usize;
    while i < bytes.len() {
        let (unit, width) = unit_at(raw, i);
        if unit != Unit::Space {
            prev = Some(i);
            i += width;
            continue;
        }

        let start = i;
        let mut spaces = 0usize;
        let mut end = i;
        let mut j = i;
        while j < bytes.len() {
            let (unit, width) = unit_at(raw, j);
            match unit {
                Unit::Space => {
                    spaces += 1;
                    j += width;
                    end = j;
                }
                Unit::Continuation => j += width,
                Unit::Other => break,
            }
        }

        if spaces >= 2 {
            let next = bytes.get(end).copied();
            match prev.map(|p| &raw[p..start]) {
                Some("$") if next == Some(b'{') => {
                    segment.push(raw, keep_from..start - 1, origin);
                    segment.push_spelled(r"\$", origin + start - 1);
                }
                Some(r"\0") if next.is_some_and(|b| b.is_ascii_digit()) => {
                    segment.push(raw, keep_from..start - 2, origin);
                    segment.push_spelled(r"\x00", origin + start - 2);
                }
                _ => segment.push(raw, keep_from..start, origin),
            }
            keep_from = end;
        }
        prev = None;
        i = end;
    }
    segment.push(raw, keep_from..bytes.len(), origin);

    segment
}

/// One `${ expression }` substitution and the text segment after it.
#[derive(Debug, Clone)]
pub struct TemplateSpan<'tree> {
    substitution: Node<'tree>,
    literal: TextSegment,
    position: SegmentPosition,
}

impl<'tree> TemplateSpan<'tree> {
    /// `substitution` is the original `template_substitution` node, reused as is.
    pub fn new(substitution: Node<'tree>, literal: TextSegment, position: SegmentPosition) -> Self {
        Self {
            substitution,
            literal,
            position,
        }
    }

    /// The interpolated expression inside `${ ... }`.
    pub fn expression(&self) -> Option<Node<'tree>> {
        let mut cursor = self.substitution.walk();
        self.substitution
            .named_children(&mut cursor)
            .find(|n| n.kind() != "comment")
    }

    pub fn literal(&self) -> &TextSegment {
        &self.literal
    }

    pub fn position(&self) -> SegmentPosition {
        self.position
    }
}

/// A template literal rebuilt from rewritten segments.
#[derive(Debug, Clone)]
pub struct TemplateLiteral<'tree> {
    /// Input offset of the opening backtick.
    open: usize,
    /// Input offset of the closing backtick.
    close: usize,
    head: TextSegment,
    spans: Vec<TemplateSpan<'tree>>,
}

impl<'tree> TemplateLiteral<'tree> {
    pub fn new(open: usize, close: usize, head: TextSegment, spans: Vec<TemplateSpan<'tree>>) -> Self {
        Self {
            open,
            close,
            head,
            spans,
        }
    }

    pub fn head(&self) -> &TextSegment {
        &self.head
    }

    pub fn spans(&self) -> &[TemplateSpan<'tree>] {
        &self.spans
    }

    /// Render the literal as source text.
    ///
    /// Returns `(text, origins)` where `origins[i]` is the input byte that produced `text[i]`.
    /// Substitutions are copied from `source` verbatim, including any whitespace or comments
    /// inside `${ ... }`.
    pub fn render(&self, source: &str) -> (String, Vec<usize>) {
        let mut out = TextSegment::default();

        out.push(source, self.open..self.open + 1, 0);
        out.append(&self.head);
        for span in &self.spans {
            out.push(source, span.substitution.byte_range(), 0);
            out.append(&span.literal);
        }
        out.push(source, self.close..self.close + 1, 0);

        (out.text, out.origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collapse(raw: &str) -> String {
        collapse_spaces(raw, 0).text
    }

    #[test]
    fn removes_runs_of_two_or_more() {
        assert_eq!(collapse("a  b"), "ab");
        assert_eq!(collapse("a   b    c"), "abc");
        assert_eq!(collapse("  lead"), "lead");
        assert_eq!(collapse("trail  "), "trail");
    }

    #[test]
    fn keeps_single_spaces() {
        assert_eq!(collapse("a b c"), "a b c");
        assert_eq!(collapse(" "), " ");
        assert_eq!(collapse(""), "");
    }

    #[test]
    fn leaves_other_whitespace_alone() {
        assert_eq!(collapse("a\t\tb"), "a\t\tb");
        assert_eq!(collapse("a\n    b"), "a\nb");
        assert_eq!(collapse("a \t b"), "a \t b");
        assert_eq!(collapse("\n  \n"), "\n\n");
    }

    #[test]
    fn escaped_spaces_count_towards_runs() {
        assert_eq!(collapse(r"a\ b"), r"a\ b");
        assert_eq!(collapse(r"a\x20b"), r"a\x20b");
        assert_eq!(collapse(r"a\x20\x20b"), "ab");
        assert_eq!(collapse(r"a\u0020\u0020b"), "ab");
        assert_eq!(collapse(r"a \u{20}b"), "ab");
        assert_eq!(collapse(r"a\u{0020}\u{20}b"), "ab");
        assert_eq!(collapse(r"keep\  x"), "keepx");
        assert_eq!(collapse(r"keep\ this\   one"), r"keep\ thisone");
    }

    #[test]
    fn other_escapes_are_copied_whole() {
        assert_eq!(collapse(r"\\  x"), r"\\x");
        assert_eq!(collapse(r"a\t\tb"), r"a\t\tb");
        assert_eq!(collapse(r"\x21  \u{21}"), r"\x21\u{21}");
        assert_eq!(collapse(r"\x2020"), r"\x2020");
        assert_eq!(collapse(r"end\"), r"end\");
    }

    #[test]
    fn line_continuations_do_not_break_runs() {
        assert_eq!(collapse("a \\\n b"), "ab");
        assert_eq!(collapse("a \\\r\n b"), "ab");
        assert_eq!(collapse("a\\\n  b"), "a\\\nb");
        assert_eq!(collapse("a \\\nb"), "a \\\nb");
        assert_eq!(collapse("a  \\\nb"), "a\\\nb");
    }

    #[test]
    fn removal_does_not_create_new_syntax() {
        assert_eq!(collapse("$  {x}"), r"\${x}");
        assert_eq!(collapse("$  x"), "$x");
        assert_eq!(collapse(r"\0  1"), r"\x001");
        assert_eq!(collapse(r"\0  a"), r"\0a");
    }

    #[test]
    fn spelled_escapes_map_to_the_replaced_bytes() {
        let seg = collapse_spaces("a$  {", 10);
        assert_eq!(seg.text(), r"a\${");
        assert_eq!(seg.origins, vec![10, 11, 11, 14]);
    }

    #[test]
    fn multibyte_text_survives() {
        assert_eq!(collapse("日本  語"), "日本語");
        assert_eq!(collapse(r"\日  x"), r"\日x");
    }

    #[test]
    fn collapse_is_idempotent() {
        for raw in [
            "a  b",
            "   ",
            "a \n  b\t  c",
            r"x\   y",
            "  日  本  ",
            r"a\x20 \u0020b",
            "$  {x}",
            r"\0  7",
        ] {
            let once = collapse(raw);
            assert_eq!(collapse(&once), once, "not idempotent: {raw:?}");
        }
    }

    #[test]
    fn origins_skip_removed_bytes() {
        let seg = collapse_spaces("a  b c", 10);
        assert_eq!(seg.text(), "ab c");
        assert_eq!(seg.origins, vec![10, 13, 14, 15]);
    }

    #[test]
    fn segment_position_follows_index() {
        assert_eq!(SegmentPosition::for_index(0, 1), SegmentPosition::Terminator);
        assert_eq!(SegmentPosition::for_index(0, 3), SegmentPosition::Interior);
        assert_eq!(SegmentPosition::for_index(1, 3), SegmentPosition::Interior);
        assert_eq!(SegmentPosition::for_index(2, 3), SegmentPosition::Terminator);
    }

    #[test]
    fn renders_literal_without_substitutions() {
        let source = "`a  b`";
        let literal = TemplateLiteral::new(0, 5, collapse_spaces("a  b", 1), Vec::new());
        let (text, origins) = literal.render(source);
        assert_eq!(text, "`ab`");
        assert_eq!(origins, vec![0, 1, 4, 5]);
    }
}
