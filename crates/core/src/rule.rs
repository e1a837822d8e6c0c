//! The `TrimMultispaces` rewrite rule.
//!
//! A [`Rule`] looks at one node at a time and either hands back a replacement or asks the
//! traversal to keep going into the node's children. Rules never walk the tree themselves; the
//! driver in [`traverse`](crate::traverse) owns the descent.
//!
//! [`TrimMultispaces`] matches ``TrimMultispaces(`...`)``: a call whose callee is a bare
//! identifier with exactly that name and whose single argument is a template literal. The call
//! is replaced by the literal with every run of two or more spaces removed from its text
//! segments. Anything else, including near misses such as a member-access callee, a second
//! argument, or a tagged template, is passed through without comment.

use tree_sitter::Node;

use crate::template::{SegmentPosition, TemplateLiteral, TemplateSpan, collapse_spaces};

/// Outcome of offering one node to a [`Rule`].
#[derive(Debug)]
pub enum Visit<'tree> {
    /// Replace the node with this literal and do not descend into the original.
    Replace(TemplateLiteral<'tree>),
    /// Keep the node and visit its children.
    Descend,
}

/// A node-to-node rewrite applied during a single depth-first pass.
pub trait Rule {
    fn visit<'tree>(&self, node: Node<'tree>, source: &str) -> Visit<'tree>;
}

/// Rewrites ``TrimMultispaces(`...`)`` calls into their space-collapsed template literal.
#[derive(Debug, Clone, Copy)]
pub struct TrimMultispaces<'a> {
    callee: &'a str,
}

impl<'a> TrimMultispaces<'a> {
    /// Match calls to `callee` instead of the default `TrimMultispaces`.
    pub fn new(callee: &'a str) -> Self {
        Self { callee }
    }

    /// Returns the template literal argument if `node` is a matching call.
    fn matched_argument<'tree>(&self, node: Node<'tree>, source: &str) -> Option<Node<'tree>> {
        if node.kind() != "call_expression" || node.has_error() {
            return None;
        }

        let callee = node.child_by_field_name("function")?;
        if callee.kind() != "identifier" || callee.utf8_text(source.as_bytes()).ok()? != self.callee
        {
            return None;
        }

        // Tagged templates put the template itself in the `arguments` field.
        let arguments = node.child_by_field_name("arguments")?;
        if arguments.kind() != "arguments" {
            return None;
        }

        let mut cursor = arguments.walk();
        let mut args = arguments
            .named_children(&mut cursor)
            .filter(|n| n.kind() != "comment");
        let arg = args.next()?;
        if args.next().is_some() || arg.kind() != "template_string" {
            return None;
        }
        Some(arg)
    }
}

impl Default for TrimMultispaces<'static> {
    fn default() -> Self {
        Self::new(crate::DEFAULT_CALLEE)
    }
}

impl Rule for TrimMultispaces<'_> {
    fn visit<'tree>(&self, node: Node<'tree>, source: &str) -> Visit<'tree> {
        match self
            .matched_argument(node, source)
            .and_then(|template| rebuild_template(template, source))
        {
            Some(literal) => Visit::Replace(literal),
            None => Visit::Descend,
        }
    }
}

/// Rebuild a `template_string` node with collapsed text segments.
///
/// Segment boundaries come from byte ranges: the head runs from after the opening backtick to
/// the first `${`, and each trailing segment from a substitution's `}` to the next `${` or the
/// closing backtick.
fn rebuild_template<'tree>(template: Node<'tree>, source: &str) -> Option<TemplateLiteral<'tree>> {
    let bytes = source.as_bytes();
    let open = template.start_byte();
    let close = template.end_byte().checked_sub(1)?;
    if close <= open || bytes.get(open) != Some(&b'`') || bytes.get(close) != Some(&b'`') {
        return None;
    }

    let mut cursor = template.walk();
    let substitutions: Vec<Node<'tree>> = template
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "template_substitution")
        .collect();

    let head_end = substitutions.first().map_or(close, |n| n.start_byte());
    let head = collapse_spaces(source.get(open + 1..head_end)?, open + 1);

    let count = substitutions.len();
    let mut spans = Vec::with_capacity(count);
    for (index, substitution) in substitutions.iter().enumerate() {
        let start = substitution.end_byte();
        let end = substitutions.get(index + 1).map_or(close, |n| n.start_byte());
        let literal = collapse_spaces(source.get(start..end)?, start);
        spans.push(TemplateSpan::new(
            *substitution,
            literal,
            SegmentPosition::for_index(index, count),
        ));
    }

    Some(TemplateLiteral::new(open, close, head, spans))
}
