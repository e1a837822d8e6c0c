//! Depth-first traversal that applies a [`Rule`] to a parsed tree.
//!
//! The traversal plays the part of a compiler host: it offers every node to the rule in
//! pre-order, and the rule answers "replace" or "descend". A replacement becomes an [`Edit`]
//! covering the node's byte range, and the walk skips the replaced subtree entirely. Otherwise
//! the walk continues into the node's children.
//!
//! Because replaced subtrees are never entered, the collected edits are already in ascending
//! order and never overlap.
//!
//! A replacement starts with a backtick. Spliced at the start of a statement that follows one
//! ended by automatic semicolon insertion, it would continue that statement as a tagged
//! template, so such replacements are prefixed with `;`.

use tree_sitter::Node;

use crate::{
    edit::Edit,
    rule::{Rule, Visit},
};

/// Walk the tree rooted at `root` and collect one edit per replaced node.
pub fn collect_edits(source: &str, root: Node<'_>, rule: &dyn Rule) -> Vec<Edit> {
    let mut edits: Vec<Edit> = Vec::new();

    // Iterative traversal over a TreeCursor: no recursion, and no child indexing.
    let mut cursor = root.walk();
    'walk: loop {
        let node = cursor.node();

        let descend = match rule.visit(node, source) {
            Visit::Replace(literal) => {
                let (mut replacement, mut output_byte_to_input_byte) = literal.render(source);
                if follows_unterminated_statement(node, source) {
                    replacement.insert(0, ';');
                    output_byte_to_input_byte.insert(0, node.start_byte());
                }
                tracing::trace!(
                    start = node.start_byte(),
                    end = node.end_byte(),
                    replacement = %replacement,
                    "replacing node"
                );
                edits.push(Edit {
                    start: node.start_byte(),
                    end: node.end_byte(),
                    replacement,
                    output_byte_to_input_byte,
                });
                false
            }
            Visit::Descend => true,
        };

        if descend && cursor.goto_first_child() {
            continue;
        }

        // Otherwise, move to the next sibling, or walk up until we can.
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }

    edits
}

/// Whether `node` starts an expression statement whose previous statement has no `;`.
fn follows_unterminated_statement(node: Node<'_>, source: &str) -> bool {
    // Climb while `node` is the leftmost part of its parent.
    let mut edge = node;
    let statement = loop {
        let Some(parent) = edge.parent() else {
            return false;
        };
        if parent.start_byte() != node.start_byte() {
            return false;
        }
        if parent.kind() == "expression_statement" {
            break parent;
        }
        edge = parent;
    };

    // Only statement lists; `if (c) f()` and friends have no previous statement.
    if !matches!(
        statement.parent().map(|p| p.kind()),
        Some("program" | "statement_block" | "switch_case" | "switch_default")
    ) {
        return false;
    }

    let mut prev = statement.prev_named_sibling();
    while let Some(comment) = prev.filter(|p| p.kind() == "comment") {
        prev = comment.prev_named_sibling();
    }
    let Some(prev) = prev else {
        return false;
    };
    if !(prev.kind().ends_with("statement") || prev.kind().ends_with("declaration")) {
        return false;
    }
    source.as_bytes()[..prev.end_byte()].last() != Some(&b';')
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;
    use tree_sitter::Node;

    use super::*;
    use crate::{Language, parse::parse, rule::TrimMultispaces};

    fn edits_for(src: &str) -> Vec<Edit> {
        let tree = parse(src, Language::TypeScript).unwrap();
        collect_edits(src, tree.root_node(), &TrimMultispaces::default())
    }

    /// Records every node kind it is offered and never replaces anything.
    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<String>>,
    }

    impl Rule for Recorder {
        fn visit<'tree>(&self, node: Node<'tree>, _source: &str) -> Visit<'tree> {
            self.seen.borrow_mut().push(node.kind().to_string());
            Visit::Descend
        }
    }

    #[test]
    fn offers_every_node_in_pre_order() {
        let src = "f(a);";
        let tree = parse(src, Language::JavaScript).unwrap();
        let recorder = Recorder::default();
        let edits = collect_edits(src, tree.root_node(), &recorder);
        assert!(edits.is_empty());

        let seen = recorder.seen.into_inner();
        assert_eq!(seen.first().map(String::as_str), Some("program"));
        let call = seen.iter().position(|k| k == "call_expression").unwrap();
        let args = seen.iter().position(|k| k == "arguments").unwrap();
        assert!(call < args);
        assert!(seen.iter().any(|k| k == "identifier"));
    }

    #[test]
    fn replaced_call_covers_whole_node() {
        let src = "x = TrimMultispaces(`a  b`);";
        let edits = edits_for(src);
        assert_eq!(edits.len(), 1);
        assert_eq!(&src[edits[0].start..edits[0].end], "TrimMultispaces(`a  b`)");
        assert_eq!(edits[0].replacement, "`ab`");
    }

    #[test]
    fn finds_calls_nested_in_other_calls() {
        let src = "log(TrimMultispaces(`a  b`), other(TrimMultispaces(`c  d`)));";
        let edits = edits_for(src);
        let replacements: Vec<_> = edits.iter().map(|e| e.replacement.as_str()).collect();
        assert_eq!(replacements, vec!["`ab`", "`cd`"]);
        assert!(edits[0].end <= edits[1].start);
    }

    #[test]
    fn does_not_descend_into_replaced_calls() {
        // The inner call sits inside an interpolation of a matched call and is carried through
        // with the outer literal as written.
        let src = "TrimMultispaces(`a  ${TrimMultispaces(`b  c`)}  d`);";
        let edits = edits_for(src);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].replacement, "`a${TrimMultispaces(`b  c`)}d`");
    }

    #[test]
    fn descends_into_unmatched_calls() {
        let src = "TrimMultispaces(`a`, TrimMultispaces(`b  c`));";
        let edits = edits_for(src);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].replacement, "`bc`");
    }

    #[test]
    fn guards_statements_after_automatic_semicolons() {
        let src = "const a = b\nTrimMultispaces(`x  y`).length\n";
        let edits = edits_for(src);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].replacement, ";`xy`");
        assert_eq!(edits[0].output_byte_to_input_byte[0], edits[0].start);

        let src = "if (c) b\n// note\nTrimMultispaces(`x  y`)";
        assert_eq!(edits_for(src)[0].replacement, ";`xy`");

        let src = "function f() {\n  g()\n  TrimMultispaces(`x  y`)\n}";
        assert_eq!(edits_for(src)[0].replacement, ";`xy`");
    }

    #[test]
    fn no_guard_when_the_statement_cannot_continue() {
        for src in [
            "const a = b;\nTrimMultispaces(`x  y`).length;",
            "TrimMultispaces(`x  y`);",
            "{ TrimMultispaces(`x  y`) }",
            "if (c) TrimMultispaces(`x  y`)",
            "for (;;i++) TrimMultispaces(`x  y`)",
            "const a = b\nconst c = TrimMultispaces(`x  y`)",
            "a\nf(TrimMultispaces(`x  y`))",
        ] {
            let edits = edits_for(src);
            assert_eq!(edits.len(), 1, "{src:?}");
            assert_eq!(edits[0].replacement, "`xy`", "{src:?}");
        }
    }

    #[test]
    fn templates_inside_unmatched_template_are_visited() {
        let src = "const s = `outer  ${TrimMultispaces(`in  ner`)}`;";
        let edits = edits_for(src);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].replacement, "`inner`");
    }
}
