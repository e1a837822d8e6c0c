use std::cell::RefCell;

use tree_sitter::Parser;

use crate::{Language, TransformError, alloc::ensure_tree_sitter_allocator};

fn new_parser(language: tree_sitter::Language, name: &str) -> RefCell<Parser> {
    ensure_tree_sitter_allocator();

    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .unwrap_or_else(|e| panic!("tree-sitter-{name} language load failed: {e}"));
    RefCell::new(parser)
}

thread_local! {
    /// Shared parser instances. We reuse them to avoid reloading the language for each call.
    static JAVASCRIPT_PARSER: RefCell<Parser> =
        new_parser(tree_sitter_javascript::LANGUAGE.into(), "javascript");

    static TYPESCRIPT_PARSER: RefCell<Parser> =
        new_parser(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(), "typescript");

    static TSX_PARSER: RefCell<Parser> =
        new_parser(tree_sitter_typescript::LANGUAGE_TSX.into(), "tsx");
}

/// Parse source code for the given language.
///
/// Syntax errors do not fail the parse; tree-sitter recovers and marks the affected subtrees,
/// which the rewrite rule then leaves alone.
pub fn parse(source: &str, language: Language) -> Result<tree_sitter::Tree, TransformError> {
    ensure_tree_sitter_allocator();

    let parser = match language {
        Language::JavaScript => &JAVASCRIPT_PARSER,
        Language::TypeScript => &TYPESCRIPT_PARSER,
        Language::Tsx => &TSX_PARSER,
    };

    parser
        .with(|p| p.borrow_mut().parse(source, None))
        .ok_or(TransformError::ParseFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_language() {
        let cases = [
            (Language::JavaScript, "const a = f(`x`);"),
            (Language::JavaScript, "const el = <div>{f(`x`)}</div>;"),
            (Language::TypeScript, "const a: string = f<string>(`x`);"),
            (Language::Tsx, "const el: JSX.Element = <div>{f(`x`)}</div>;"),
        ];
        for (language, src) in cases {
            let tree = parse(src, language).unwrap();
            assert_eq!(tree.root_node().kind(), "program");
            assert!(!tree.root_node().has_error(), "{language:?}: {src}");
        }
    }

    #[test]
    fn broken_input_still_produces_a_tree() {
        let tree = parse("TrimMultispaces(`a  b`", Language::TypeScript).unwrap();
        assert!(tree.root_node().has_error());
    }
}
