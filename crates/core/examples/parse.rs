use std::{fs, path::PathBuf};

use clap::Parser;
use trim_multispaces::{Language, parse::parse};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LanguageArg {
    Js,
    Ts,
    Tsx,
}

impl From<LanguageArg> for Language {
    fn from(value: LanguageArg) -> Self {
        match value {
            LanguageArg::Js => Language::JavaScript,
            LanguageArg::Ts => Language::TypeScript,
            LanguageArg::Tsx => Language::Tsx,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "parse")]
#[command(about = "Parse a source file with tree-sitter and print the CST", long_about = None)]
struct Args {
    /// Path to the source file to parse
    input: PathBuf,

    /// Override language instead of inferring from file extension
    #[arg(long, short)]
    language: Option<LanguageArg>,

    /// Print the tree in S-expression format instead of the default dump format
    #[arg(long, short)]
    sexp: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let language = match args.language {
        Some(lang) => lang.into(),
        None => Language::from_path(&args.input).ok_or_else(|| {
            std::io::Error::other(format!(
                "could not infer language from {}; pass --language",
                args.input.display()
            ))
        })?,
    };

    let source = fs::read_to_string(&args.input)?;
    let tree = parse(&source, language)?;
    let root = tree.root_node();

    if args.sexp {
        println!("{}", root.to_sexp());
    } else {
        dump_tree(&source, root, 0);
    }

    Ok(())
}

fn dump_tree(source: &str, node: tree_sitter::Node<'_>, depth: usize) {
    let indent = "  ".repeat(depth);
    let start = node.start_position();
    let end = node.end_position();

    let text_preview = node
        .utf8_text(source.as_bytes())
        .map(|t| t.replace('\n', "\\n"))
        .unwrap_or_else(|_| "<non-utf8>".to_string());

    let field = node
        .parent()
        .and_then(|p| {
            let mut cursor = p.walk();
            let index = p.children(&mut cursor).position(|c| c.id() == node.id())?;
            p.field_name_for_child(index as u32)
        })
        .map(|f| format!("{f}: "))
        .unwrap_or_default();

    println!(
        "{indent}{field}{kind} [{sb}..{eb}] ({sl}:{sc})..({el}:{ec}) \"{text}\"",
        kind = node.kind(),
        sb = node.start_byte(),
        eb = node.end_byte(),
        sl = start.row,
        sc = start.column,
        el = end.row,
        ec = end.column,
        text = truncate(&text_preview, 120),
    );

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        dump_tree(source, child, depth + 1);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }

    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}
