use std::{borrow::Cow, fs, path::PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;
use trim_multispaces::{
    DEFAULT_CALLEE, Language as LanguageInner, TransformConfig, transform,
    transform_no_sourcemap, transform_with_sourcemap,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Language {
    Js,
    Ts,
    Tsx,
}

impl From<Language> for LanguageInner {
    fn from(value: Language) -> Self {
        match value {
            Language::Js => LanguageInner::JavaScript,
            Language::Ts => LanguageInner::TypeScript,
            Language::Tsx => LanguageInner::Tsx,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "trim")]
#[command(about = "Replace TrimMultispaces(`...`) calls with their space-collapsed template literal", long_about = None)]
struct Args {
    /// Path to the source file to transform
    input: PathBuf,

    /// Output path for transformed source (defaults to stdout)
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// Output path for the sourcemap (defaults to <out>.map if --out is provided)
    #[arg(long)]
    out_sourcemap: Option<PathBuf>,

    /// Existing sourcemap for the input, to be carried through the rewrite
    #[arg(long)]
    in_sourcemap: Option<PathBuf>,

    /// Override language instead of inferring from file extension
    #[arg(long, short)]
    language: Option<Language>,

    /// Name of the function whose calls are rewritten
    #[arg(long, default_value = DEFAULT_CALLEE)]
    callee: String,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let source = fs::read_to_string(&args.input)?;

    let language: LanguageInner = match args.language {
        Some(lang) => lang.into(),
        None => LanguageInner::from_path(&args.input).ok_or_else(|| {
            std::io::Error::other(format!(
                "could not infer language from {}; pass --language",
                args.input.display()
            ))
        })?,
    };

    let cfg = TransformConfig {
        callee: Cow::Owned(args.callee),
    };

    let out_map_path = args.out_sourcemap.clone().or_else(|| {
        args.out
            .as_ref()
            .map(|out| PathBuf::from(format!("{}.map", out.display())))
    });

    let out_code = match (out_map_path, &args.in_sourcemap) {
        (Some(out_map_path), Some(in_map_path)) => {
            let in_map = fs::read_to_string(in_map_path)?;
            let res = transform_with_sourcemap(&source, &in_map, language, &cfg)?;
            fs::write(out_map_path, res.map)?;
            res.code
        }
        (Some(out_map_path), None) => {
            let source_name = args
                .input
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or("input file must have a valid filename")?;
            let res = transform(&source, source_name, language, &cfg)?;
            fs::write(out_map_path, res.map)?;
            res.code
        }
        (None, _) => transform_no_sourcemap(&source, language, &cfg)?,
    };

    match &args.out {
        None => {
            print!("{out_code}");
        }
        Some(out) => {
            fs::write(out, out_code)?;
        }
    }

    Ok(())
}
