use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::Parser;
use trim_multispaces::{Language, TransformConfig, transform};

#[derive(Parser, Debug)]
#[command(name = "fixtures")]
#[command(about = "Create or validate fixture files", long_about = None)]
struct Args {
    /// Write fixtures instead of validating them
    #[arg(long, short)]
    write: bool,

    /// Path to the fixtures directory (defaults to "./fixtures")
    #[arg(long, default_value = "fixtures")]
    dir: PathBuf,
}

/// A fixture input and the paths its outputs live at.
struct Fixture {
    input: PathBuf,
    filename: String,
    language: Language,
    out: PathBuf,
    out_map: PathBuf,
}

impl Fixture {
    /// Returns `None` for expected-output files and unsupported extensions.
    fn from_path(dir: &Path, path: PathBuf) -> Option<Self> {
        let filename = path.file_name()?.to_str()?.to_string();
        if filename.contains(".out.") {
            return None;
        }
        let (basename, extension) = filename.rsplit_once('.')?;
        let language = Language::from_extension(extension)?;

        Some(Fixture {
            out: dir.join(format!("{basename}.out.{extension}")),
            out_map: dir.join(format!("{basename}.out.{extension}.map")),
            input: path,
            filename,
            language,
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    let cfg = TransformConfig::default();

    let mut fixtures = Vec::new();
    for entry in fs::read_dir(&args.dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(fixture) = Fixture::from_path(&args.dir, path) {
            fixtures.push(fixture);
        }
    }
    fixtures.sort_by(|a, b| a.input.cmp(&b.input));

    if args.write {
        println!("Creating fixtures...");
        for fixture in &fixtures {
            let source = fs::read_to_string(&fixture.input)?;
            let res = transform(&source, &fixture.filename, fixture.language, &cfg)?;

            fs::write(&fixture.out, &res.code)?;
            fs::write(&fixture.out_map, &res.map)?;

            println!(
                "  Created {} and {}",
                fixture.out.display(),
                fixture.out_map.display()
            );
        }
        println!("Done creating {} fixtures.", fixtures.len());
        return Ok(());
    }

    println!("Validating fixtures...");
    let mut mismatches = Vec::new();

    for fixture in &fixtures {
        let filename = fixture.filename.as_str();
        let source = fs::read_to_string(&fixture.input)?;
        let res = transform(&source, filename, fixture.language, &cfg)?;
        let before = mismatches.len();

        if fixture.out.exists() {
            if res.code.as_bytes() != fs::read(&fixture.out)? {
                mismatches.push(format!("{filename}: code mismatch"));
            }
        } else {
            mismatches.push(format!(
                "{filename}: missing output file {}",
                fixture.out.display()
            ));
        }

        // Sourcemaps are optional: only compared when one has been written.
        if fixture.out_map.exists() && res.map.as_bytes() != fs::read(&fixture.out_map)? {
            mismatches.push(format!("{filename}: sourcemap mismatch"));
        }

        if mismatches.len() == before {
            println!("  ✓ {filename}");
        }
    }

    if !mismatches.is_empty() {
        eprintln!("\nValidation failed:");
        for mismatch in &mismatches {
            eprintln!("  ✗ {mismatch}");
        }
        return Err(format!("{} validation error(s)", mismatches.len()).into());
    }

    println!("\nAll {} fixtures validated successfully!", fixtures.len());
    Ok(())
}
