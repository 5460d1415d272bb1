#[macro_use]
extern crate clap;

use clap::Arg;
use std::fs;
use std::path::{Path, PathBuf};

use tenasm::diag::Diagnostics;

#[derive(Debug)]
enum IoErrorContext {
    ReadSource,
    WritePreprocessed,
    WriteOutput,
}

#[derive(Debug)]
struct IoError {
    inner: std::io::Error,
    context: IoErrorContext,
    path: PathBuf,
}

impl IoError {
    fn new(context: IoErrorContext, path: PathBuf) -> impl FnOnce(std::io::Error) -> IoError {
        move |inner| IoError {
            inner,
            context,
            path,
        }
    }
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} file \"{}\" failed: {}",
            match self.context {
                IoErrorContext::ReadSource => "Reading source",
                IoErrorContext::WritePreprocessed => "Writing preprocessed",
                IoErrorContext::WriteOutput => "Writing output",
            },
            self.path.display(),
            self.inner
        )
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("SOURCES")
                .help("Base names of the .as source files to assemble")
                .multiple(true)
                .index(1),
        )
        .get_matches();

    let sources: Vec<&str> = matches
        .values_of("SOURCES")
        .map(Iterator::collect)
        .unwrap_or_default();

    if sources.is_empty() {
        eprintln!("No source files were given to the assembler.");
        return;
    }

    // One bad file never stops the rest.
    for base in sources {
        if let Err(err) = assemble_file(base) {
            eprintln!("{}", err);
        }
    }
}

fn report(path: &Path, diags: &Diagnostics) {
    for diag in diags.iter() {
        eprintln!("{}: {}", path.display(), diag);
    }
}

fn assemble_file(base: &str) -> Result<(), IoError> {
    let source_path = PathBuf::from(format!("{}.as", base));
    let source = fs::read_to_string(&source_path)
        .map_err(IoError::new(IoErrorContext::ReadSource, source_path.clone()))?;

    // The expanded stream is written out even when macro expansion failed;
    // it only survives on disk if the whole file assembles.
    let am_path = PathBuf::from(format!("{}.am", base));
    let (expanded, macro_diags) = tenasm::preprocess(&source);
    fs::write(&am_path, &expanded)
        .map_err(IoError::new(IoErrorContext::WritePreprocessed, am_path.clone()))?;

    report(&source_path, &macro_diags);
    if macro_diags.has_errors() {
        abandon(&source_path, &am_path);
        return Ok(());
    }

    let (artifacts, diags) = tenasm::translate(&expanded);
    report(&am_path, &diags);

    let artifacts = match artifacts {
        Some(artifacts) => artifacts,
        None => {
            abandon(&source_path, &am_path);
            return Ok(());
        }
    };

    let ob_path = PathBuf::from(format!("{}.ob", base));
    tenobj::write_object_file(&ob_path, &artifacts.object)
        .map_err(IoError::new(IoErrorContext::WriteOutput, ob_path))?;

    if !artifacts.entries.is_empty() {
        let ent_path = PathBuf::from(format!("{}.ent", base));
        tenobj::write_records_file(&ent_path, &artifacts.entries)
            .map_err(IoError::new(IoErrorContext::WriteOutput, ent_path))?;
    }

    if !artifacts.externals.is_empty() {
        let ext_path = PathBuf::from(format!("{}.ext", base));
        tenobj::write_records_file(&ext_path, &artifacts.externals)
            .map_err(IoError::new(IoErrorContext::WriteOutput, ext_path))?;
    }

    Ok(())
}

fn abandon(source_path: &Path, am_path: &Path) {
    eprintln!(
        "Could not finish assembling \"{}\"; no output was produced.",
        source_path.display()
    );
    let _ = fs::remove_file(am_path);
}
