//! Check command - Compile and parse every template under a directory

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use clap::Args;
use ignore::Walk;
use rayon::prelude::*;
use tessera_mosaic::{Representation, Source};

#[derive(Args)]
pub struct CheckArgs {
    /// Directory to search for .part / .md files
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Quiet mode - only show summary
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn run(args: CheckArgs) {
    let start = Instant::now();
    let files = collect_files(&args.dir);

    if files.is_empty() {
        eprintln!("No .part or .md files found in {}", args.dir.display());
        std::process::exit(1);
    }

    let failed = AtomicUsize::new(0);
    files.par_iter().for_each(|path| match check_file(path) {
        Ok(()) => {
            if !args.quiet {
                println!("  ok {}", path.display());
            }
        }
        Err(message) => {
            failed.fetch_add(1, Ordering::Relaxed);
            eprintln!("error {}: {}", path.display(), message);
        }
    });

    let failed = failed.into_inner();
    eprintln!(
        "Checked {} templates in {:.4}s: {} failed",
        files.len(),
        start.elapsed().as_secs_f64(),
        failed
    );
    if failed > 0 {
        std::process::exit(1);
    }
}

fn collect_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Walk::new(dir)
        .flatten()
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == "part" || ext == "md")
        })
        .collect();
    files.sort();
    files
}

/// Compile and parse one template.
fn check_file(path: &Path) -> Result<(), String> {
    let source = Source::read(path).map_err(|e| e.to_string())?;
    let artifact = source.compile().map_err(|e| e.to_string())?;
    let tag = path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    Representation::new(tag.as_ref(), artifact, None).map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_and_check() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("todo")).unwrap();
        std::fs::write(dir.path().join("todo/item.part"), "<li>{name}</li>").unwrap();
        std::fs::write(dir.path().join("about.md"), "# About").unwrap();
        std::fs::write(dir.path().join("broken.part"), "<p>{oops</p>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = collect_files(dir.path());
        assert_eq!(
            files,
            [
                dir.path().join("about.md"),
                dir.path().join("broken.part"),
                dir.path().join("todo/item.part"),
            ]
        );

        assert!(check_file(&files[0]).is_ok());
        assert!(check_file(&files[1]).is_err());
        assert!(check_file(&files[2]).is_ok());
    }

    #[test]
    fn test_script_errors_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gift.part");
        std::fs::write(&path, "interface Attributes { when: Date }\n<p></p>").unwrap();
        let message = check_file(&path).unwrap_err();
        assert!(message.contains("'Date'"), "{message}");
    }
}
