//! CLI: check images for the 3×3 color-patch marker.
//!
//! Prints `"<path> <pct>%"` for every passing image and `"<path> 0%"` for
//! every failing one (plus a `marker_not_found <path> <CODE>` diagnostic
//! line in `--debug` mode). Exits 0 only when every given path was a valid
//! image and every image passed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

use patch_grid::{detect, DetectParams, SegmentationParams, Verdict};

const VALID_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Parser, Debug)]
#[command(name = "patch-grid", about = "3x3 color-patch marker detector")]
struct Cli {
    /// Image files to check (.png, .jpg, .jpeg).
    images: Vec<PathBuf>,

    /// Verbose diagnostics: failure codes, stage logging, summary.
    #[arg(long)]
    debug: bool,

    /// JSON file overriding the detection thresholds.
    #[arg(long, value_name = "FILE")]
    params: Option<PathBuf>,
}

fn load_params(path: Option<&PathBuf>) -> Result<DetectParams, String> {
    let Some(path) = path else {
        return Ok(DetectParams::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read params file {}: {e}", path.display()))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("cannot parse params file {}: {e}", path.display()))
}

fn has_valid_extension(path: &PathBuf) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            VALID_EXTENSIONS.iter().any(|v| *v == e)
        })
        .unwrap_or(false)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = patch_grid::core::init_with_level(level);

    let params = match load_params(cli.params.as_ref()) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    let seg = SegmentationParams::default();

    let mut any_fail = false;
    let mut valid_images = Vec::new();
    for path in &cli.images {
        if path.exists() && has_valid_extension(path) {
            valid_images.push(path.clone());
        } else {
            eprintln!("{} is not a valid picture address", path.display());
            any_fail = true;
        }
    }

    if valid_images.is_empty() {
        eprintln!("the program needs picture paths as arguments");
        return ExitCode::FAILURE;
    }

    let mut pass_count = 0usize;
    let mut fail_count = 0usize;

    for path in &valid_images {
        match detect::detect_marker_path(path, &seg, &params) {
            Ok(detection) => match detection.verdict {
                Verdict::Pass { percentage } => {
                    println!("{} {percentage}%", path.display());
                    pass_count += 1;
                }
                Verdict::Fail { reason } => {
                    if cli.debug {
                        println!("marker_not_found {} {}", path.display(), reason.short_code());
                    }
                    println!("{} 0%", path.display());
                    fail_count += 1;
                    any_fail = true;
                }
            },
            Err(err) => {
                eprintln!("failed_to_load {}: {err}", path.display());
                println!("{} 0%", path.display());
                fail_count += 1;
                any_fail = true;
            }
        }
    }

    if cli.debug {
        println!(
            "Summary: passed={pass_count} failed={fail_count} out of {}",
            pass_count + fail_count
        );
    }

    if any_fail {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
