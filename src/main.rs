use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use bgcut::{BatchConfig, BatchRunner, GrabCutSegmenter};

mod gui;

/// Batch background remover. Without arguments the GUI opens; passing both
/// folders runs the same pipeline headless.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input folder scanned for .jpg files (headless mode).
    #[arg(short, long, requires = "output")]
    input: Option<PathBuf>,

    /// Output folder for the white-composited images (headless mode).
    #[arg(short, long, requires = "input")]
    output: Option<PathBuf>,

    /// Tolerance on the slider scale (0-100), mapped internally to 0.0-1.0.
    #[arg(short, long, default_value_t = 50, value_parser = parse_tolerance)]
    tolerance: u8,
}

fn parse_tolerance(s: &str) -> std::result::Result<u8, String> {
    let value: u8 = s
        .parse()
        .map_err(|_| format!("`{s}` is not an integer"))?;
    if value > 100 {
        return Err("tolerance must be between 0 and 100".to_string());
    }
    Ok(value)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match (cli.input, cli.output) {
        (Some(input), Some(output)) => run_headless(input, output, cli.tolerance),
        _ => gui::run().map_err(|e| anyhow!("GUI failed: {e}")),
    }
}

fn run_headless(input: PathBuf, output: PathBuf, tolerance: u8) -> Result<()> {
    let config = BatchConfig::from_slider(input, output, tolerance);
    let runner = BatchRunner::new(GrabCutSegmenter, config);

    let progress_bar = ProgressBar::new(100);
    progress_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed}] [{bar:40.cyan/blue}] {percent}% ({eta})",
        )?
        .progress_chars("#>-"),
    );

    let summary = runner.run(|percent| progress_bar.set_position(percent.round() as u64))?;
    progress_bar.finish();

    println!(
        "Processed {} of {} images ({} skipped)",
        summary.processed, summary.total, summary.skipped
    );
    Ok(())
}
