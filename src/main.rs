use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use irpeak::batch::{self, Overrides};
use irpeak::chart;
use irpeak::format;
use irpeak::models::{DetectionParams, DEFAULT_DISTANCE, DEFAULT_PROMINENCE};
use irpeak::peaks;
use irpeak::spectrum;

#[derive(Parser)]
#[command(name = "irpeak", about = "Peak detection and annotation for IR transmission spectra")]
struct Cli {
    /// CSV spectrum file, or a directory of CSV spectra to batch-process
    path: PathBuf,

    /// Output directory for charts and the batch summary
    #[arg(short, long, default_value = "IR_Output")]
    out: PathBuf,

    /// Minimum topographic prominence for a dip to count as a peak
    #[arg(long, default_value_t = DEFAULT_PROMINENCE)]
    prominence: f64,

    /// Minimum sample distance between retained peaks
    #[arg(long, default_value_t = DEFAULT_DISTANCE)]
    distance: usize,

    /// JSON file with per-filename parameter overrides (batch mode)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Emit JSON: print it in single-file mode, write peak_summary.json in batch mode
    #[arg(long)]
    json: bool,
}

fn run_single_file(path: &Path, params: DetectionParams, out_dir: &Path, json: bool) -> Result<()> {
    let spectrum = spectrum::load_spectrum(path)?;
    let peak_set = peaks::detect_peaks(&spectrum.transmission, params.prominence, params.distance);
    let markers = peaks::peak_markers(&spectrum, &peak_set);

    let report = irpeak::models::FileReport {
        filename: path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown")
            .to_string(),
        params,
        peak_count: peak_set.len(),
        peaks: peaks::rounded_peaks(&spectrum, &peak_set),
    };

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("spectrum");
    let chart_path = out_dir.join(format!("{stem}.png"));
    chart::render_chart(&spectrum, &markers, stem, &chart_path)?;
    eprintln!("Chart written to {}", chart_path.display());

    if json {
        println!("{}", format::format_json_report(&report));
    } else {
        println!("{}", format::format_report(&report));
    }

    Ok(())
}

fn run_batch_dir(
    path: &Path,
    out_dir: &Path,
    defaults: DetectionParams,
    overrides: &Overrides,
    json: bool,
) -> Result<()> {
    let summary = batch::run_batch(path, out_dir, defaults, overrides)?;

    if summary.records.is_empty() {
        eprintln!("No CSV files found in '{}'", path.display());
        return Ok(());
    }

    batch::save_summary(out_dir, &format::format_summary(&summary))?;
    if json {
        batch::save_summary_json(out_dir, &summary)?;
    }

    // Per-file failures live in the summary content; the batch itself
    // exits zero once the summary is written.
    eprintln!(
        "Done: {} succeeded, {} failed (out of {} total)",
        summary.succeeded,
        summary.failed,
        summary.records.len(),
    );
    eprintln!(
        "Summary written to {}",
        out_dir.join(batch::SUMMARY_FILENAME).display()
    );

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.prominence < 0.0 {
        anyhow::bail!("--prominence must be >= 0");
    }
    if cli.distance < 1 {
        anyhow::bail!("--distance must be at least 1");
    }

    let defaults = DetectionParams {
        prominence: cli.prominence,
        distance: cli.distance,
    };

    let overrides = match &cli.settings {
        Some(path) => batch::load_overrides(path)?,
        None => Overrides::new(),
    };

    if cli.path.is_file() {
        return run_single_file(&cli.path, defaults, &cli.out, cli.json);
    }

    if cli.path.is_dir() {
        return run_batch_dir(&cli.path, &cli.out, defaults, &overrides, cli.json);
    }

    anyhow::bail!("Path '{}' is not a file or directory", cli.path.display());
}
