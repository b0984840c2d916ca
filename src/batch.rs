use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::chart;
use crate::models::{DetectionParams, FileRecord, FileReport, RunSummary};
use crate::peaks;
use crate::spectrum;

pub const SUMMARY_FILENAME: &str = "peak_summary.txt";
pub const SUMMARY_JSON_FILENAME: &str = "peak_summary.json";

/// Per-file parameter overrides, keyed by exact filename.
pub type Overrides = HashMap<String, DetectionParams>;

fn is_spectrum_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Scan a directory for CSV spectrum files (non-recursive), sorted by filename.
pub fn scan_spectrum_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_spectrum_file(path))
        .collect();
    files.sort();
    Ok(files)
}

/// Load a per-file settings table from a JSON file:
/// `{ "sample.csv": { "prominence": 0.03, "distance": 15 }, ... }`
pub fn load_overrides(path: &Path) -> Result<Overrides> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse settings file: {}", path.display()))
}

/// Resolve the parameters for one file: the override table wins on an exact
/// filename match, otherwise the run-wide defaults apply. Checked once per
/// file, before detection.
pub fn resolve_params(
    path: &Path,
    defaults: DetectionParams,
    overrides: &Overrides,
) -> (DetectionParams, bool) {
    let filename = path.file_name().and_then(|name| name.to_str());
    match filename.and_then(|name| overrides.get(name)) {
        Some(&params) => (params, true),
        None => (defaults, false),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("spectrum")
        .to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Run the full pipeline for one file: load, detect, report, render.
/// The chart lands in `out_dir` as `<stem>.png`.
pub fn process_file(
    path: &Path,
    params: DetectionParams,
    out_dir: &Path,
) -> Result<FileReport> {
    let spectrum = spectrum::load_spectrum(path)?;
    let peak_set = peaks::detect_peaks(&spectrum.transmission, params.prominence, params.distance);
    let rounded = peaks::rounded_peaks(&spectrum, &peak_set);
    let markers = peaks::peak_markers(&spectrum, &peak_set);

    let stem = file_stem(path);
    let chart_path = out_dir.join(format!("{stem}.png"));
    chart::render_chart(&spectrum, &markers, &stem, &chart_path)?;

    Ok(FileReport {
        filename: file_name(path),
        params,
        peak_count: peak_set.len(),
        peaks: rounded,
    })
}

/// Process every CSV file in `input_dir`, isolating per-file failures.
///
/// Every file ends up as exactly one record, success or failure; a bad file
/// never aborts the batch. Returns the summary with an empty record list
/// when no CSV files were found.
pub fn run_batch(
    input_dir: &Path,
    out_dir: &Path,
    defaults: DetectionParams,
    overrides: &Overrides,
) -> Result<RunSummary> {
    let files = scan_spectrum_files(input_dir)?;

    let mut records = Vec::with_capacity(files.len());
    let mut succeeded = 0usize;
    let mut failed = 0usize;

    if !files.is_empty() {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;
    }

    let total = files.len();
    for (i, path) in files.iter().enumerate() {
        let (params, custom) = resolve_params(path, defaults, overrides);
        let tag = if custom { " (custom settings)" } else { "" };
        eprintln!(
            "[{}/{}] Processing: {} (prominence={}, distance={}){}",
            i + 1,
            total,
            file_name(path),
            params.prominence,
            params.distance,
            tag,
        );

        match process_file(path, params, out_dir) {
            Ok(report) => {
                eprintln!("  -> {} peaks", report.peak_count);
                succeeded += 1;
                records.push(FileRecord::Ok(report));
            }
            Err(e) => {
                eprintln!("  Warning: failed: {e:#}");
                failed += 1;
                records.push(FileRecord::Failed {
                    filename: file_name(path),
                    error: format!("{e:#}"),
                });
            }
        }
    }

    Ok(RunSummary {
        generated: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        records,
        succeeded,
        failed,
    })
}

/// Write the aggregated text summary into the output directory.
pub fn save_summary(out_dir: &Path, content: &str) -> Result<()> {
    let path = out_dir.join(SUMMARY_FILENAME);
    std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write the summary as pretty-printed JSON into the output directory.
pub fn save_summary_json(out_dir: &Path, summary: &RunSummary) -> Result<()> {
    let path = out_dir.join(SUMMARY_JSON_FILENAME);
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_spectrum_file() {
        assert!(is_spectrum_file(Path::new("sample.csv")));
        assert!(is_spectrum_file(Path::new("SAMPLE.CSV")));
        assert!(!is_spectrum_file(Path::new("notes.txt")));
        assert!(!is_spectrum_file(Path::new("chart.png")));
        assert!(!is_spectrum_file(Path::new("no_extension")));
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), "x,y\n1,1\n").unwrap();
        std::fs::write(dir.path().join("a.csv"), "x,y\n1,1\n").unwrap();
        std::fs::write(dir.path().join("readme.txt"), "text").unwrap();
        std::fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let files = scan_spectrum_files(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|p| super::file_name(p)).collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn test_scan_missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_spectrum_files(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_resolve_params_override_by_exact_filename() {
        let defaults = DetectionParams {
            prominence: 0.05,
            distance: 25,
        };
        let mut overrides = Overrides::new();
        overrides.insert(
            "special.csv".to_string(),
            DetectionParams {
                prominence: 0.03,
                distance: 15,
            },
        );

        let (params, custom) =
            resolve_params(Path::new("data/special.csv"), defaults, &overrides);
        assert!(custom);
        assert_eq!(params.prominence, 0.03);
        assert_eq!(params.distance, 15);

        let (params, custom) = resolve_params(Path::new("data/other.csv"), defaults, &overrides);
        assert!(!custom);
        assert_eq!(params, defaults);
    }

    #[test]
    fn test_load_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{ "sample.csv": { "prominence": 0.03, "distance": 15 } }"#,
        )
        .unwrap();

        let overrides = load_overrides(&path).unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides["sample.csv"].distance, 15);
    }

    #[test]
    fn test_load_overrides_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_overrides(&path).is_err());
    }

    #[test]
    fn test_run_batch_isolates_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::write(
            dir.path().join("good.csv"),
            "wavenumber,transmission\n4000,1.0\n3500,0.9\n3000,0.5\n2500,0.95\n2000,0.6\n1500,0.98\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("bad.csv"),
            "wavenumber,transmission\n4000,oops\n",
        )
        .unwrap();

        let defaults = DetectionParams {
            prominence: 0.2,
            distance: 1,
        };
        let summary = run_batch(dir.path(), &out, defaults, &Overrides::new()).unwrap();

        assert_eq!(summary.records.len(), 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);

        // Sorted scan order: bad.csv first.
        match &summary.records[0] {
            FileRecord::Failed { filename, error } => {
                assert_eq!(filename, "bad.csv");
                assert!(error.contains("Row 1"), "got: {error}");
            }
            other => panic!("expected failure record, got {other:?}"),
        }
        match &summary.records[1] {
            FileRecord::Ok(report) => {
                assert_eq!(report.filename, "good.csv");
                assert_eq!(report.peak_count, 2);
                assert_eq!(report.peaks, vec![3000, 2000]);
            }
            other => panic!("expected success record, got {other:?}"),
        }

        assert!(out.join("good.png").exists());
        assert!(!out.join("bad.png").exists());
    }

    #[test]
    fn test_run_batch_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::write(dir.path().join("notes.txt"), "not a spectrum").unwrap();

        let summary =
            run_batch(dir.path(), &out, DetectionParams::default(), &Overrides::new()).unwrap();
        assert!(summary.records.is_empty());
        // No artifacts for an empty run, not even the output directory.
        assert!(!out.exists());
    }
}
