use serde::{Deserialize, Serialize};

/// Default minimum prominence for a transmission dip to count as a peak.
pub const DEFAULT_PROMINENCE: f64 = 0.05;

/// Default minimum sample distance between retained peaks.
pub const DEFAULT_DISTANCE: usize = 25;

/// Detection parameters for one spectrum, resolved once before detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionParams {
    pub prominence: f64,
    pub distance: usize,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            prominence: DEFAULT_PROMINENCE,
            distance: DEFAULT_DISTANCE,
        }
    }
}

/// One detected peak positioned for annotation on the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakMarker {
    pub wavenumber: f64,
    pub transmission: f64,
    pub index: usize,
}

/// Successful result for a single input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub filename: String,
    pub params: DetectionParams,
    pub peak_count: usize,
    /// Rounded peak wavenumbers, sorted descending. Duplicates after
    /// rounding are kept.
    pub peaks: Vec<i64>,
}

/// Per-file outcome: a full report, or the error message that stopped it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileRecord {
    Ok(FileReport),
    Failed { filename: String, error: String },
}

impl FileRecord {
    pub fn filename(&self) -> &str {
        match self {
            FileRecord::Ok(report) => &report.filename,
            FileRecord::Failed { filename, .. } => filename,
        }
    }
}

/// Aggregated outcome of one batch run, written once at the end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub generated: String,
    pub records: Vec<FileRecord>,
    pub succeeded: usize,
    pub failed: usize,
}
