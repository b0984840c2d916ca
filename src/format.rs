use crate::models::{FileRecord, FileReport, RunSummary};

fn format_peak_values(peaks: &[i64]) -> String {
    let values: Vec<String> = peaks.iter().map(|p| p.to_string()).collect();
    format!("[{}]", values.join(", "))
}

/// Format a single-file report for console output.
pub fn format_report(report: &FileReport) -> String {
    format!(
        "{}\n\
         Parameters: prominence={}, distance={}\n\
         Peaks found: {}\n\
         Peaks (cm^-1): {}",
        report.filename,
        report.params.prominence,
        report.params.distance,
        report.peak_count,
        format_peak_values(&report.peaks),
    )
}

/// Format the aggregated batch summary as the text artifact.
pub fn format_summary(summary: &RunSummary) -> String {
    let separator = "=".repeat(70);
    let mut output = String::new();

    output.push_str("IR SPECTRA PEAK SUMMARY\n");
    output.push_str(&format!("Generated: {}\n", summary.generated));
    output.push_str(&separator);
    output.push_str("\n\n");

    for record in &summary.records {
        output.push_str(&separator);
        output.push('\n');
        match record {
            FileRecord::Ok(report) => {
                output.push_str(&format!("File: {}\n", report.filename));
                output.push_str(&format!(
                    "Parameters: prominence={}, distance={}\n",
                    report.params.prominence, report.params.distance
                ));
                output.push_str(&format!("Peak count: {}\n", report.peak_count));
                output.push_str("\nPeaks (cm^-1):\n");
                output.push_str(&format_peak_values(&report.peaks));
                output.push_str("\n\n");
            }
            FileRecord::Failed { filename, error } => {
                output.push_str(&format!("File: {filename}\n"));
                output.push_str(&format!("ERROR: {error}\n\n"));
            }
        }
    }

    output
}

/// Format a single-file report as pretty-printed JSON.
pub fn format_json_report(report: &FileReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}
