use std::path::Path;

use anyhow::{bail, Context, Result};

/// An IR spectrum: index-aligned wavenumber and transmission sequences of
/// equal, non-zero length. Wavenumber order (ascending or descending) is
/// whatever the source file used; detection works on sample index order.
#[derive(Debug, Clone)]
pub struct Spectrum {
    pub wavenumber: Vec<f64>,
    pub transmission: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.wavenumber.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavenumber.is_empty()
    }
}

/// Load a spectrum from a two-column CSV file. The header row is skipped;
/// every data row must have at least two numeric cells (wavenumber,
/// transmission). Any unparsable cell fails the whole file.
pub fn load_spectrum(path: &Path) -> Result<Spectrum> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut wavenumber = Vec::new();
    let mut transmission = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row + 1))?;
        if record.len() < 2 {
            bail!("Row {}: expected at least 2 columns, got {}", row + 1, record.len());
        }
        let wn: f64 = record[0]
            .trim()
            .parse()
            .with_context(|| format!("Row {}: '{}' is not a number", row + 1, &record[0]))?;
        let tr: f64 = record[1]
            .trim()
            .parse()
            .with_context(|| format!("Row {}: '{}' is not a number", row + 1, &record[1]))?;
        wavenumber.push(wn);
        transmission.push(tr);
    }

    if wavenumber.is_empty() {
        bail!("{}: no data rows", path.display());
    }

    Ok(Spectrum {
        wavenumber,
        transmission,
    })
}
