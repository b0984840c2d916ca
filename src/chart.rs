use std::path::Path;

use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::models::PeakMarker;
use crate::spectrum::Spectrum;

/// Fixed wavenumber axis range, plotted decreasing left to right per IR
/// convention.
pub const WAVENUMBER_MAX: f64 = 4000.0;
pub const WAVENUMBER_MIN: f64 = 400.0;

/// Fixed transmission axis upper limit.
pub const TRANSMISSION_MAX: f64 = 1.05;

const CHART_WIDTH: u32 = 1400;
const CHART_HEIGHT: u32 = 600;

/// Render a spectrum with stick-and-label peak annotations to a PNG file.
///
/// The x axis is drawn on a negated scale with a label formatter that prints
/// the absolute value, which gives the inverted 4000 -> 400 axis.
pub fn render_chart(
    spectrum: &Spectrum,
    markers: &[PeakMarker],
    title: &str,
    path: &Path,
) -> Result<()> {
    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)
        .with_context(|| format!("Failed to prepare chart for {}", path.display()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(-WAVENUMBER_MAX..-WAVENUMBER_MIN, 0.0..TRANSMISSION_MAX)
        .with_context(|| format!("Failed to lay out chart for {}", path.display()))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Wavenumber / cm\u{207b}\u{00b9}")
        .y_desc("Transmission")
        .x_label_formatter(&|x| format!("{:.0}", -x))
        .draw()
        .context("Failed to draw chart axes")?;

    chart
        .draw_series(LineSeries::new(
            spectrum
                .wavenumber
                .iter()
                .zip(&spectrum.transmission)
                .map(|(&wn, &tr)| (-wn, tr)),
            &BLACK,
        ))
        .context("Failed to draw spectrum curve")?;

    let label_style = ("sans-serif", 14)
        .into_font()
        .transform(FontTransform::Rotate270)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));

    for marker in markers {
        // Stick from the full-transmission line down to the band minimum.
        chart
            .draw_series(LineSeries::new(
                [(-marker.wavenumber, 1.0), (-marker.wavenumber, marker.transmission)],
                &BLACK,
            ))
            .context("Failed to draw peak marker")?;

        chart
            .draw_series(std::iter::once(Text::new(
                format!("{:.0}", marker.wavenumber),
                (-marker.wavenumber, marker.transmission - 0.05),
                label_style.clone(),
            )))
            .context("Failed to draw peak label")?;
    }

    root.present()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_chart_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");

        let spectrum = Spectrum {
            wavenumber: vec![4000.0, 3500.0, 3000.0, 2500.0, 2000.0, 1500.0],
            transmission: vec![1.0, 0.9, 0.5, 0.95, 0.6, 0.98],
        };
        let markers = [
            PeakMarker {
                wavenumber: 3000.0,
                transmission: 0.5,
                index: 2,
            },
            PeakMarker {
                wavenumber: 2000.0,
                transmission: 0.6,
                index: 4,
            },
        ];

        render_chart(&spectrum, &markers, "test", &path).unwrap();

        let data = std::fs::read(&path).unwrap();
        assert!(!data.is_empty());
        assert_eq!(&data[1..4], b"PNG");
    }

    #[test]
    fn test_render_chart_without_peaks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.png");

        let spectrum = Spectrum {
            wavenumber: vec![4000.0, 2000.0, 400.0],
            transmission: vec![1.0, 1.0, 1.0],
        };

        render_chart(&spectrum, &[], "flat", &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_render_chart_unwritable_path() {
        let spectrum = Spectrum {
            wavenumber: vec![4000.0, 2000.0],
            transmission: vec![1.0, 0.5],
        };

        let result = render_chart(
            &spectrum,
            &[],
            "bad",
            Path::new("/nonexistent-dir/chart.png"),
        );
        assert!(result.is_err());
    }
}
