//! Peak detection on a transmission signal.
//!
//! Absorption bands show up as local transmission minima. A candidate
//! minimum is kept when its topographic prominence (computed on the negated
//! signal, so dips become peaks) reaches the threshold; survivors closer
//! together than the minimum distance are thinned deepest-first.

use crate::models::PeakMarker;
use crate::spectrum::Spectrum;

/// Candidate local minima, ascending by index. A sample qualifies when it is
/// strictly below its left neighbor and no higher than its right neighbor,
/// which makes the leftmost sample of a flat minimum run the representative.
/// NaN never satisfies either comparison and is never selected.
fn local_minima(y: &[f64]) -> Vec<usize> {
    let mut minima = Vec::new();
    if y.len() < 3 {
        return minima;
    }
    for i in 1..y.len() - 1 {
        if y[i] < y[i - 1] && y[i] <= y[i + 1] {
            minima.push(i);
        }
    }
    minima
}

/// Topographic prominence of the minimum at `i`, expressed in transmission
/// units. Scan outward on each side until a strictly deeper sample (or the
/// border) is reached, tracking the highest value seen; the prominence is
/// the smaller of the two rises above the minimum.
fn prominence_at(y: &[f64], i: usize) -> f64 {
    let base = y[i];

    let mut left_max = base;
    let mut j = i;
    while j > 0 {
        j -= 1;
        if y[j] < base {
            break;
        }
        if y[j] > left_max {
            left_max = y[j];
        }
    }

    let mut right_max = base;
    let mut j = i;
    while j + 1 < y.len() {
        j += 1;
        if y[j] < base {
            break;
        }
        if y[j] > right_max {
            right_max = y[j];
        }
    }

    (left_max - base).min(right_max - base)
}

/// Thin candidates so that no two retained peaks are closer than
/// `min_distance` samples. Deeper minima win; on exactly equal depth the
/// lower index wins. A suppressed candidate cannot suppress others.
fn enforce_distance(y: &[f64], candidates: &[usize], min_distance: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        y[candidates[a]]
            .partial_cmp(&y[candidates[b]])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(candidates[a].cmp(&candidates[b]))
    });

    let mut keep = vec![true; candidates.len()];
    for &k in &order {
        if !keep[k] {
            continue;
        }
        for (j, &other) in candidates.iter().enumerate() {
            if j != k && keep[j] && other.abs_diff(candidates[k]) < min_distance {
                keep[j] = false;
            }
        }
    }

    candidates
        .iter()
        .zip(&keep)
        .filter(|&(_, &kept)| kept)
        .map(|(&index, _)| index)
        .collect()
}

/// Detect absorption-band minima in a transmission signal.
///
/// Returns sample indices sorted ascending. Fewer than 3 samples yield an
/// empty set (a local minimum needs two neighbors). Pure function of the
/// signal and parameters.
pub fn detect_peaks(transmission: &[f64], prominence: f64, min_distance: usize) -> Vec<usize> {
    let min_distance = min_distance.max(1);
    let candidates: Vec<usize> = local_minima(transmission)
        .into_iter()
        .filter(|&i| prominence_at(transmission, i) >= prominence)
        .collect();

    if min_distance == 1 {
        return candidates;
    }

    let mut peaks = enforce_distance(transmission, &candidates, min_distance);
    peaks.sort_unstable();
    peaks
}

/// Rounded peak wavenumbers, sorted descending. Rounding is half away from
/// zero; duplicates after rounding are kept, matching the summary and chart
/// labels.
pub fn rounded_peaks(spectrum: &Spectrum, peaks: &[usize]) -> Vec<i64> {
    let mut rounded: Vec<i64> = peaks
        .iter()
        .map(|&i| spectrum.wavenumber[i].round() as i64)
        .collect();
    rounded.sort_unstable_by(|a, b| b.cmp(a));
    rounded
}

/// Annotation layout for the chart: one marker per peak in ascending index
/// order, carrying the coordinates for the stick and its rotated label.
pub fn peak_markers(spectrum: &Spectrum, peaks: &[usize]) -> Vec<PeakMarker> {
    peaks
        .iter()
        .map(|&i| PeakMarker {
            wavenumber: spectrum.wavenumber[i],
            transmission: spectrum.transmission[i],
            index: i,
        })
        .collect()
}
