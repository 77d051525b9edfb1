//! Spacing validation: are the inferred row and column gaps mutually
//! consistent in the normalized frame?
//!
//! A genuine regular grid has three nearly equal gaps along each axis; an
//! accidental arrangement of colored blobs rarely does. The gaps are
//! normalized per row/column by their own mean, so the score is scale-free.

use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::assign::GridAssignment;

/// Dimensionless gap-irregularity scores (coefficients of variation).
///
/// `cvx` covers the within-row gaps (x′ direction), `cvy` the within-column
/// gaps (y′ direction). Valid only when every gap sequence was strictly
/// positive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpacingMetrics {
    pub cvx: f32,
    pub cvy: f32,
}

/// Compute the spacing metrics for a committed assignment.
///
/// Per row, the 3 members are sorted by x′ and must produce two strictly
/// positive gaps; each gap is divided by the row's mean gap, giving 6 ratios
/// across the rows. Columns are treated symmetrically over y′. Returns
/// `None` — the SPACING failure — on any non-positive gap or mean, which
/// signals a corrupted assignment or degenerate geometry.
pub fn validate_spacing(
    normalized: &[Point2<f32>],
    grid: &GridAssignment,
) -> Option<SpacingMetrics> {
    let mut x_ratios = Vec::with_capacity(6);
    for r in 0..3 {
        let mut xs = grid.row(r).map(|id| normalized[id].x);
        xs.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        push_gap_ratios(&xs, &mut x_ratios)?;
    }

    let mut y_ratios = Vec::with_capacity(6);
    for c in 0..3 {
        let mut ys = grid.col(c).map(|id| normalized[id].y);
        ys.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        push_gap_ratios(&ys, &mut y_ratios)?;
    }

    let mean_x = mean(&x_ratios);
    let mean_y = mean(&y_ratios);
    if mean_x <= 0.0 || mean_y <= 0.0 {
        debug!("spacing: non-positive mean gap ratio");
        return None;
    }

    Some(SpacingMetrics {
        cvx: sample_stdev(&x_ratios) / mean_x,
        cvy: sample_stdev(&y_ratios) / mean_y,
    })
}

/// Append the two mean-normalized gaps of one sorted coordinate triple, or
/// bail out if the triple is not strictly increasing.
fn push_gap_ratios(sorted: &[f32; 3], out: &mut Vec<f32>) -> Option<()> {
    let d1 = sorted[1] - sorted[0];
    let d2 = sorted[2] - sorted[1];
    if d1 <= 0.0 || d2 <= 0.0 {
        debug!("spacing: non-positive gap ({d1}, {d2})");
        return None;
    }
    let m = 0.5 * (d1 + d2);
    if m <= 0.0 {
        return None;
    }
    out.push(d1 / m);
    out.push(d2 / m);
    Some(())
}

fn mean(v: &[f32]) -> f32 {
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f32>() / v.len() as f32
}

/// Sample standard deviation (Bessel-corrected, divisor n−1).
fn sample_stdev(v: &[f32]) -> f32 {
    if v.len() < 2 {
        return 0.0;
    }
    let m = mean(v);
    let s2 = v.iter().map(|x| (x - m) * (x - m)).sum::<f32>() / (v.len() - 1) as f32;
    s2.sqrt()
}
