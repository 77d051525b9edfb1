//! Coverage scoring: how much of the image frame does the assigned grid
//! actually occupy?
//!
//! The score is the area of the convex hull of all 36 cell-box corners,
//! expressed as a fraction of the whole image area. The hull/bbox ratio is
//! kept alongside as a diagnostic; it is not part of the final decision.

use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::assign::GridAssignment;
use crate::types::Patch;

/// Areas and ratios derived from the 9 assigned bounding boxes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoverageResult {
    /// Convex hull vertices, counter-clockwise.
    pub hull: Vec<Point2<f32>>,
    pub hull_area: f64,
    /// Area of the grid's own axis-aligned bounding box.
    pub bbox_area: f64,
    pub image_area: f64,
    /// hull / image — the reported coverage.
    pub ratio: f64,
    /// hull / bbox — diagnostic only.
    pub ratio_bbox: f64,
}

/// Compute hull and coverage ratios for a committed assignment.
///
/// The image area comes from the caller, so coverage is always relative to
/// the whole frame rather than the grid's own extent. Degenerate geometry is
/// visible in the result (`hull.len() < 3`, `bbox_area <= 0`) and classified
/// by the caller.
pub fn coverage_from_grid(
    patches: &[Patch],
    grid: &GridAssignment,
    image_width: u32,
    image_height: u32,
) -> CoverageResult {
    let mut corners = Vec::with_capacity(9 * 4);
    let mut min = Point2::new(f32::MAX, f32::MAX);
    let mut max = Point2::new(f32::MIN, f32::MIN);

    for &id in &grid.ids() {
        for corner in patches[id].bbox.corners() {
            min.x = min.x.min(corner.x);
            min.y = min.y.min(corner.y);
            max.x = max.x.max(corner.x);
            max.y = max.y.max(corner.y);
            corners.push(corner);
        }
    }

    let hull = convex_hull(&corners);
    let hull_area = if hull.len() >= 3 {
        polygon_area(&hull)
    } else {
        0.0
    };

    let bbox_w = f64::from((max.x - min.x).max(0.0));
    let bbox_h = f64::from((max.y - min.y).max(0.0));
    let bbox_area = bbox_w * bbox_h;
    let image_area = f64::from(image_width) * f64::from(image_height);

    let ratio = if image_area > 0.0 {
        hull_area / image_area
    } else {
        0.0
    };
    let ratio_bbox = if bbox_area > 0.0 {
        hull_area / bbox_area
    } else {
        0.0
    };

    debug!(
        "coverage: hull={hull_area:.1} bbox={bbox_area:.1} image={image_area:.1} ratio={ratio:.4}"
    );

    CoverageResult {
        hull,
        hull_area,
        bbox_area,
        image_area,
        ratio,
        ratio_bbox,
    }
}

/// Andrew's monotone chain. Returns the hull counter-clockwise (in a y-down
/// image coordinate system) without collinear interior vertices; collinear
/// input collapses to its two extreme points.
pub fn convex_hull(points: &[Point2<f32>]) -> Vec<Point2<f32>> {
    let mut pts: Vec<Point2<f32>> = points.to_vec();
    pts.sort_unstable_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    pts.dedup();

    if pts.len() < 3 {
        return pts;
    }

    let cross = |o: &Point2<f32>, a: &Point2<f32>, b: &Point2<f32>| -> f64 {
        let oa = (f64::from(a.x - o.x), f64::from(a.y - o.y));
        let ob = (f64::from(b.x - o.x), f64::from(b.y - o.y));
        oa.0 * ob.1 - oa.1 * ob.0
    };

    let mut lower: Vec<Point2<f32>> = Vec::new();
    for p in &pts {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0
        {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point2<f32>> = Vec::new();
    for p in pts.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0
        {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Shoelace area of a simple polygon.
pub fn polygon_area(polygon: &[Point2<f32>]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0f64;
    for (i, p) in polygon.iter().enumerate() {
        let q = &polygon[(i + 1) % polygon.len()];
        acc += f64::from(p.x) * f64::from(q.y) - f64::from(q.x) * f64::from(p.y);
    }
    acc.abs() * 0.5
}
