//! Greedy 3×3 cell ↔ patch assignment.
//!
//! Every (row, col, patch) triple is scored by the L1 distance from the
//! patch's normalized coordinate to the cell's (colCenterX, rowCenterY)
//! intersection, discounted when the patch's independent axis-cluster labels
//! agree with the target cell. Triples are committed globally closest first,
//! skipping filled cells and used patches. Ranking globally instead of
//! per-cell keeps two cells from fighting over one best patch while a third
//! starves; for the fixed 9-cell target it cheaply approximates a
//! minimum-cost bipartite matching.

use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::cluster::AxisClusters;

/// Bijective mapping from (row, col) ∈ {0,1,2}² onto 9 of the input patches.
///
/// `cells[r][c]` is the patch id assigned to that grid cell. Exists only
/// when all 9 cells were filled with 9 distinct patches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridAssignment {
    pub cells: [[usize; 3]; 3],
}

impl GridAssignment {
    /// Patch ids of one row, left-to-right by cell index.
    pub fn row(&self, r: usize) -> [usize; 3] {
        self.cells[r]
    }

    /// Patch ids of one column, top-to-bottom by cell index.
    pub fn col(&self, c: usize) -> [usize; 3] {
        [self.cells[0][c], self.cells[1][c], self.cells[2][c]]
    }

    /// All 9 assigned patch ids in row-major order.
    pub fn ids(&self) -> [usize; 9] {
        let mut out = [0usize; 9];
        for r in 0..3 {
            for c in 0..3 {
                out[r * 3 + c] = self.cells[r][c];
            }
        }
        out
    }
}

struct Candidate {
    row: usize,
    col: usize,
    id: usize,
    dist: f32,
}

/// Relative discount per agreeing axis label (0, 1 or 2 agreements).
const LABEL_BONUS: f32 = 0.25;

/// Pick exactly one patch per grid cell, or `None` if fewer than 9 cells can
/// be filled (the ASSIGN_GRID failure).
///
/// The axis-cluster labels act as a prior, not a constraint: a patch whose
/// k-means row disagrees with its best-fit cell can still win that cell, just
/// without the discount. Deterministic for a fixed clustering outcome; the
/// candidate order never depends on hash iteration or sort stability.
pub fn assign_grid(
    normalized: &[Point2<f32>],
    rows: &AxisClusters,
    cols: &AxisClusters,
    row_center_y: &[f32; 3],
    col_center_x: &[f32; 3],
) -> Option<GridAssignment> {
    let mut candidates = Vec::with_capacity(normalized.len() * 9);
    for row in 0..3 {
        for col in 0..3 {
            for (id, p) in normalized.iter().enumerate() {
                let bonus =
                    usize::from(rows.labels[id] == row) + usize::from(cols.labels[id] == col);
                let dx = p.x - col_center_x[col];
                let dy = p.y - row_center_y[row];
                // L1 is robust to the occasional off-axis outlier here.
                let dist = (dx.abs() + dy.abs()) / (1.0 + LABEL_BONUS * bonus as f32);
                candidates.push(Candidate { row, col, id, dist });
            }
        }
    }

    candidates.sort_unstable_by(|a, b| {
        a.dist
            .partial_cmp(&b.dist)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| (a.row, a.col, a.id).cmp(&(b.row, b.col, b.id)))
    });

    let mut cells = [[usize::MAX; 3]; 3];
    let mut cell_used = [[false; 3]; 3];
    let mut patch_used = vec![false; normalized.len()];
    let mut assigned = 0usize;

    for cand in &candidates {
        if cell_used[cand.row][cand.col] || patch_used[cand.id] {
            continue;
        }
        cells[cand.row][cand.col] = cand.id;
        cell_used[cand.row][cand.col] = true;
        patch_used[cand.id] = true;
        assigned += 1;
        if assigned == 9 {
            break;
        }
    }

    if assigned != 9 {
        debug!("greedy grid assignment incomplete ({assigned}/9)");
        return None;
    }

    Some(GridAssignment { cells })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{cluster_axis, member_means, ClusterParams};

    fn grid_points(spacing: f32) -> Vec<Point2<f32>> {
        (0..3)
            .flat_map(|r| (0..3).map(move |c| Point2::new(c as f32 * spacing, r as f32 * spacing)))
            .collect()
    }

    fn cluster_axes(points: &[Point2<f32>]) -> (AxisClusters, AxisClusters, [f32; 3], [f32; 3]) {
        let xs: Vec<f32> = points.iter().map(|p| p.x).collect();
        let ys: Vec<f32> = points.iter().map(|p| p.y).collect();
        let params = ClusterParams::default();
        let cols = cluster_axis(&xs, &params);
        let rows = cluster_axis(&ys, &params);
        let col_x = member_means(&xs, &cols);
        let row_y = member_means(&ys, &rows);
        (rows, cols, row_y, col_x)
    }

    #[test]
    fn perfect_grid_assigns_row_major() {
        let points = grid_points(100.0);
        let (rows, cols, row_y, col_x) = cluster_axes(&points);
        let grid = assign_grid(&points, &rows, &cols, &row_y, &col_x).expect("full assignment");
        for r in 0..3 {
            for c in 0..3 {
                assert_eq!(r * 3 + c, grid.cells[r][c]);
            }
        }
    }

    #[test]
    fn extra_patches_do_not_steal_cells() {
        let mut points = grid_points(100.0);
        // Two stray detections near existing cells.
        points.push(Point2::new(12.0, 8.0));
        points.push(Point2::new(205.0, 103.0));
        let (rows, cols, row_y, col_x) = cluster_axes(&points);
        let grid = assign_grid(&points, &rows, &cols, &row_y, &col_x).expect("full assignment");

        let mut ids = grid.ids().to_vec();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(9, ids.len(), "no patch may be used twice");
        // The true grid members sit exactly on the cell intersections and
        // must all win their cells over the strays.
        for id in 0..9 {
            assert!(grid.ids().contains(&id));
        }
    }

    #[test]
    fn too_few_patches_fail() {
        let points = grid_points(100.0)[..7].to_vec();
        let (rows, cols, row_y, col_x) = cluster_axes(&points);
        assert!(assign_grid(&points, &rows, &cols, &row_y, &col_x).is_none());
    }

    #[test]
    fn repeated_runs_give_identical_mapping() {
        let mut points = grid_points(90.0);
        points.push(Point2::new(44.0, 47.0)); // ambiguous midpoint patch
        let (rows, cols, row_y, col_x) = cluster_axes(&points);
        let a = assign_grid(&points, &rows, &cols, &row_y, &col_x).unwrap();
        let b = assign_grid(&points, &rows, &cols, &row_y, &col_x).unwrap();
        assert_eq!(a, b);
    }
}
