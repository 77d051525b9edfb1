//! Pipeline orchestration: one image in, one verdict out.

use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::assign::{assign_grid, GridAssignment};
use crate::cluster::{cluster_axis, member_means, ClusterParams};
use crate::coverage::{coverage_from_grid, CoverageResult};
use crate::decision::fuse_decision;
use crate::normalize::principal_frame;
use crate::spacing::{validate_spacing, SpacingMetrics};
use crate::types::{DetectParams, FailureReason, Patch, Verdict};

/// Per-image detection result: the verdict plus the intermediate state that
/// debug consumers (visualizers, the CLI's verbose mode) want to inspect.
///
/// Fields past the stage where the pipeline bailed out are `None`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Detection {
    pub verdict: Verdict,
    /// Patch centroids in the principal-axis frame, index-aligned with ids.
    pub normalized: Vec<Point2<f32>>,
    pub grid: Option<GridAssignment>,
    pub spacing: Option<SpacingMetrics>,
    pub coverage: Option<CoverageResult>,
}

impl Detection {
    fn fail(reason: FailureReason) -> Self {
        Self {
            verdict: Verdict::Fail { reason },
            normalized: Vec::new(),
            grid: None,
            spacing: None,
            coverage: None,
        }
    }
}

/// Stateless 3×3 marker detector.
///
/// Each call to [`MarkerDetector::detect`] evaluates one image's patch list
/// independently; nothing is carried across images.
#[derive(Clone, Debug, Default)]
pub struct MarkerDetector {
    params: DetectParams,
    cluster: ClusterParams,
}

impl MarkerDetector {
    pub fn new(params: DetectParams) -> Self {
        Self {
            params,
            cluster: ClusterParams::default(),
        }
    }

    pub fn with_cluster_params(mut self, cluster: ClusterParams) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn params(&self) -> &DetectParams {
        &self.params
    }

    /// Decide whether `patches` form a 3×3 marker grid inside an
    /// `image_width` × `image_height` frame.
    ///
    /// Patch ids must be dense, starting at 0, in list order.
    pub fn detect(&self, patches: &[Patch], image_width: u32, image_height: u32) -> Detection {
        debug_assert!(
            patches.iter().enumerate().all(|(i, p)| p.id == i),
            "patch ids must be dense and in list order"
        );
        debug_assert!(patches.iter().all(|p| p.area >= 0.0), "negative patch area");

        if patches.len() < 3 {
            debug!("only {} patches, marker impossible", patches.len());
            return Detection::fail(FailureReason::FewPatches);
        }

        let centers: Vec<Point2<f32>> = patches.iter().map(|p| p.center).collect();
        let normalized = principal_frame(&centers);

        let xs: Vec<f32> = normalized.iter().map(|p| p.x).collect();
        let ys: Vec<f32> = normalized.iter().map(|p| p.y).collect();
        let cols = cluster_axis(&xs, &self.cluster);
        let rows = cluster_axis(&ys, &self.cluster);
        let col_center_x = member_means(&xs, &cols);
        let row_center_y = member_means(&ys, &rows);
        debug!(
            "axis clusters: rows {:?} cols {:?}",
            row_center_y, col_center_x
        );

        let Some(grid) = assign_grid(&normalized, &rows, &cols, &row_center_y, &col_center_x)
        else {
            return Detection {
                normalized,
                ..Detection::fail(FailureReason::AssignGrid)
            };
        };

        let Some(spacing) = validate_spacing(&normalized, &grid) else {
            return Detection {
                normalized,
                grid: Some(grid),
                ..Detection::fail(FailureReason::Spacing)
            };
        };
        debug!("spacing: cvx={:.4} cvy={:.4}", spacing.cvx, spacing.cvy);

        let coverage = coverage_from_grid(patches, &grid, image_width, image_height);
        if coverage.hull.len() < 3 {
            return Detection {
                normalized,
                grid: Some(grid),
                spacing: Some(spacing),
                coverage: Some(coverage),
                verdict: Verdict::Fail {
                    reason: FailureReason::SmallHull,
                },
            };
        }
        if coverage.bbox_area <= 0.0 {
            return Detection {
                normalized,
                grid: Some(grid),
                spacing: Some(spacing),
                coverage: Some(coverage),
                verdict: Verdict::Fail {
                    reason: FailureReason::BadBbox,
                },
            };
        }

        let verdict = fuse_decision(&spacing, &coverage, &self.params);
        Detection {
            verdict,
            normalized,
            grid: Some(grid),
            spacing: Some(spacing),
            coverage: Some(coverage),
        }
    }
}
