//! Grid inference and validation engine for 3×3 color-patch fiducial markers.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! decode images or segment colors; it consumes an unordered bag of patch
//! observations (centroid, bounding box, color label, area) produced by an
//! external segmentation step and decides whether they form a plausible
//! 3×3 marker grid, reporting how much of the image the grid covers.
//!
//! Pipeline (one image, stateless):
//! 1. project patch centroids into the principal-axis frame ([`principal_frame`]),
//! 2. partition the projected coordinates into 3 rows and 3 columns
//!    ([`cluster_axis`]),
//! 3. resolve the 3×3 cell ↔ patch correspondence greedily ([`assign_grid`]),
//! 4. check row/column gap regularity ([`validate_spacing`]),
//! 5. score convex-hull coverage ([`coverage_from_grid`]),
//! 6. fuse spacing and coverage into a verdict ([`fuse_decision`]).
//!
//! [`MarkerDetector`] runs the whole pipeline and classifies every failure
//! as a [`FailureReason`]; nothing in this crate returns an `Err` for a
//! merely unconvincing image.

mod assign;
mod cluster;
mod coverage;
mod decision;
mod detector;
mod logger;
mod normalize;
mod spacing;
mod types;

pub use assign::{assign_grid, GridAssignment};
pub use cluster::{cluster_axis, member_means, AxisClusters, ClusterParams};
pub use coverage::{convex_hull, coverage_from_grid, CoverageResult};
pub use decision::fuse_decision;
pub use detector::{Detection, MarkerDetector};
pub use logger::init_with_level;
pub use normalize::principal_frame;
pub use spacing::{validate_spacing, SpacingMetrics};
pub use types::{BoundingBox, DetectParams, FailureReason, Patch, PatchColor, Verdict};
