use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Color label of a segmented patch. The marker palette is fixed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PatchColor {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
}

impl PatchColor {
    pub const ALL: [PatchColor; 6] = [
        PatchColor::Red,
        PatchColor::Green,
        PatchColor::Blue,
        PatchColor::Yellow,
        PatchColor::Cyan,
        PatchColor::Magenta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatchColor::Red => "red",
            PatchColor::Green => "green",
            PatchColor::Blue => "blue",
            PatchColor::Yellow => "yellow",
            PatchColor::Cyan => "cyan",
            PatchColor::Magenta => "magenta",
        }
    }
}

/// Axis-aligned bounding rectangle in image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// The four corners in TL, TR, BR, BL order.
    pub fn corners(&self) -> [Point2<f32>; 4] {
        [
            Point2::new(self.x, self.y),
            Point2::new(self.x + self.width, self.y),
            Point2::new(self.x + self.width, self.y + self.height),
            Point2::new(self.x, self.y + self.height),
        ]
    }

    pub fn area(&self) -> f64 {
        f64::from(self.width) * f64::from(self.height)
    }
}

/// One detected colored region, as delivered by the segmentation source.
///
/// `id` must be dense starting at 0 in list order and is never reused within
/// one image; the pipeline uses it to look up normalized coordinates without
/// recomputation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub color: PatchColor,
    pub bbox: BoundingBox,
    /// Area-weighted centroid in image pixel coordinates.
    pub center: Point2<f32>,
    /// Pixel area of the region; only used for segmentation-time filtering.
    pub area: f64,
    pub id: usize,
}

/// Why an image was rejected. Every failing image maps to exactly one reason.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum FailureReason {
    None,
    /// Fewer than 3 candidate patches.
    FewPatches,
    /// Greedy assignment could not fill all 9 cells.
    AssignGrid,
    /// Row/column gaps out of order or too irregular.
    Spacing,
    /// Convex hull degenerated to fewer than 3 vertices.
    SmallHull,
    /// Grid bounding box collapsed to zero area.
    BadBbox,
    /// Hull covers too little of the image.
    LowCoverage,
}

impl FailureReason {
    /// Stable short code used in CLI diagnostics.
    pub fn short_code(&self) -> &'static str {
        match self {
            FailureReason::None => "OK",
            FailureReason::FewPatches => "FEW_PATCHES",
            FailureReason::AssignGrid => "GRID_ASSIGNMENT_FAILED",
            FailureReason::Spacing => "SPACING_VALIDATION_FAILED",
            FailureReason::SmallHull => "HULL_TOO_SMALL",
            FailureReason::BadBbox => "INVALID_BBOX",
            FailureReason::LowCoverage => "LOW_COVERAGE",
        }
    }
}

/// Tunable thresholds for spacing validation and coverage acceptance.
///
/// Defaults match the deployment that reports coverage relative to the whole
/// image frame. `cvx`/`cvy` are coefficients of variation of the normalized
/// row/column gaps; see [`crate::SpacingMetrics`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectParams {
    /// Hard column-gap irregularity limit.
    pub cvx_thresh: f32,
    /// Hard row-gap irregularity limit.
    pub cvy_thresh: f32,
    /// Looser cv limits used by the soft spacing fallback.
    pub soft_cvx_thresh: f32,
    pub soft_cvy_thresh: f32,
    /// Hard minimum hull/image coverage for a pass.
    pub coverage_thresh: f64,
    /// Coverage that overrides a failed spacing check outright.
    pub coverage_fallback: f64,
    /// Coverage required by the soft spacing fallback.
    pub coverage_soft: f64,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            cvx_thresh: 0.55,
            cvy_thresh: 0.65,
            soft_cvx_thresh: 0.60,
            soft_cvy_thresh: 0.70,
            coverage_thresh: 0.45,
            coverage_fallback: 0.55,
            coverage_soft: 0.50,
        }
    }
}

/// Final per-image outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Marker found; `percentage` is the rounded hull/image coverage, 0..=100.
    Pass { percentage: u32 },
    Fail { reason: FailureReason },
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass { .. })
    }

    pub fn reason(&self) -> FailureReason {
        match self {
            Verdict::Pass { .. } => FailureReason::None,
            Verdict::Fail { reason } => *reason,
        }
    }
}
