//! Orientation normalization: project patch centroids into the principal-axis
//! frame of the centroid cloud.
//!
//! Marker photographs may be rotated arbitrarily; clustering raw image (x, y)
//! would be orientation-dependent. In the principal frame the dominant spread
//! of the 3×3 pattern aligns with the analysis axes regardless of camera
//! rotation, so everything downstream works on (x′, y′).

use nalgebra::{Matrix2, Point2, Vector2};

/// Project `centers` onto the principal axes of their own distribution.
///
/// The output is index-aligned with the input (entry `i` is the normalized
/// coordinate of patch id `i`). The first axis (x′) carries the larger
/// eigenvalue. Always well-defined for non-empty input; collinear clouds are
/// projected onto a degenerate second axis and surface later as spacing or
/// assignment failures rather than an error here.
pub fn principal_frame(centers: &[Point2<f32>]) -> Vec<Point2<f32>> {
    debug_assert!(
        centers.iter().all(|p| p.x.is_finite() && p.y.is_finite()),
        "non-finite centroid"
    );
    if centers.is_empty() {
        return Vec::new();
    }

    let n = centers.len() as f32;
    let mean = centers
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + p.coords)
        / n;

    let mut cov = Matrix2::<f32>::zeros();
    for p in centers {
        let d = p.coords - mean;
        cov += d * d.transpose();
    }
    cov /= n;

    let eig = cov.symmetric_eigen();
    // Dominant axis first, matching the convention of eigenvalue-descending
    // PCA so that x' spans the wider direction of the grid.
    let (major, minor) = if eig.eigenvalues[0] >= eig.eigenvalues[1] {
        (0, 1)
    } else {
        (1, 0)
    };
    let e1: Vector2<f32> = eig.eigenvectors.column(major).into();
    let e2: Vector2<f32> = eig.eigenvectors.column(minor).into();

    centers
        .iter()
        .map(|p| {
            let d = p.coords - mean;
            Point2::new(e1.dot(&d), e2.dot(&d))
        })
        .collect()
}
