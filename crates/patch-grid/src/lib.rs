//! End-to-end 3×3 color-patch marker detection.
//!
//! This crate wraps the purely geometric [`patch_grid_core`] engine with the
//! image-facing pieces: HSV color segmentation that turns an `image::RgbImage`
//! into candidate [`Patch`] observations, and convenience helpers that run
//! segmentation plus grid inference in one call.
//!
//! ## Quickstart
//!
//! ```no_run
//! use patch_grid::detect;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detection = detect::detect_marker_path(
//!     "photo.jpg".as_ref(),
//!     &patch_grid::SegmentationParams::default(),
//!     &patch_grid::DetectParams::default(),
//! )?;
//! println!("pass: {}", detection.verdict.is_pass());
//! # Ok(())
//! # }
//! ```
//!
//! The CLI binary (`patch-grid`, feature `cli`) prints one line per image:
//! `"<path> <pct>%"` on a pass, `"<path> 0%"` on a failure, and exits
//! nonzero if any image failed.

pub use patch_grid_core as core;

pub mod detect;
pub mod segment;

pub use detect::{detect_marker_image, detect_marker_path, DetectError};
pub use patch_grid_core::{
    Detection, DetectParams, FailureReason, MarkerDetector, Patch, PatchColor, Verdict,
};
pub use segment::{segment_color_patches, SegmentationParams};
