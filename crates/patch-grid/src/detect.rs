//! End-to-end helpers: image in, verdict out.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use log::debug;

use patch_grid_core::{DetectParams, Detection, MarkerDetector};

use crate::segment::{segment_color_patches, SegmentationParams};

/// Errors produced while loading images. Core detection never errors; an
/// unconvincing image is a classified failure inside [`Detection`], not an
/// `Err`.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("failed to open image: {0}")]
    Open(#[from] std::io::Error),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Working-resolution cap applied before segmentation.
pub const MAX_WIDTH: u32 = 640;
pub const MAX_HEIGHT: u32 = 480;

/// Downscale (never upscale) so the image fits inside the working cap,
/// preserving aspect ratio.
pub fn downscale_to_fit(img: DynamicImage) -> RgbImage {
    let (w, h) = (img.width(), img.height());
    if w <= MAX_WIDTH && h <= MAX_HEIGHT {
        return img.to_rgb8();
    }
    let sx = f64::from(MAX_WIDTH) / f64::from(w);
    let sy = f64::from(MAX_HEIGHT) / f64::from(h);
    let s = sx.min(sy);
    let nw = ((f64::from(w) * s).round() as u32).max(1);
    let nh = ((f64::from(h) * s).round() as u32).max(1);
    debug!("downscaling {w}x{h} -> {nw}x{nh}");
    img.resize_exact(nw, nh, FilterType::Triangle).to_rgb8()
}

/// Segment `img` and run the grid inference engine on the result.
pub fn detect_marker_image(
    img: &RgbImage,
    seg: &SegmentationParams,
    params: &DetectParams,
) -> Detection {
    let patches = segment_color_patches(img, seg);
    MarkerDetector::new(*params).detect(&patches, img.width(), img.height())
}

/// Open, decode, downscale and detect in one call.
pub fn detect_marker_path(
    path: &Path,
    seg: &SegmentationParams,
    params: &DetectParams,
) -> Result<Detection, DetectError> {
    let img = image::ImageReader::open(path)?.decode()?;
    let img = downscale_to_fit(img);
    Ok(detect_marker_image(&img, seg, params))
}
