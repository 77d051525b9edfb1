//! Color segmentation: turn an RGB image into candidate marker patches.
//!
//! Per palette color: HSV in-range mask (OpenCV conventions, H in [0,180)),
//! a morphological open/close with a 3×3 cross element to drop speckle and
//! seal pinholes, then 8-connected component labeling. Components are kept
//! when their pixel area falls inside a band relative to the image area, and
//! receive dense ids in discovery order.

use image::RgbImage;
use log::debug;
use nalgebra::Point2;

use patch_grid_core::{BoundingBox, Patch, PatchColor};

/// Area band for keeping a connected component, relative to image area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentationParams {
    pub min_area_ratio: f64,
    pub max_area_ratio: f64,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            min_area_ratio: 0.0006,
            max_area_ratio: 0.2,
        }
    }
}

/// Inclusive HSV range; red needs two hue bands around the seam.
struct HsvRange {
    hue: &'static [(u8, u8)],
    sat_min: u8,
    val_min: u8,
}

fn palette_range(color: PatchColor) -> HsvRange {
    match color {
        PatchColor::Red => HsvRange {
            hue: &[(0, 10), (170, 180)],
            sat_min: 80,
            val_min: 60,
        },
        PatchColor::Green => HsvRange {
            hue: &[(35, 85)],
            sat_min: 60,
            val_min: 60,
        },
        PatchColor::Blue => HsvRange {
            hue: &[(90, 130)],
            sat_min: 60,
            val_min: 60,
        },
        PatchColor::Yellow => HsvRange {
            hue: &[(20, 35)],
            sat_min: 60,
            val_min: 60,
        },
        PatchColor::Cyan => HsvRange {
            hue: &[(80, 95)],
            sat_min: 60,
            val_min: 60,
        },
        PatchColor::Magenta => HsvRange {
            hue: &[(140, 170)],
            sat_min: 60,
            val_min: 60,
        },
    }
}

/// Segment every palette color and return the surviving patches.
///
/// Ids are dense starting at 0, assigned in discovery order (palette order,
/// then row-major within each mask), and never reused within one call.
pub fn segment_color_patches(img: &RgbImage, params: &SegmentationParams) -> Vec<Patch> {
    let w = img.width() as usize;
    let h = img.height() as usize;
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let hsv = smoothed_hsv_planes(img);

    let image_area = (w * h) as f64;
    let min_area = params.min_area_ratio * image_area;
    let max_area = params.max_area_ratio * image_area;

    let mut patches = Vec::new();
    let mut next_id = 0usize;

    for color in PatchColor::ALL {
        let range = palette_range(color);
        let mut mask = in_range(&hsv, w, h, &range);
        open_close(&mut mask, w, h);

        for comp in connected_components(&mask, w, h) {
            let area = comp.area as f64;
            if area < min_area || area > max_area {
                continue;
            }
            patches.push(Patch {
                color,
                bbox: BoundingBox {
                    x: comp.min_x as f32,
                    y: comp.min_y as f32,
                    width: (comp.max_x - comp.min_x + 1) as f32,
                    height: (comp.max_y - comp.min_y + 1) as f32,
                },
                center: Point2::new(
                    (comp.sum_x / area) as f32,
                    (comp.sum_y / area) as f32,
                ),
                area,
                id: next_id,
            });
            next_id += 1;
        }
    }

    debug!("segmentation found {} patches", patches.len());
    patches
}

struct HsvPlanes {
    hue: Vec<u8>,
    sat: Vec<u8>,
    val: Vec<u8>,
}

/// Convert to HSV (OpenCV 8-bit convention) and box-smooth each plane 3×3,
/// mirroring the light blur the masks are thresholded from.
fn smoothed_hsv_planes(img: &RgbImage) -> HsvPlanes {
    let w = img.width() as usize;
    let h = img.height() as usize;
    let mut hue = vec![0u8; w * h];
    let mut sat = vec![0u8; w * h];
    let mut val = vec![0u8; w * h];

    for (i, px) in img.pixels().enumerate() {
        let [hh, ss, vv] = rgb_to_hsv(px.0[0], px.0[1], px.0[2]);
        hue[i] = hh;
        sat[i] = ss;
        val[i] = vv;
    }

    HsvPlanes {
        hue: box_blur_3x3(&hue, w, h),
        sat: box_blur_3x3(&sat, w, h),
        val: box_blur_3x3(&val, w, h),
    }
}

/// OpenCV 8-bit HSV: H in [0,180), S and V in [0,255].
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (f32::from(r), f32::from(g), f32::from(b));
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let h360 = if delta <= 0.0 {
        0.0
    } else if max == rf {
        60.0 * (((gf - bf) / delta).rem_euclid(6.0))
    } else if max == gf {
        60.0 * ((bf - rf) / delta + 2.0)
    } else {
        60.0 * ((rf - gf) / delta + 4.0)
    };

    [
        ((h360 / 2.0).round() as u16 % 180) as u8,
        s.round() as u8,
        v.round() as u8,
    ]
}

fn box_blur_3x3(plane: &[u8], w: usize, h: usize) -> Vec<u8> {
    let mut out = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0u32;
            let mut count = 0u32;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    let ny = y as i32 + dy;
                    let nx = x as i32 + dx;
                    if ny >= 0 && (ny as usize) < h && nx >= 0 && (nx as usize) < w {
                        acc += u32::from(plane[ny as usize * w + nx as usize]);
                        count += 1;
                    }
                }
            }
            out[y * w + x] = (acc / count) as u8;
        }
    }
    out
}

fn in_range(hsv: &HsvPlanes, w: usize, h: usize, range: &HsvRange) -> Vec<bool> {
    let mut mask = vec![false; w * h];
    for i in 0..w * h {
        if hsv.sat[i] < range.sat_min || hsv.val[i] < range.val_min {
            continue;
        }
        let hue = hsv.hue[i];
        mask[i] = range.hue.iter().any(|&(lo, hi)| hue >= lo && hue <= hi);
    }
    mask
}

/// Morphological open then close with a 3×3 cross element.
fn open_close(mask: &mut Vec<bool>, w: usize, h: usize) {
    let eroded = morph(mask, w, h, true);
    *mask = morph(&eroded, w, h, false);
    let dilated = morph(mask, w, h, false);
    *mask = morph(&dilated, w, h, true);
}

const CROSS: [(i32, i32); 5] = [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)];

fn morph(mask: &[bool], w: usize, h: usize, erode: bool) -> Vec<bool> {
    let mut out = vec![false; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut any = false;
            let mut all = true;
            for (dx, dy) in CROSS {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                let inside = nx >= 0 && (nx as usize) < w && ny >= 0 && (ny as usize) < h;
                let v = inside && mask[ny as usize * w + nx as usize];
                any |= v;
                // Pixels outside the frame count as background for erosion.
                all &= v;
            }
            out[y * w + x] = if erode { all } else { any };
        }
    }
    out
}

struct Component {
    area: usize,
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
    sum_x: f64,
    sum_y: f64,
}

/// 8-connected component labeling by iterative region growing.
fn connected_components(mask: &[bool], w: usize, h: usize) -> Vec<Component> {
    let mut visited = vec![false; w * h];
    let mut components = Vec::new();
    let mut stack = Vec::new();

    for start in 0..w * h {
        if !mask[start] || visited[start] {
            continue;
        }
        visited[start] = true;
        stack.push(start);

        let mut comp = Component {
            area: 0,
            min_x: usize::MAX,
            min_y: usize::MAX,
            max_x: 0,
            max_y: 0,
            sum_x: 0.0,
            sum_y: 0.0,
        };

        while let Some(i) = stack.pop() {
            let x = i % w;
            let y = i / w;
            comp.area += 1;
            comp.min_x = comp.min_x.min(x);
            comp.min_y = comp.min_y.min(y);
            comp.max_x = comp.max_x.max(x);
            comp.max_y = comp.max_y.max(y);
            comp.sum_x += x as f64;
            comp.sum_y += y as f64;

            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx < 0 || ny < 0 || nx as usize >= w || ny as usize >= h {
                        continue;
                    }
                    let ni = ny as usize * w + nx as usize;
                    if mask[ni] && !visited[ni] {
                        visited[ni] = true;
                        stack.push(ni);
                    }
                }
            }
        }

        components.push(comp);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn blank(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([255, 255, 255]))
    }

    fn fill_square(img: &mut RgbImage, x0: u32, y0: u32, side: u32, color: Rgb<u8>) {
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                img.put_pixel(x, y, color);
            }
        }
    }

    #[test]
    fn hsv_matches_opencv_convention() {
        assert_eq!([0, 255, 255], rgb_to_hsv(255, 0, 0));
        assert_eq!([60, 255, 255], rgb_to_hsv(0, 255, 0));
        assert_eq!([120, 255, 255], rgb_to_hsv(0, 0, 255));
        assert_eq!([30, 255, 255], rgb_to_hsv(255, 255, 0));
        assert_eq!([90, 255, 255], rgb_to_hsv(0, 255, 255));
        assert_eq!([150, 255, 255], rgb_to_hsv(255, 0, 255));
        assert_eq!([0, 0, 255], rgb_to_hsv(255, 255, 255));
        assert_eq!([0, 0, 0], rgb_to_hsv(0, 0, 0));
    }

    #[test]
    fn blank_image_yields_no_patches() {
        let img = blank(64, 64);
        assert!(segment_color_patches(&img, &SegmentationParams::default()).is_empty());
    }

    #[test]
    fn single_red_square_is_segmented() {
        let mut img = blank(200, 200);
        fill_square(&mut img, 50, 60, 40, Rgb([255, 0, 0]));

        let patches = segment_color_patches(&img, &SegmentationParams::default());
        assert_eq!(1, patches.len());

        let p = &patches[0];
        assert_eq!(PatchColor::Red, p.color);
        assert_eq!(0, p.id);
        // Centroid of a filled square sits at its middle.
        assert!((p.center.x - 69.5).abs() < 1.5, "center.x = {}", p.center.x);
        assert!((p.center.y - 79.5).abs() < 1.5, "center.y = {}", p.center.y);
        assert!(p.bbox.width >= 36.0 && p.bbox.width <= 42.0);
    }

    #[test]
    fn speckle_below_min_area_is_dropped() {
        let mut img = blank(200, 200);
        // 3x3 = 9 px, well under 0.06% of 40000 px... but morphology alone
        // would keep it; the area band must reject it.
        fill_square(&mut img, 10, 10, 3, Rgb([0, 255, 0]));
        let params = SegmentationParams {
            min_area_ratio: 0.01,
            ..SegmentationParams::default()
        };
        assert!(segment_color_patches(&img, &params).is_empty());
    }

    #[test]
    fn oversized_region_is_dropped() {
        let mut img = blank(100, 100);
        fill_square(&mut img, 0, 0, 80, Rgb([0, 0, 255])); // 64% of image
        assert!(segment_color_patches(&img, &SegmentationParams::default()).is_empty());
    }

    #[test]
    fn ids_are_dense_in_palette_order() {
        let mut img = blank(300, 300);
        fill_square(&mut img, 20, 20, 40, Rgb([0, 0, 255])); // blue
        fill_square(&mut img, 100, 20, 40, Rgb([255, 0, 0])); // red
        fill_square(&mut img, 180, 20, 40, Rgb([255, 255, 0])); // yellow

        let patches = segment_color_patches(&img, &SegmentationParams::default());
        assert_eq!(3, patches.len());
        let order: Vec<(usize, PatchColor)> = patches.iter().map(|p| (p.id, p.color)).collect();
        assert_eq!(
            vec![
                (0, PatchColor::Red),
                (1, PatchColor::Blue),
                (2, PatchColor::Yellow)
            ],
            order
        );
    }
}
