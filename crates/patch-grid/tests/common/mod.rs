//! Shared synthetic-image builders for the integration tests. Each test
//! binary compiles its own copy, so not every helper is used everywhere.
#![allow(dead_code)]

use image::{Rgb, RgbImage};

pub const IMG_W: u32 = 640;
pub const IMG_H: u32 = 480;

pub fn blank() -> RgbImage {
    RgbImage::from_pixel(IMG_W, IMG_H, Rgb([255, 255, 255]))
}

pub fn draw_square(img: &mut RgbImage, cx: u32, cy: u32, side: u32, color: Rgb<u8>) {
    let x0 = cx - side / 2;
    let y0 = cy - side / 2;
    for y in y0..y0 + side {
        for x in x0..x0 + side {
            img.put_pixel(x, y, color);
        }
    }
}

/// Nine palette squares on a regular 150×130 grid centered in the frame.
///
/// Cyan is avoided: its hue band overlaps the blue mask, which would yield a
/// harmless but confusing duplicate patch in synthetic imagery.
pub fn marker_image(square_side: u32) -> RgbImage {
    let colors = [
        Rgb([255u8, 0, 0]),   // red
        Rgb([0, 255, 0]),     // green
        Rgb([0, 0, 255]),     // blue
        Rgb([255, 255, 0]),   // yellow
        Rgb([255, 0, 255]),   // magenta
        Rgb([0, 255, 0]),     // green
        Rgb([0, 0, 255]),     // blue
        Rgb([255, 0, 0]),     // red
        Rgb([255, 255, 0]),   // yellow
    ];

    let mut img = blank();
    for r in 0..3u32 {
        for c in 0..3u32 {
            draw_square(
                &mut img,
                170 + c * 150,
                110 + r * 130,
                square_side,
                colors[(r * 3 + c) as usize],
            );
        }
    }
    img
}
