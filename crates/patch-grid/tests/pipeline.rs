mod common;

use common::{blank, draw_square, marker_image};
use image::Rgb;
use patch_grid::{
    detect_marker_image, DetectParams, FailureReason, SegmentationParams, Verdict,
};

fn run(img: &image::RgbImage) -> patch_grid::Detection {
    detect_marker_image(img, &SegmentationParams::default(), &DetectParams::default())
}

#[test]
fn synthetic_marker_passes_end_to_end() {
    // Squares of 110 px span roughly 410x370 of the 640x480 frame, putting
    // hull coverage just under 0.50.
    let det = run(&marker_image(110));

    match det.verdict {
        Verdict::Pass { percentage } => {
            assert!(
                (45..=52).contains(&percentage),
                "unexpected coverage percentage {percentage}"
            );
        }
        other => panic!("expected a pass, got {other:?}"),
    }

    let spacing = det.spacing.expect("spacing metrics");
    assert!(spacing.cvx < 0.1, "cvx = {}", spacing.cvx);
    assert!(spacing.cvy < 0.1, "cvy = {}", spacing.cvy);

    let grid = det.grid.expect("grid assignment");
    let mut ids = grid.ids().to_vec();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(9, ids.len());
}

#[test]
fn missing_cell_fails_grid_assignment() {
    let mut img = marker_image(110);
    // Paint the center square back to white: 8 patches cannot fill 9 cells.
    draw_square(&mut img, 320, 240, 112, Rgb([255, 255, 255]));

    let det = run(&img);
    assert_eq!(
        Verdict::Fail {
            reason: FailureReason::AssignGrid
        },
        det.verdict
    );
}

#[test]
fn scattered_blobs_do_not_pass() {
    // Nine blobs with no grid structure, confined to a region small enough
    // that no coverage fallback can fire.
    let mut img = blank();
    let spots = [
        (120u32, 110u32),
        (360, 120),
        (230, 140),
        (130, 320),
        (310, 230),
        (200, 280),
        (280, 330),
        (380, 300),
        (160, 200),
    ];
    let colors = [
        Rgb([255u8, 0, 0]),
        Rgb([0, 255, 0]),
        Rgb([0, 0, 255]),
        Rgb([255, 255, 0]),
        Rgb([255, 0, 255]),
    ];
    for (i, &(x, y)) in spots.iter().enumerate() {
        draw_square(&mut img, x, y, 36, colors[i % colors.len()]);
    }

    let det = run(&img);
    assert!(
        !det.verdict.is_pass(),
        "random blobs must not be accepted as a marker: {:?}",
        det.verdict
    );
}

#[test]
fn tiny_marker_is_rejected_for_low_coverage() {
    // A well-formed grid squeezed into a corner of the frame: geometry is
    // fine, coverage is not.
    let mut img = blank();
    let colors = [
        Rgb([255u8, 0, 0]),
        Rgb([0, 255, 0]),
        Rgb([0, 0, 255]),
        Rgb([255, 255, 0]),
        Rgb([255, 0, 255]),
    ];
    for r in 0..3u32 {
        for c in 0..3u32 {
            draw_square(
                &mut img,
                60 + c * 50,
                60 + r * 44,
                30,
                colors[((r * 3 + c) % 5) as usize],
            );
        }
    }

    let det = run(&img);
    assert_eq!(
        Verdict::Fail {
            reason: FailureReason::LowCoverage
        },
        det.verdict
    );
}
