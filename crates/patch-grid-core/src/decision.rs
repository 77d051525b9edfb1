//! Decision fusion: combine the spacing and coverage signals into the final
//! verdict, with layered fallback acceptance.

use log::debug;

use crate::coverage::CoverageResult;
use crate::spacing::SpacingMetrics;
use crate::types::{DetectParams, FailureReason, Verdict};

/// Fuse spacing metrics and coverage into a pass/fail verdict.
///
/// Evaluated in order:
/// 1. spacing passes outright when both CVs are under the hard thresholds;
/// 2. otherwise overwhelming coverage (`ratio >= coverage_fallback`)
///    overrides marginal spacing irregularity;
/// 3. otherwise a softer combined signal (both CVs under the soft
///    thresholds and `ratio >= coverage_soft`) still accepts the spacing;
/// 4. the final pass additionally requires `ratio >= coverage_thresh`.
///
/// On failure the reason is SPACING while spacing is still unaccepted,
/// LOW_COVERAGE when only coverage fell short.
pub fn fuse_decision(
    metrics: &SpacingMetrics,
    coverage: &CoverageResult,
    params: &DetectParams,
) -> Verdict {
    let mut spacing_ok = metrics.cvx <= params.cvx_thresh && metrics.cvy <= params.cvy_thresh;

    if !spacing_ok && coverage.ratio >= params.coverage_fallback {
        debug!(
            "spacing fallback accepted (coverage={:.3} >= {:.3})",
            coverage.ratio, params.coverage_fallback
        );
        spacing_ok = true;
    }
    if !spacing_ok
        && metrics.cvx <= params.soft_cvx_thresh
        && metrics.cvy <= params.soft_cvy_thresh
        && coverage.ratio >= params.coverage_soft
    {
        debug!(
            "spacing soft-fallback accepted (cvx={:.3} cvy={:.3} coverage={:.3})",
            metrics.cvx, metrics.cvy, coverage.ratio
        );
        spacing_ok = true;
    }

    if spacing_ok && coverage.ratio >= params.coverage_thresh {
        Verdict::Pass {
            percentage: (coverage.ratio * 100.0).round() as u32,
        }
    } else if !spacing_ok {
        Verdict::Fail {
            reason: FailureReason::Spacing,
        }
    } else {
        Verdict::Fail {
            reason: FailureReason::LowCoverage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coverage(ratio: f64) -> CoverageResult {
        CoverageResult {
            hull: Vec::new(),
            hull_area: ratio * 1000.0,
            bbox_area: ratio * 1000.0,
            image_area: 1000.0,
            ratio,
            ratio_bbox: 1.0,
        }
    }

    fn metrics(cvx: f32, cvy: f32) -> SpacingMetrics {
        SpacingMetrics { cvx, cvy }
    }

    #[test]
    fn regular_grid_with_enough_coverage_passes() {
        let v = fuse_decision(
            &metrics(0.05, 0.04),
            &coverage(0.62),
            &DetectParams::default(),
        );
        assert_eq!(Verdict::Pass { percentage: 62 }, v);
    }

    #[test]
    fn strong_coverage_overrides_failed_spacing() {
        // cvx above even the soft threshold: only fallback 1 can save it.
        let v = fuse_decision(
            &metrics(0.90, 0.10),
            &coverage(0.58),
            &DetectParams::default(),
        );
        assert_eq!(Verdict::Pass { percentage: 58 }, v);
    }

    #[test]
    fn soft_fallback_needs_all_three_conditions() {
        let params = DetectParams::default();
        let m = metrics(0.58, 0.67); // above hard, under soft thresholds

        // Coverage between soft and fallback: fallback 2 accepts.
        let v = fuse_decision(&m, &coverage(0.52), &params);
        assert_eq!(Verdict::Pass { percentage: 52 }, v);

        // Coverage below the soft threshold: spacing stays failed.
        let v = fuse_decision(&m, &coverage(0.48), &params);
        assert_eq!(
            Verdict::Fail {
                reason: FailureReason::Spacing
            },
            v
        );

        // One cv above its soft threshold: fallback 2 does not fire.
        let v = fuse_decision(&metrics(0.58, 0.72), &coverage(0.52), &params);
        assert_eq!(
            Verdict::Fail {
                reason: FailureReason::Spacing
            },
            v
        );
    }

    #[test]
    fn low_coverage_with_good_spacing_reports_low_coverage() {
        let v = fuse_decision(
            &metrics(0.10, 0.10),
            &coverage(0.30),
            &DetectParams::default(),
        );
        assert_eq!(
            Verdict::Fail {
                reason: FailureReason::LowCoverage
            },
            v
        );
    }

    #[test]
    fn percentage_is_rounded() {
        let v = fuse_decision(
            &metrics(0.0, 0.0),
            &coverage(0.456),
            &DetectParams::default(),
        );
        assert_eq!(Verdict::Pass { percentage: 46 }, v);
    }
}
