//! Downscale planning.
//!
//! The scaling engine is split in two stages: a coarse decimation block
//! dropping pixels by powers of two (up to 8x per axis) and a fine
//! downsize resampler driven by a fixed-point ratio and divider (up to 8x
//! per axis). Chaining them reaches a total downscale of 64x with a
//! resampler limited to 8x. This module computes the register fields for
//! both stages from a crop size and a compose (target) size.

use crate::format::Size;

/// Maximum per-axis ratio of the decimation block.
pub const MAX_DECIMATION_RATIO: u32 = 8;
/// Maximum per-axis ratio of the downsize block.
pub const MAX_DOWNSIZE_RATIO: u32 = 8;
/// Maximum total per-axis downscale (decimation x downsize).
pub const MAX_DOWNSCALE_RATIO: u32 = 64;

/// Fixed-point unit of the downsize ratio fields (1.0 == 8192).
const RATIO_CONS: u32 = 8192;
/// Largest representable ratio field value.
const RATIO_MAX: u32 = 65535;
/// Fixed-point unit of the downsize divider fields (1.0 == 1024).
const DIV_CONS: u32 = 1024;
/// Largest representable divider field value.
const DIV_MAX: u32 = 1023;

/// Planned decimation and downsize register fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Downscale {
    /// Horizontal decimation exponent (0..=3, factor `1 << hdec`).
    pub hdec: u32,
    /// Vertical decimation exponent (0..=3, factor `1 << vdec`).
    pub vdec: u32,
    /// Horizontal resampling ratio, 8192 == 1:1.
    pub hratio: u32,
    /// Vertical resampling ratio, 8192 == 1:1.
    pub vratio: u32,
    /// Horizontal output divider, 1024 == 1:1.
    pub hdiv: u32,
    /// Vertical output divider, 1024 == 1:1.
    pub vdiv: u32,
}

impl Downscale {
    /// Whether the decimation stage does any work and must be enabled.
    pub const fn decimates(&self) -> bool {
        self.hdec != 0 || self.vdec != 0
    }
}

/// Plan the two-stage downscale from `crop` to `compose`.
///
/// Each axis is halved (incrementing the decimation exponent) until the
/// remaining factor fits the downsize block, i.e. until the
/// post-decimation dimension no longer exceeds the compose dimension times
/// the maximum downsize ratio. This picks the minimal decimation; the
/// residual factor becomes the fixed-point ratio/divider pair, truncating
/// and clamped to the field widths.
///
/// Pure and total. Callers guarantee `compose <= crop` and
/// `compose >= crop / 64` on both axes (negotiation clamps both), so at
/// most three halvings ever occur.
pub fn plan(crop: Size, compose: Size) -> Downscale {
    let mut hdec = 0;
    let mut vdec = 0;
    let mut h_post_dec = crop.width;
    let mut v_post_dec = crop.height;

    while compose.width * MAX_DOWNSIZE_RATIO < h_post_dec {
        hdec += 1;
        h_post_dec /= 2;
    }
    while compose.height * MAX_DOWNSIZE_RATIO < v_post_dec {
        vdec += 1;
        v_post_dec /= 2;
    }

    let hratio = (h_post_dec * RATIO_CONS / compose.width).min(RATIO_MAX);
    let vratio = (v_post_dec * RATIO_CONS / compose.height).min(RATIO_MAX);
    let hdiv = (DIV_CONS * compose.width / h_post_dec).min(DIV_MAX);
    let vdiv = (DIV_CONS * compose.height / v_post_dec).min(DIV_MAX);

    tracing::debug!("decimation config: hdec: {:#x}, vdec: {:#x}", hdec, vdec);
    tracing::debug!(
        "downsize config: hratio: {:#x}, vratio: {:#x}, hdiv: {:#x}, vdiv: {:#x}",
        hratio,
        vratio,
        hdiv,
        vdiv
    );

    Downscale {
        hdec,
        vdec,
        hratio,
        vratio,
        hdiv,
        vdiv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_unity_fields() {
        let plan = plan(Size::new(640, 480), Size::new(640, 480));
        assert_eq!(plan.hdec, 0);
        assert_eq!(plan.vdec, 0);
        assert_eq!(plan.hratio, 8192);
        assert_eq!(plan.vratio, 8192);
        assert_eq!(plan.hdiv, 1023); // 1024 truncates into the 10-bit field
        assert_eq!(plan.vdiv, 1023);
        assert!(!plan.decimates());
    }

    #[test]
    fn test_exact_eight_x_stays_in_resampler() {
        // At exactly 8x the halving condition (strictly-exceeds) never
        // fires; the resampler covers it alone and the exact ratio 65536
        // clamps into the field.
        let plan = plan(Size::new(640, 480), Size::new(80, 60));
        assert_eq!(plan.hdec, 0);
        assert_eq!(plan.vdec, 0);
        assert_eq!(plan.hratio, 65535);
        assert_eq!(plan.vratio, 65535);
        assert_eq!(plan.hdiv, 1024 * 80 / 640);
        assert!(!plan.decimates());
    }

    #[test]
    fn test_beyond_eight_x_decimates_minimally() {
        // 10x per axis: one halving brings the residual factor under 8.
        let plan = plan(Size::new(640, 480), Size::new(64, 48));
        assert_eq!(plan.hdec, 1);
        assert_eq!(plan.vdec, 1);
        assert_eq!(plan.hratio, 320 * 8192 / 64);
        assert_eq!(plan.hdiv, 1024 * 64 / 320);
        assert!(plan.decimates());
    }

    #[test]
    fn test_three_x_uses_resampler_only() {
        let plan = plan(Size::new(1920, 1080), Size::new(640, 360));
        assert_eq!(plan.hdec, 0);
        assert_eq!(plan.vdec, 0);
        assert_eq!(plan.hratio, 1920 * 8192 / 640);
        assert_eq!(plan.hdiv, 1024 * 640 / 1920);
    }

    #[test]
    fn test_sixty_four_x_clamps_ratio_field() {
        let plan = plan(Size::new(4096, 4096), Size::new(64, 64));
        assert_eq!(plan.hdec, 3);
        // Post-decimation 512 against compose 64 is exactly 8x; the exact
        // ratio 65536 exceeds the field and clamps.
        assert_eq!(plan.hratio, 65535);
        assert_eq!(plan.hdiv, 1024 * 64 / 512);
    }

    #[test]
    fn test_fields_stay_in_range_across_valid_inputs() {
        for (cw, ch) in [(16u32, 16u32), (640, 480), (1927, 1083), (4096, 4096)] {
            for denom in [1u32, 2, 3, 7, 8, 31, 64] {
                let compose = Size::new(cw.div_ceil(denom), ch.div_ceil(denom));
                let crop = Size::new(cw, ch);
                let plan = plan(crop, compose);
                assert!(plan.hdec <= 3, "hdec {} for {crop} -> {compose}", plan.hdec);
                assert!(plan.vdec <= 3);
                assert!(plan.hratio <= 65535);
                assert!(plan.vratio <= 65535);
                assert!(plan.hdiv <= 1023);
                assert!(plan.vdiv <= 1023);

                // The ratio field reconstructs the compose size within
                // fixed-point rounding.
                let post_dec = crop.width >> plan.hdec;
                let rebuilt = post_dec * 8192 / plan.hratio;
                assert!(
                    rebuilt.abs_diff(compose.width) <= 1,
                    "rebuilt {rebuilt} vs compose {} for crop {crop}",
                    compose.width
                );
            }
        }
    }
}
