//! Stream-start register programming.
//!
//! Sequences the planned frame-skip, crop, downscale, color-conversion
//! and packer configuration into the ordered register writes issued on
//! the Idle-to-Streaming transition. Write order matters: the downsize
//! ratio and target size must land before the enable-bearing divider
//! write, because the hardware latches geometry on enable.

use crate::catalog;
use crate::error::{Error, Result};
use crate::format::{ImageFormat, Pad, Rect};
use crate::regs::{self, PipeId, RegisterBus};
use crate::scaler;

/// Output of the color-space-conversion planner.
///
/// Programmed verbatim; this core does not interpret the coefficients.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorConvConfig {
    /// The six conversion-matrix coefficient words.
    pub conv_matrix: [u32; 6],
    /// Clamp the conversion output.
    pub clamping: bool,
    /// Clamp as RGB rather than YUV.
    pub clamping_as_rgb: bool,
    /// Enable the conversion stage.
    pub enable: bool,
}

/// Color-space-conversion planning collaborator.
///
/// Given the negotiated sink/source format pair, returns the matrix and
/// mode flags to program, or an error for unsupported encoding pairs
/// (propagated verbatim).
pub trait ColorConverter {
    /// Plan the conversion between `sink` and `source`.
    fn configure(&self, sink: &ImageFormat, source: &ImageFormat) -> Result<ColorConvConfig>;
}

/// Committed state snapshot handed to the programmer at stream start.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StreamConfig<'a> {
    pub pipe: PipeId,
    pub frame_skip: u8,
    pub crop: Rect,
    pub compose: Rect,
    pub sink_fmt: &'a ImageFormat,
    pub src_fmt: &'a ImageFormat,
    pub gamma_correction: bool,
}

/// Program the pipe for streaming.
///
/// Emits, in order: frame-skip code, crop window, decimation (enabled
/// only when it does work), downsize ratio/size/divider, color conversion
/// (Main pipe only), packer format, and finally re-applies the cached
/// runtime controls so hardware matches the last externally set values.
pub(crate) fn apply(
    cfg: &StreamConfig<'_>,
    bus: &mut dyn RegisterBus,
    converter: &dyn ColorConverter,
) -> Result<()> {
    let pipe = cfg.pipe;

    // Frame skipping.
    bus.clear_bits(pipe, regs::fctcr(pipe), regs::FCTCR_FRATE_MASK)?;
    bus.set_bits(pipe, regs::fctcr(pipe), u32::from(cfg.frame_skip))?;

    // Crop window.
    bus.write(
        pipe,
        regs::crstr(pipe),
        (cfg.crop.top << regs::CRSTR_VSTART_SHIFT) | (cfg.crop.left << regs::CRSTR_HSTART_SHIFT),
    )?;
    bus.write(
        pipe,
        regs::crszr(pipe),
        (cfg.crop.width << regs::CRSZR_HSIZE_SHIFT)
            | (cfg.crop.height << regs::CRSZR_VSIZE_SHIFT)
            | regs::CRSZR_ENABLE,
    )?;

    set_downscale(cfg, bus)?;

    // Color conversion between the pad formats, on the hosting pipe only.
    if pipe.hosts_color_conversion() {
        let conv = converter.configure(cfg.sink_fmt, cfg.src_fmt)?;
        for (i, coeff) in conv.conv_matrix.iter().enumerate() {
            bus.write(pipe, regs::YUVRR1 + 4 * i as u32, *coeff)?;
        }

        let mut val = 0;
        if conv.clamping {
            val |= regs::YUVCR_CLAMP;
        }
        if conv.clamping_as_rgb {
            val |= regs::YUVCR_TYPE_RGB;
        }
        if conv.enable {
            val |= regs::YUVCR_ENABLE;
        }
        bus.write(pipe, regs::YUVCR, val)?;
    }

    // Pixel packer, from the source pad format. Negotiation clamps the
    // encoding into the catalog, so a miss here is a state invariant
    // violation rather than a caller mistake.
    let vpix = catalog::lookup_by_code(Pad::Source, cfg.src_fmt.encoding)
        .ok_or(Error::InvalidArgument("source encoding not in catalog"))?;
    let mut val = vpix.packer_format;
    if vpix.swap_uv {
        val |= regs::PPCR_SWAPRB;
    }
    bus.write(pipe, regs::ppcr(pipe), val)?;

    // Re-apply user controls; the writes above may have reset them.
    bus.write(
        pipe,
        regs::gmcr(pipe),
        if cfg.gamma_correction {
            regs::GMCR_ENABLE
        } else {
            0
        },
    )?;

    tracing::debug!(
        "{:?}: stream configuration applied: frate: {}, crop: {}, compose: {}",
        pipe,
        cfg.frame_skip,
        cfg.crop,
        cfg.compose
    );

    Ok(())
}

/// Program the decimation and downsize stages.
fn set_downscale(cfg: &StreamConfig<'_>, bus: &mut dyn RegisterBus) -> Result<()> {
    let pipe = cfg.pipe;
    let plan = scaler::plan(cfg.crop.size(), cfg.compose.size());

    bus.clear_bits(pipe, regs::dccr(pipe), regs::DCCR_ENABLE)?;
    if plan.decimates() {
        bus.write(
            pipe,
            regs::dccr(pipe),
            (plan.hdec << regs::DCCR_HDEC_SHIFT)
                | (plan.vdec << regs::DCCR_VDEC_SHIFT)
                | regs::DCCR_ENABLE,
        )?;
    }

    // Ratio and target size first, divider + enable last.
    bus.clear_bits(pipe, regs::dscr(pipe), regs::DSCR_ENABLE)?;
    bus.write(
        pipe,
        regs::dsrtior(pipe),
        (plan.hratio << regs::DSRTIOR_HRATIO_SHIFT) | (plan.vratio << regs::DSRTIOR_VRATIO_SHIFT),
    )?;
    bus.write(
        pipe,
        regs::dsszr(pipe),
        (cfg.compose.width << regs::DSSZR_HSIZE_SHIFT)
            | (cfg.compose.height << regs::DSSZR_VSIZE_SHIFT),
    )?;
    bus.write(
        pipe,
        regs::dscr(pipe),
        (plan.hdiv << regs::DSCR_HDIV_SHIFT)
            | (plan.vdiv << regs::DSCR_VDIV_SHIFT)
            | regs::DSCR_ENABLE,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    enum Op {
        Write(PipeId, u32, u32),
        SetBits(PipeId, u32, u32),
        ClearBits(PipeId, u32, u32),
    }

    #[derive(Default)]
    struct MockBus {
        ops: Vec<Op>,
        fail_at: Option<usize>,
    }

    impl MockBus {
        fn check(&mut self) -> Result<()> {
            if self.fail_at == Some(self.ops.len()) {
                return Err(Error::Io("bus fault".into()));
            }
            Ok(())
        }
    }

    impl RegisterBus for MockBus {
        fn write(&mut self, pipe: PipeId, offset: u32, value: u32) -> Result<()> {
            self.check()?;
            self.ops.push(Op::Write(pipe, offset, value));
            Ok(())
        }

        fn set_bits(&mut self, pipe: PipeId, offset: u32, mask: u32) -> Result<()> {
            self.check()?;
            self.ops.push(Op::SetBits(pipe, offset, mask));
            Ok(())
        }

        fn clear_bits(&mut self, pipe: PipeId, offset: u32, mask: u32) -> Result<()> {
            self.check()?;
            self.ops.push(Op::ClearBits(pipe, offset, mask));
            Ok(())
        }
    }

    struct FixedConverter(ColorConvConfig);

    impl ColorConverter for FixedConverter {
        fn configure(&self, _: &ImageFormat, _: &ImageFormat) -> Result<ColorConvConfig> {
            Ok(self.0)
        }
    }

    struct FailingConverter;

    impl ColorConverter for FailingConverter {
        fn configure(&self, _: &ImageFormat, _: &ImageFormat) -> Result<ColorConvConfig> {
            Err(Error::Io("unsupported encoding pair".into()))
        }
    }

    fn pad_defaults() -> (ImageFormat, ImageFormat) {
        (
            ImageFormat::default_for(Pad::Sink),
            ImageFormat::default_for(Pad::Source),
        )
    }

    #[test]
    fn test_main_pipe_write_sequence() {
        let (sink, src) = pad_defaults();
        let cfg = StreamConfig {
            pipe: PipeId::Main,
            frame_skip: 2,
            crop: Rect::new(10, 20, 320, 240),
            compose: Rect::new(0, 0, 320, 240),
            sink_fmt: &sink,
            src_fmt: &src,
            gamma_correction: true,
        };
        let mut bus = MockBus::default();
        let conv = FixedConverter(ColorConvConfig {
            conv_matrix: [1, 2, 3, 4, 5, 6],
            clamping: true,
            clamping_as_rgb: false,
            enable: true,
        });

        apply(&cfg, &mut bus, &conv).unwrap();

        let p = PipeId::Main;
        let expected = vec![
            Op::ClearBits(p, regs::fctcr(p), regs::FCTCR_FRATE_MASK),
            Op::SetBits(p, regs::fctcr(p), 2),
            Op::Write(p, regs::crstr(p), (20 << 16) | 10),
            Op::Write(p, regs::crszr(p), 320 | (240 << 16) | regs::CRSZR_ENABLE),
            // 1:1 scaling leaves decimation disabled.
            Op::ClearBits(p, regs::dccr(p), regs::DCCR_ENABLE),
            Op::ClearBits(p, regs::dscr(p), regs::DSCR_ENABLE),
            Op::Write(p, regs::dsrtior(p), 8192 | (8192 << 16)),
            Op::Write(p, regs::dsszr(p), 320 | (240 << 16)),
            Op::Write(p, regs::dscr(p), 1023 | (1023 << 16) | regs::DSCR_ENABLE),
            Op::Write(p, regs::YUVRR1, 1),
            Op::Write(p, regs::YUVRR1 + 4, 2),
            Op::Write(p, regs::YUVRR1 + 8, 3),
            Op::Write(p, regs::YUVRR1 + 12, 4),
            Op::Write(p, regs::YUVRR1 + 16, 5),
            Op::Write(p, regs::YUVRR1 + 20, 6),
            Op::Write(p, regs::YUVCR, regs::YUVCR_CLAMP | regs::YUVCR_ENABLE),
            Op::Write(p, regs::ppcr(p), regs::PPCR_FORMAT_RGB565),
            Op::Write(p, regs::gmcr(p), regs::GMCR_ENABLE),
        ];
        assert_eq!(bus.ops, expected);
    }

    #[test]
    fn test_auxiliary_pipe_skips_color_conversion() {
        let (sink, src) = pad_defaults();
        let cfg = StreamConfig {
            pipe: PipeId::Auxiliary,
            frame_skip: 0,
            crop: Rect::new(0, 0, 640, 480),
            compose: Rect::new(0, 0, 64, 48),
            sink_fmt: &sink,
            src_fmt: &src,
            gamma_correction: false,
        };
        let mut bus = MockBus::default();

        apply(&cfg, &mut bus, &FailingConverter).unwrap();

        // The failing converter was never consulted, and the 10x downscale
        // enabled decimation.
        let p = PipeId::Auxiliary;
        assert!(bus.ops.contains(&Op::Write(
            p,
            regs::dccr(p),
            (1 << regs::DCCR_HDEC_SHIFT) | (1 << regs::DCCR_VDEC_SHIFT) | regs::DCCR_ENABLE,
        )));
        assert!(!bus.ops.iter().any(|op| matches!(
            op,
            Op::Write(_, offset, _) if *offset == regs::YUVCR
        )));
        assert_eq!(*bus.ops.last().unwrap(), Op::Write(p, regs::gmcr(p), 0));
    }

    #[test]
    fn test_converter_failure_propagates() {
        let (sink, src) = pad_defaults();
        let cfg = StreamConfig {
            pipe: PipeId::Main,
            frame_skip: 0,
            crop: Rect::new(0, 0, 640, 480),
            compose: Rect::new(0, 0, 640, 480),
            sink_fmt: &sink,
            src_fmt: &src,
            gamma_correction: false,
        };
        let mut bus = MockBus::default();

        let err = apply(&cfg, &mut bus, &FailingConverter).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_bus_failure_propagates() {
        let (sink, src) = pad_defaults();
        let cfg = StreamConfig {
            pipe: PipeId::Main,
            frame_skip: 1,
            crop: Rect::new(0, 0, 640, 480),
            compose: Rect::new(0, 0, 640, 480),
            sink_fmt: &sink,
            src_fmt: &src,
            gamma_correction: false,
        };
        let mut bus = MockBus {
            fail_at: Some(3),
            ..Default::default()
        };

        let err = apply(&cfg, &mut bus, &FixedConverter(ColorConvConfig::default())).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(bus.ops.len(), 3);
    }
}
