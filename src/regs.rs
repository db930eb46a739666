//! Per-pipe register layout and the hardware access seams.
//!
//! Each pipe owns an identical register block at a fixed base address;
//! only the Main pipe carries the color-conversion block. Offsets and
//! field layouts mirror the pixel-processing stage's programming model.
//! All hardware access goes through the [`RegisterBus`] trait so the core
//! stays free of MMIO concerns.

use crate::error::{Error, Result};

// ============================================================================
// Pipe identity
// ============================================================================

/// One independent instance of the pixel-processing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipeId {
    /// Main pipe; hosts the color-conversion stage.
    Main,
    /// Auxiliary pipe.
    Auxiliary,
}

impl PipeId {
    /// Derive the pipe identity from a media-entity name.
    ///
    /// The name must contain `"main"` or `"aux"`; anything else is a
    /// configuration error surfaced at construction time, not at use time.
    pub fn from_entity_name(name: &str) -> Result<Self> {
        if name.contains("main") {
            Ok(Self::Main)
        } else if name.contains("aux") {
            Ok(Self::Auxiliary)
        } else {
            Err(Error::Unsupported(name.to_owned()))
        }
    }

    /// Whether this pipe carries the color-conversion stage.
    pub const fn hosts_color_conversion(self) -> bool {
        matches!(self, Self::Main)
    }

    /// Base address of this pipe's register block.
    const fn bank(self) -> u32 {
        match self {
            Self::Main => 0x900,
            Self::Auxiliary => 0xD00,
        }
    }
}

// ============================================================================
// Register offsets (per-pipe block)
// ============================================================================

/// Frame-control register (frame skipping).
pub const fn fctcr(pipe: PipeId) -> u32 {
    pipe.bank()
}

/// Crop start register (window origin).
pub const fn crstr(pipe: PipeId) -> u32 {
    pipe.bank() + 0x04
}

/// Crop size register (window size + enable).
pub const fn crszr(pipe: PipeId) -> u32 {
    pipe.bank() + 0x08
}

/// Decimation control register.
pub const fn dccr(pipe: PipeId) -> u32 {
    pipe.bank() + 0x0C
}

/// Downsize control register (dividers + enable).
pub const fn dscr(pipe: PipeId) -> u32 {
    pipe.bank() + 0x10
}

/// Downsize ratio register.
pub const fn dsrtior(pipe: PipeId) -> u32 {
    pipe.bank() + 0x14
}

/// Downsize target size register.
pub const fn dsszr(pipe: PipeId) -> u32 {
    pipe.bank() + 0x18
}

/// Gamma correction control register.
pub const fn gmcr(pipe: PipeId) -> u32 {
    pipe.bank() + 0x70
}

/// Pixel-packer control register.
pub const fn ppcr(pipe: PipeId) -> u32 {
    pipe.bank() + 0xC0
}

// ============================================================================
// Register fields
// ============================================================================

/// Frame-skip code field in the frame-control register.
pub const FCTCR_FRATE_MASK: u32 = 0x3;

/// Horizontal window start position.
pub const CRSTR_HSTART_SHIFT: u32 = 0;
/// Vertical window start position.
pub const CRSTR_VSTART_SHIFT: u32 = 16;

/// Crop enable bit.
pub const CRSZR_ENABLE: u32 = 1 << 31;
/// Horizontal window size.
pub const CRSZR_HSIZE_SHIFT: u32 = 0;
/// Vertical window size.
pub const CRSZR_VSIZE_SHIFT: u32 = 16;

/// Decimation enable bit.
pub const DCCR_ENABLE: u32 = 1;
/// Horizontal decimation exponent.
pub const DCCR_HDEC_SHIFT: u32 = 1;
/// Vertical decimation exponent.
pub const DCCR_VDEC_SHIFT: u32 = 3;

/// Horizontal downsize divider.
pub const DSCR_HDIV_SHIFT: u32 = 0;
/// Vertical downsize divider.
pub const DSCR_VDIV_SHIFT: u32 = 16;
/// Downsize enable bit; latches the previously written geometry.
pub const DSCR_ENABLE: u32 = 1 << 31;

/// Horizontal downsize ratio.
pub const DSRTIOR_HRATIO_SHIFT: u32 = 0;
/// Vertical downsize ratio.
pub const DSRTIOR_VRATIO_SHIFT: u32 = 16;

/// Horizontal downsize target size.
pub const DSSZR_HSIZE_SHIFT: u32 = 0;
/// Vertical downsize target size.
pub const DSSZR_VSIZE_SHIFT: u32 = 16;

/// Gamma correction enable bit.
pub const GMCR_ENABLE: u32 = 1;

/// Swap the chroma (or R/B) channel pair at the packer output.
pub const PPCR_SWAPRB: u32 = 1 << 4;

/// Packer format: RGB888 or YUV444 into one buffer.
pub const PPCR_FORMAT_RGB888_YUV444: u32 = 0x0;
/// Packer format: RGB565.
pub const PPCR_FORMAT_RGB565: u32 = 0x1;
/// Packer format: ARGB8888.
pub const PPCR_FORMAT_ARGB8888: u32 = 0x2;
/// Packer format: RGBA8888.
pub const PPCR_FORMAT_RGBA8888: u32 = 0x3;
/// Packer format: 8-bit greyscale.
pub const PPCR_FORMAT_Y8: u32 = 0x4;
/// Packer format: planar YUV 4:4:4.
pub const PPCR_FORMAT_YUV444: u32 = 0x5;
/// Packer format: packed YUYV 4:2:2.
pub const PPCR_FORMAT_YUYV: u32 = 0x6;
/// Packer format: semiplanar 4:2:2 (NV61 layout).
pub const PPCR_FORMAT_NV61: u32 = 0x7;
/// Packer format: semiplanar 4:2:0 (NV21 layout).
pub const PPCR_FORMAT_NV21: u32 = 0x8;
/// Packer format: planar 4:2:0 (YV12 layout).
pub const PPCR_FORMAT_YV12: u32 = 0x9;
/// Packer format: packed UYVY 4:2:2.
pub const PPCR_FORMAT_UYVY: u32 = 0xa;

// ============================================================================
// Color conversion block (Main pipe only)
// ============================================================================

/// Color-conversion mode register.
pub const YUVCR: u32 = 0x980;
/// Conversion enable bit.
pub const YUVCR_ENABLE: u32 = 1;
/// Clamp output as RGB rather than YUV.
pub const YUVCR_TYPE_RGB: u32 = 1 << 1;
/// Clamp conversion output.
pub const YUVCR_CLAMP: u32 = 1 << 2;
/// First conversion-matrix coefficient register; the six coefficient
/// registers are consecutive words starting here.
pub const YUVRR1: u32 = 0x984;

// ============================================================================
// Hardware seams
// ============================================================================

/// Raw register access collaborator.
///
/// Assumed synchronous; failures are opaque to this core and surface as
/// [`Error::Io`] from the stream programmer. There is no retry logic here,
/// all programming is fire-and-forget from this layer's perspective.
pub trait RegisterBus {
    /// Write a full register word.
    fn write(&mut self, pipe: PipeId, offset: u32, value: u32) -> Result<()>;
    /// Set the bits of `mask`, read-modify-write.
    fn set_bits(&mut self, pipe: PipeId, offset: u32, mask: u32) -> Result<()>;
    /// Clear the bits of `mask`, read-modify-write.
    fn clear_bits(&mut self, pipe: PipeId, offset: u32, mask: u32) -> Result<()>;
}

/// Device power gating collaborator.
///
/// Runtime control writes reach hardware only while the device is powered;
/// otherwise the value is cached and re-applied at stream start.
pub trait PowerGate {
    /// Whether the device is currently powered and accepting writes.
    fn is_powered(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_id_from_entity_name() {
        assert_eq!(
            PipeId::from_entity_name("pixproc-main").unwrap(),
            PipeId::Main
        );
        assert_eq!(
            PipeId::from_entity_name("pixproc-aux").unwrap(),
            PipeId::Auxiliary
        );
        assert!(PipeId::from_entity_name("pixproc-other").is_err());
    }

    #[test]
    fn test_register_banks_are_disjoint() {
        assert_eq!(fctcr(PipeId::Main), 0x900);
        assert_eq!(fctcr(PipeId::Auxiliary), 0xD00);
        assert_eq!(ppcr(PipeId::Main), 0x9C0);
        assert_eq!(gmcr(PipeId::Auxiliary), 0xD70);
    }

    #[test]
    fn test_only_main_hosts_color_conversion() {
        assert!(PipeId::Main.hosts_color_conversion());
        assert!(!PipeId::Auxiliary.hosts_color_conversion());
    }
}
