//! Pad-scoped pixel-format catalog.
//!
//! Static tables mapping each logical [`PixelEncoding`] a pad may carry to
//! the hardware packer-format code and channel-swap flag that realize it.
//! The mapping is many-to-one on purpose: the packer format space is
//! coarser than the encoding space, so pairs of encodings differing only
//! in chroma order share a code and differ in `swap_uv`.

use crate::format::{Pad, PixelEncoding};
use crate::regs;

/// One catalog entry: a logical encoding and its packer programming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixMapEntry {
    /// Logical pixel encoding advertised on the pad.
    pub encoding: PixelEncoding,
    /// Hardware packer format code.
    pub packer_format: u32,
    /// Swap the chroma (or R/B) channel pair.
    pub swap_uv: bool,
}

const fn entry(encoding: PixelEncoding, packer_format: u32, swap_uv: bool) -> PixMapEntry {
    PixMapEntry {
        encoding,
        packer_format,
        swap_uv,
    }
}

/// Encodings accepted on the sink pad.
static SINK_PIX_MAP: [PixMapEntry; 2] = [
    entry(PixelEncoding::Rgb888, regs::PPCR_FORMAT_RGB888_YUV444, false),
    entry(PixelEncoding::Yuv888, regs::PPCR_FORMAT_RGB888_YUV444, false),
];

/// Encodings the packer can produce on the source pad.
///
/// Semiplanar and planar layouts have no distinct logical encoding;
/// the 4:2:0 and 16-bit packed encodings stand in for them, so downstream
/// negotiation keeps recognizing only pre-existing codes.
static SOURCE_PIX_MAP: [PixMapEntry; 14] = [
    entry(PixelEncoding::Rgb888, regs::PPCR_FORMAT_RGB888_YUV444, true),
    entry(PixelEncoding::Bgr888, regs::PPCR_FORMAT_RGB888_YUV444, false),
    entry(PixelEncoding::Rgb565, regs::PPCR_FORMAT_RGB565, false),
    entry(PixelEncoding::Yuyv, regs::PPCR_FORMAT_YUYV, false),
    entry(PixelEncoding::Yvyu, regs::PPCR_FORMAT_YUYV, true),
    entry(PixelEncoding::Uyvy, regs::PPCR_FORMAT_UYVY, false),
    entry(PixelEncoding::Vyuy, regs::PPCR_FORMAT_UYVY, true),
    entry(PixelEncoding::Y8, regs::PPCR_FORMAT_Y8, false),
    entry(PixelEncoding::Yuyv420, regs::PPCR_FORMAT_NV21, false),
    entry(PixelEncoding::Yvyu420, regs::PPCR_FORMAT_NV21, true),
    entry(PixelEncoding::Yuyv16, regs::PPCR_FORMAT_NV61, false),
    entry(PixelEncoding::Yvyu16, regs::PPCR_FORMAT_NV61, true),
    entry(PixelEncoding::Uyvy420, regs::PPCR_FORMAT_YV12, false),
    entry(PixelEncoding::Vyuy420, regs::PPCR_FORMAT_YV12, true),
];

fn table(pad: Pad) -> &'static [PixMapEntry] {
    match pad {
        Pad::Sink => &SINK_PIX_MAP,
        Pad::Source => &SOURCE_PIX_MAP,
    }
}

/// Look up the entry for `encoding` on `pad`.
///
/// `None` means the encoding is not supported on that pad; negotiation
/// responds by falling back to the pad's default encoding.
pub fn lookup_by_code(pad: Pad, encoding: PixelEncoding) -> Option<&'static PixMapEntry> {
    table(pad).iter().find(|e| e.encoding == encoding)
}

/// Look up the `index`-th entry of `pad`'s catalog.
///
/// `None` signals end of enumeration, not an error.
pub fn lookup_by_index(pad: Pad, index: usize) -> Option<&'static PixMapEntry> {
    table(pad).get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sizes() {
        assert_eq!(SINK_PIX_MAP.len(), 2);
        assert_eq!(SOURCE_PIX_MAP.len(), 14);
    }

    #[test]
    fn test_lookup_by_code_is_pad_scoped() {
        assert!(lookup_by_code(Pad::Sink, PixelEncoding::Yuv888).is_some());
        assert!(lookup_by_code(Pad::Source, PixelEncoding::Yuv888).is_none());
        assert!(lookup_by_code(Pad::Source, PixelEncoding::Rgb565).is_some());
        assert!(lookup_by_code(Pad::Sink, PixelEncoding::Rgb565).is_none());
    }

    #[test]
    fn test_index_enumeration_terminates() {
        assert!(lookup_by_index(Pad::Sink, 1).is_some());
        assert!(lookup_by_index(Pad::Sink, 2).is_none());
        assert!(lookup_by_index(Pad::Source, 13).is_some());
        assert!(lookup_by_index(Pad::Source, 14).is_none());
    }

    #[test]
    fn test_chroma_order_pairs_share_packer_code() {
        let yuyv = lookup_by_code(Pad::Source, PixelEncoding::Yuyv).unwrap();
        let yvyu = lookup_by_code(Pad::Source, PixelEncoding::Yvyu).unwrap();
        assert_eq!(yuyv.packer_format, yvyu.packer_format);
        assert!(!yuyv.swap_uv);
        assert!(yvyu.swap_uv);

        // The planar stand-ins alias the same way.
        let i420 = lookup_by_code(Pad::Source, PixelEncoding::Uyvy420).unwrap();
        let yv12 = lookup_by_code(Pad::Source, PixelEncoding::Vyuy420).unwrap();
        assert_eq!(i420.packer_format, yv12.packer_format);
        assert_ne!(i420.swap_uv, yv12.swap_uv);
    }
}
