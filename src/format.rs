//! Image format and negotiation value types.
//!
//! This module provides the vocabulary shared by the negotiation state
//! machine and the hardware programming path: pixel encodings, frame
//! formats, rectangles and frame intervals.
//!
//! # Design Principles
//!
//! - **Type safety**: enums instead of raw format codes
//! - **Zero-cost**: small, Copy types wherever possible
//! - **Permissive negotiation**: values are clamped, never rejected

use std::fmt;

/// Default frame width used at pipe construction.
pub const DEFAULT_WIDTH: u32 = 640;
/// Default frame height used at pipe construction.
pub const DEFAULT_HEIGHT: u32 = 480;

// ============================================================================
// Pads and state selection
// ============================================================================

/// A connection point of a pipe.
///
/// Each pipe has exactly one sink (input) and one source (output) pad,
/// each carrying one image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pad {
    /// The sensor-facing input pad.
    Sink,
    /// The memory/encoder-facing output pad.
    Source,
}

impl Pad {
    /// Short name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sink => "sink",
            Self::Source => "source",
        }
    }
}

/// Selects the committed or the trial copy of the per-pad state.
///
/// The two copies are independent instances of the same value types.
/// `Active` is what the hardware will be programmed with and is locked
/// while streaming; `Proposed` is a scratch copy that stays writable so
/// clients can validate a configuration before committing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Which {
    /// Committed state, applied to hardware at stream start.
    Active,
    /// Trial state for look-ahead negotiation.
    Proposed,
}

// ============================================================================
// Pixel encodings
// ============================================================================

/// Logical pixel encoding carried on a pad.
///
/// The source-side encoding space is coarser than the hardware layout
/// space: the 4:2:0 and 16-bit variants double as the advertised stand-ins
/// for semiplanar/planar layouts that have no distinct encoding of their
/// own, so several encodings intentionally share one packer format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelEncoding {
    /// RGB 8-bit per channel, 24-bit bus.
    Rgb888,
    /// BGR 8-bit per channel, 24-bit bus.
    Bgr888,
    /// RGB 5:6:5, 16-bit bus.
    Rgb565,
    /// YUV 4:4:4, 24-bit bus (sink side working format).
    Yuv888,
    /// YUYV 4:2:2 packed.
    Yuyv,
    /// YVYU 4:2:2 packed.
    Yvyu,
    /// UYVY 4:2:2 packed.
    Uyvy,
    /// VYUY 4:2:2 packed.
    Vyuy,
    /// 8-bit greyscale.
    Y8,
    /// YUYV with 4:2:0 subsampling (semiplanar NV12 stand-in).
    Yuyv420,
    /// YVYU with 4:2:0 subsampling (semiplanar NV21 stand-in).
    Yvyu420,
    /// YUYV on a single 16-bit lane (semiplanar NV16 stand-in).
    Yuyv16,
    /// YVYU on a single 16-bit lane (semiplanar NV61 stand-in).
    Yvyu16,
    /// UYVY with 4:2:0 subsampling (planar I420 stand-in).
    Uyvy420,
    /// VYUY with 4:2:0 subsampling (planar YV12 stand-in).
    Vyuy420,
}

impl PixelEncoding {
    /// Whether this encoding carries luma/chroma rather than RGB samples.
    ///
    /// Drives the sink-to-source propagation rule: the hardware's internal
    /// working format is fixed per sink class, so a luma/chroma sink forces
    /// a chrominance-subsampled representative source encoding.
    pub fn is_yuv(self) -> bool {
        !matches!(self, Self::Rgb888 | Self::Bgr888 | Self::Rgb565)
    }
}

// ============================================================================
// Colorimetry
// ============================================================================

/// Color space of the image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Colorspace {
    /// Unset; clamped to Rec.709 during negotiation.
    #[default]
    Default,
    /// sRGB.
    Srgb,
    /// SMPTE 170M (SD).
    Smpte170m,
    /// Rec.709 (HD).
    Rec709,
    /// Rec.2020 (UHD).
    Bt2020,
}

/// Opto-electronic transfer function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransferFunction {
    /// Derived from the color space.
    #[default]
    Default,
    /// sRGB transfer curve.
    Srgb,
    /// Rec.709 transfer curve.
    Rec709,
}

/// Y'CbCr encoding matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum YcbcrEncoding {
    /// Derived from the color space.
    #[default]
    Default,
    /// BT.601 matrix.
    Bt601,
    /// Rec.709 matrix.
    Rec709,
}

/// Sample quantization range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quantization {
    /// Derived from the color space.
    #[default]
    Default,
    /// Full range samples.
    FullRange,
    /// Limited (broadcast) range samples.
    LimitedRange,
}

/// Complete colorimetry description of an image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Colorimetry {
    /// Color space.
    pub colorspace: Colorspace,
    /// Transfer function.
    pub xfer_func: TransferFunction,
    /// Y'CbCr encoding.
    pub ycbcr_enc: YcbcrEncoding,
    /// Quantization range.
    pub quantization: Quantization,
}

impl Colorimetry {
    /// Rec.709 with derived defaults, the pipeline's baseline colorimetry.
    pub const REC709: Self = Self {
        colorspace: Colorspace::Rec709,
        xfer_func: TransferFunction::Default,
        ycbcr_enc: YcbcrEncoding::Default,
        quantization: Quantization::Default,
    };

    /// Clamp unset colorimetry to the baseline.
    ///
    /// An unset color space resets the whole description; the companion
    /// fields fall back to "derived" so they stay consistent with it.
    pub fn clamp(&mut self) {
        if self.colorspace == Colorspace::Default {
            *self = Self::REC709;
        }
    }
}

// ============================================================================
// Field order
// ============================================================================

/// Interlacing field order of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldOrder {
    /// Caller does not care; normalized to [`FieldOrder::None`].
    Any,
    /// Progressive frames.
    #[default]
    None,
    /// Interlaced, both fields in one buffer.
    Interlaced,
    /// Alternating single fields; normalized to [`FieldOrder::None`]
    /// (the pixel pipeline cannot process single fields).
    Alternate,
}

// ============================================================================
// Image format
// ============================================================================

/// Image format carried on a pad (encoding, geometry, colorimetry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageFormat {
    /// Logical pixel encoding.
    pub encoding: PixelEncoding,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Field order.
    pub field: FieldOrder,
    /// Colorimetry.
    pub colorimetry: Colorimetry,
}

impl ImageFormat {
    /// Default format for a pad: 640x480, progressive, Rec.709, with the
    /// pad's default encoding.
    pub const fn default_for(pad: Pad) -> Self {
        Self {
            encoding: match pad {
                Pad::Sink => PixelEncoding::Rgb888,
                Pad::Source => PixelEncoding::Rgb565,
            },
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            field: FieldOrder::None,
            colorimetry: Colorimetry::REC709,
        }
    }

    /// The format's frame size.
    pub const fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An axis-aligned rectangle inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Horizontal offset of the top-left corner.
    pub left: u32,
    /// Vertical offset of the top-left corner.
    pub top: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// The full-frame rectangle of `size` anchored at the origin.
    pub const fn from_size(size: Size) -> Self {
        Self {
            left: 0,
            top: 0,
            width: size.width,
            height: size.height,
        }
    }

    /// The rectangle's size.
    pub const fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Whether `self` lies entirely inside `other`.
    pub fn is_inside(&self, other: &Rect) -> bool {
        self.left >= other.left
            && self.top >= other.top
            && self.left + self.width <= other.left + other.width
            && self.top + self.height <= other.top + other.height
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}@({},{})",
            self.width, self.height, self.left, self.top
        )
    }
}

// ============================================================================
// Frame interval
// ============================================================================

/// Frame interval as a rational number of seconds per frame (8 bytes, Copy).
///
/// A fraction represents common rates exactly, e.g. 29.97 fps is an
/// interval of 1001/30000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameInterval {
    /// Numerator in seconds.
    pub numerator: u32,
    /// Denominator in seconds.
    pub denominator: u32,
}

impl FrameInterval {
    /// 1/30 s, the construction-time default on both pads.
    pub const DEFAULT: Self = Self::new(1, 30);

    /// Create a new frame interval.
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// A zero numerator or denominator means "unset"; such a request falls
    /// back to the sink interval during negotiation.
    pub const fn is_unset(&self) -> bool {
        self.numerator == 0 || self.denominator == 0
    }

    /// This interval stretched by an integer frame-skip ratio.
    pub const fn scaled(&self, ratio: u32) -> Self {
        Self {
            numerator: self.numerator * ratio,
            denominator: self.denominator,
        }
    }
}

impl Default for FrameInterval {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for FrameInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
