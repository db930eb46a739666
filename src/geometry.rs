//! Frame and window geometry rules.
//!
//! Pure clamping functions applied during negotiation. They are total:
//! out-of-range input is corrected to the nearest valid value, never
//! rejected.

use crate::catalog;
use crate::format::{FieldOrder, ImageFormat, Pad, Rect};

/// Smallest negotiable frame width.
pub const MIN_WIDTH: u32 = 16;
/// Largest negotiable frame width.
pub const MAX_WIDTH: u32 = 4096;
/// Smallest negotiable frame height.
pub const MIN_HEIGHT: u32 = 16;
/// Largest negotiable frame height.
pub const MAX_HEIGHT: u32 = 4096;

/// The full-frame rectangle of `fmt`, which bounds crop rectangles.
pub const fn default_bound(fmt: &ImageFormat) -> Rect {
    Rect {
        left: 0,
        top: 0,
        width: fmt.width,
        height: fmt.height,
    }
}

/// Clamp `fmt` to what `pad` can carry.
///
/// An encoding outside the pad's catalog resets to the pad default;
/// dimensions clamp into bounds; "any"/"alternating" field orders
/// normalize to progressive; unset colorimetry falls back to Rec.709.
/// Idempotent.
pub fn clamp_format(mut fmt: ImageFormat, pad: Pad) -> ImageFormat {
    if catalog::lookup_by_code(pad, fmt.encoding).is_none() {
        fmt.encoding = ImageFormat::default_for(pad).encoding;
    }

    fmt.width = fmt.width.clamp(MIN_WIDTH, MAX_WIDTH);
    fmt.height = fmt.height.clamp(MIN_HEIGHT, MAX_HEIGHT);

    if fmt.field == FieldOrder::Any || fmt.field == FieldOrder::Alternate {
        fmt.field = FieldOrder::None;
    }

    fmt.colorimetry.clamp();

    fmt
}

/// Clamp a crop rectangle against the sink format it selects from.
///
/// The rectangle first grows to the minimum window size, then translates
/// and shrinks as needed to lie entirely inside the frame.
pub fn clamp_crop(mut r: Rect, bound_fmt: &ImageFormat) -> Rect {
    let bound = default_bound(bound_fmt);

    r.width = r.width.max(MIN_WIDTH);
    r.height = r.height.max(MIN_HEIGHT);

    // Map inside the frame: cap the size, then pull the origin back so the
    // far edges stay within bounds. The size cap guarantees the
    // subtractions cannot underflow.
    r.width = r.width.min(bound.width);
    r.height = r.height.min(bound.height);
    if r.left + r.width > bound.width {
        r.left = bound.width - r.width;
    }
    if r.top + r.height > bound.height {
        r.top = bound.height - r.height;
    }

    r
}
