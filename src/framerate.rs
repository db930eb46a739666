//! Output frame-rate negotiation.
//!
//! The hardware reduces the output rate by dropping input frames at fixed
//! ratios of 1, 2, 4 or 8, selected by a 2-bit frame-skip code. Requested
//! source intervals are rounded to the nearest achievable ratio at or
//! below the request.

use crate::format::FrameInterval;

/// Frame-skip ratios, indexed by the 2-bit skip code.
pub const FRAME_SKIP_RATES: [u32; 4] = [1, 2, 4, 8];

/// Negotiate a source frame interval against the authoritative sink
/// interval.
///
/// Returns the selected skip code and the interval the hardware will
/// actually produce (the sink interval stretched by the chosen ratio).
/// An unset request (zero numerator or denominator) falls back to the
/// sink interval, i.e. no skipping. The sink interval must itself be set;
/// an unset sink also yields no skipping.
pub fn negotiate_source_interval(
    sink: FrameInterval,
    requested: FrameInterval,
) -> (u8, FrameInterval) {
    let requested = if requested.is_unset() { sink } else { requested };
    if sink.is_unset() {
        return (0, sink);
    }

    // Requested-to-sink interval ratio, truncated to an integer.
    let ratio = (u64::from(sink.denominator) * u64::from(requested.numerator))
        / (u64::from(sink.numerator) * u64::from(requested.denominator));

    let code: u8 = if ratio >= 8 {
        3
    } else if ratio >= 4 {
        2
    } else if ratio >= 2 {
        1
    } else {
        0
    };

    (code, sink.scaled(FRAME_SKIP_RATES[code as usize]))
}

/// The four source intervals reachable from `sink`, one per skip code.
pub fn enumerate_source_intervals(sink: FrameInterval) -> [FrameInterval; 4] {
    FRAME_SKIP_RATES.map(|ratio| sink.scaled(ratio))
}
