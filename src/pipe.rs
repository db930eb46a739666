//! Per-pipe pad negotiation state machine.
//!
//! A [`PixelPipe`] owns the negotiable state of one processing pipe: the
//! sink/source format pair, the crop and compose rectangles and the frame
//! intervals, each format/geometry item in an active (committed) and a
//! proposed (trial) copy. All operations run under one per-pipe mutex;
//! the two pipes are fully independent and never share state.
//!
//! # State machine
//!
//! The pipe is either **Idle** or **Streaming**. While streaming, the
//! active copies are immutable and mutation attempts return
//! [`Error::Busy`]; the proposed copies stay writable so clients can keep
//! validating configurations. Starting a stream runs the register
//! programmer exactly once for the transition; stopping only re-enables
//! mutation.
//!
//! # Transition side effects
//!
//! Some writes deliberately touch more than the addressed item:
//!
//! - Setting the **sink format** overwrites the source format of the same
//!   copy: the hardware's internal working format is fixed per sink class,
//!   so the source encoding is forced to a representative (Yuyv for
//!   luma/chroma sinks, Rgb565 otherwise). Set the source format
//!   afterwards to pick a different final encoding; that second write does
//!   not propagate back.
//! - Setting the **active sink format** resets crop and compose to the new
//!   full frame, since a size change invalidates any prior selection.
//! - Setting the **crop** also sets compose = crop (1:1), and either
//!   selection write resizes the same-copy source format to the compose
//!   size: the geometry pipeline's output size is always the compose size.

use std::sync::Mutex;

use crate::catalog;
use crate::error::{Error, Result};
use crate::format::{FrameInterval, ImageFormat, Pad, PixelEncoding, Rect, Size, Which};
use crate::framerate;
use crate::geometry;
use crate::program::{self, ColorConverter};
use crate::regs::{self, PipeId, PowerGate, RegisterBus};
use crate::scaler;

/// Selection rectangle addressed by [`PixelPipe::selection`] and
/// [`PixelPipe::set_selection`]. Selections live on the sink pad only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionTarget {
    /// The processed region of the sink image.
    Crop,
    /// Read-only: the rectangle crops may occupy (the full sink frame).
    CropBounds,
    /// Read-only: the default crop (the full sink frame).
    CropDefault,
    /// The size the cropped region is scaled to.
    Compose,
}

/// Negotiable frame-size bounds for a catalog encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRange {
    /// Smallest negotiable size.
    pub min: Size,
    /// Largest negotiable size.
    pub max: Size,
}

/// One copy (active or proposed) of the negotiable pad state.
#[derive(Debug, Clone, Copy)]
struct PadConfig {
    sink_fmt: ImageFormat,
    src_fmt: ImageFormat,
    crop: Rect,
    compose: Rect,
}

impl PadConfig {
    fn new() -> Self {
        let sink_fmt = ImageFormat::default_for(Pad::Sink);
        let full = Rect::from_size(sink_fmt.size());
        Self {
            sink_fmt,
            src_fmt: ImageFormat::default_for(Pad::Source),
            crop: full,
            compose: full,
        }
    }

    fn fmt(&self, pad: Pad) -> &ImageFormat {
        match pad {
            Pad::Sink => &self.sink_fmt,
            Pad::Source => &self.src_fmt,
        }
    }

    fn fmt_mut(&mut self, pad: Pad) -> &mut ImageFormat {
        match pad {
            Pad::Sink => &mut self.sink_fmt,
            Pad::Source => &mut self.src_fmt,
        }
    }
}

#[derive(Debug)]
struct PipeState {
    active: PadConfig,
    proposed: PadConfig,
    sink_interval: FrameInterval,
    src_interval: FrameInterval,
    frame_skip: u8,
    streaming: bool,
    gamma_correction: bool,
}

impl PipeState {
    fn config(&self, which: Which) -> &PadConfig {
        match which {
            Which::Active => &self.active,
            Which::Proposed => &self.proposed,
        }
    }

    fn config_mut(&mut self, which: Which) -> &mut PadConfig {
        match which {
            Which::Active => &mut self.active,
            Which::Proposed => &mut self.proposed,
        }
    }
}

/// The pad-negotiation state machine of one processing pipe.
pub struct PixelPipe {
    id: PipeId,
    state: Mutex<PipeState>,
}

impl PixelPipe {
    /// Create a pipe from its media-entity name.
    ///
    /// All state is re-derived from defaults; nothing persists across
    /// constructions. Fails fast with [`Error::Unsupported`] when the name
    /// identifies neither the main nor the auxiliary pipe.
    pub fn new(entity_name: &str) -> Result<Self> {
        let id = PipeId::from_entity_name(entity_name)?;
        Ok(Self {
            id,
            state: Mutex::new(PipeState {
                active: PadConfig::new(),
                proposed: PadConfig::new(),
                sink_interval: FrameInterval::DEFAULT,
                src_interval: FrameInterval::DEFAULT,
                frame_skip: 0,
                streaming: false,
                gamma_correction: false,
            }),
        })
    }

    /// The pipe's identity.
    pub fn id(&self) -> PipeId {
        self.id
    }

    /// Whether the pipe is currently streaming.
    pub fn is_streaming(&self) -> bool {
        self.state.lock().unwrap().streaming
    }

    // ========================================================================
    // Formats
    // ========================================================================

    /// Read the format of `pad` from the `which` copy.
    pub fn format(&self, pad: Pad, which: Which) -> ImageFormat {
        let st = self.state.lock().unwrap();
        *st.config(which).fmt(pad)
    }

    /// Negotiate the format of `pad` in the `which` copy.
    ///
    /// The format is clamped, never rejected; the applied format is
    /// returned. See the module docs for the sink-to-source propagation
    /// and the crop/compose reset on active sink writes.
    pub fn set_format(&self, pad: Pad, which: Which, fmt: ImageFormat) -> Result<ImageFormat> {
        let mut st = self.state.lock().unwrap();
        if which == Which::Active && st.streaming {
            return Err(Error::Busy);
        }

        let fmt = geometry::clamp_format(fmt, pad);
        let cfg = st.config_mut(which);

        if pad == Pad::Sink {
            let mut src = fmt;
            src.encoding = if fmt.encoding.is_yuv() {
                PixelEncoding::Yuyv
            } else {
                PixelEncoding::Rgb565
            };
            cfg.src_fmt = src;
            tracing::debug!(
                "{:?}: source format update: new: {}x{} ({:?})",
                self.id,
                src.width,
                src.height,
                src.encoding
            );
        }

        let old = *cfg.fmt(pad);
        *cfg.fmt_mut(pad) = fmt;
        tracing::debug!(
            "{:?}: {} format update: old: {}x{} ({:?}) new: {}x{} ({:?})",
            self.id,
            pad.as_str(),
            old.width,
            old.height,
            old.encoding,
            fmt.width,
            fmt.height,
            fmt.encoding
        );

        if pad == Pad::Sink && which == Which::Active {
            let full = Rect::from_size(fmt.size());
            cfg.crop = full;
            cfg.compose = full;
        }

        Ok(fmt)
    }

    // ========================================================================
    // Selections
    // ========================================================================

    /// Read a selection rectangle. Sink pad only.
    pub fn selection(&self, pad: Pad, which: Which, target: SelectionTarget) -> Result<Rect> {
        if pad == Pad::Source {
            return Err(Error::InvalidArgument("selections live on the sink pad"));
        }

        let st = self.state.lock().unwrap();
        let cfg = st.config(which);
        Ok(match target {
            SelectionTarget::Crop => cfg.crop,
            SelectionTarget::CropBounds | SelectionTarget::CropDefault => {
                geometry::default_bound(&cfg.sink_fmt)
            }
            SelectionTarget::Compose => cfg.compose,
        })
    }

    /// Negotiate a selection rectangle. Sink pad only; `CropBounds` and
    /// `CropDefault` are read-only.
    ///
    /// The rectangle is clamped, never rejected; the applied rectangle is
    /// returned. A crop write resets compose to the new crop; either write
    /// resizes the same-copy source format to the compose size.
    pub fn set_selection(
        &self,
        pad: Pad,
        which: Which,
        target: SelectionTarget,
        rect: Rect,
    ) -> Result<Rect> {
        if pad == Pad::Source {
            return Err(Error::InvalidArgument("selections live on the sink pad"));
        }

        let mut st = self.state.lock().unwrap();
        if which == Which::Active && st.streaming {
            return Err(Error::Busy);
        }
        let cfg = st.config_mut(which);

        let applied = match target {
            SelectionTarget::Crop => {
                let r = geometry::clamp_crop(rect, &cfg.sink_fmt);
                cfg.crop = r;
                cfg.compose = r;
                tracing::debug!("{:?}: crop update: {}", self.id, r);
                r
            }
            SelectionTarget::Compose => {
                let mut r = rect;
                let min_w = cfg.crop.width.div_ceil(scaler::MAX_DOWNSCALE_RATIO);
                let min_h = cfg.crop.height.div_ceil(scaler::MAX_DOWNSCALE_RATIO);
                if r.width > cfg.crop.width {
                    r.width = cfg.crop.width;
                } else if r.width < min_w {
                    r.width = min_w;
                }
                if r.height > cfg.crop.height {
                    r.height = cfg.crop.height;
                } else if r.height < min_h {
                    r.height = min_h;
                }
                r.top = 0;
                r.left = 0;
                cfg.compose = r;
                tracing::debug!("{:?}: compose update: {}", self.id, r);
                r
            }
            SelectionTarget::CropBounds | SelectionTarget::CropDefault => {
                return Err(Error::InvalidArgument("selection target is read-only"));
            }
        };

        // The pipeline's output size is the compose size.
        cfg.src_fmt.width = applied.width;
        cfg.src_fmt.height = applied.height;

        Ok(applied)
    }

    // ========================================================================
    // Frame intervals
    // ========================================================================

    /// Read the frame interval of `pad`. Intervals have no trial copy.
    pub fn frame_interval(&self, pad: Pad) -> FrameInterval {
        let st = self.state.lock().unwrap();
        match pad {
            Pad::Sink => st.sink_interval,
            Pad::Source => st.src_interval,
        }
    }

    /// Negotiate the frame interval of `pad`; returns the applied interval.
    ///
    /// An unset request falls back to the current sink interval. A sink
    /// write is authoritative: it resets frame skipping and propagates to
    /// the source (a stale skip ratio must not survive a sink-side rate
    /// change). A source write selects the nearest achievable skip code.
    pub fn set_frame_interval(&self, pad: Pad, interval: FrameInterval) -> Result<FrameInterval> {
        let mut st = self.state.lock().unwrap();
        if st.streaming {
            return Err(Error::Busy);
        }

        let interval = if interval.is_unset() {
            st.sink_interval
        } else {
            interval
        };

        match pad {
            Pad::Sink => {
                st.frame_skip = 0;
                st.sink_interval = interval;
                st.src_interval = interval;
                Ok(interval)
            }
            Pad::Source => {
                let (code, achieved) =
                    framerate::negotiate_source_interval(st.sink_interval, interval);
                st.frame_skip = code;
                st.src_interval = achieved;
                Ok(achieved)
            }
        }
    }

    // ========================================================================
    // Enumeration
    // ========================================================================

    /// Enumerate the encodings `pad` supports; `None` ends the enumeration.
    pub fn enumerate_encodings(&self, pad: Pad, index: usize) -> Option<PixelEncoding> {
        catalog::lookup_by_index(pad, index).map(|e| e.encoding)
    }

    /// Frame-size bounds for an encoding supported on `pad`.
    pub fn frame_size_range(&self, pad: Pad, encoding: PixelEncoding) -> Result<SizeRange> {
        if catalog::lookup_by_code(pad, encoding).is_none() {
            return Err(Error::InvalidArgument("encoding not in catalog"));
        }
        Ok(SizeRange {
            min: Size::new(geometry::MIN_WIDTH, geometry::MIN_HEIGHT),
            max: Size::new(geometry::MAX_WIDTH, geometry::MAX_HEIGHT),
        })
    }

    /// Enumerate the frame intervals reachable on `pad` at `size`.
    ///
    /// The sink pad has a single entry (its own interval); the source pad
    /// has one candidate per frame-skip ratio. `Ok(None)` ends the
    /// enumeration.
    pub fn enumerate_frame_intervals(
        &self,
        pad: Pad,
        index: usize,
        size: Size,
    ) -> Result<Option<FrameInterval>> {
        if size.width > geometry::MAX_WIDTH || size.height > geometry::MAX_HEIGHT {
            return Err(Error::InvalidArgument("frame size out of bounds"));
        }

        let st = self.state.lock().unwrap();
        Ok(match pad {
            Pad::Sink => (index == 0).then_some(st.sink_interval),
            Pad::Source => framerate::enumerate_source_intervals(st.sink_interval)
                .get(index)
                .copied(),
        })
    }

    // ========================================================================
    // Runtime controls
    // ========================================================================

    /// Last value written to the gamma-correction control.
    pub fn gamma_correction(&self) -> bool {
        self.state.lock().unwrap().gamma_correction
    }

    /// Set the gamma-correction control.
    ///
    /// The value is always cached. It reaches hardware immediately only
    /// while the device is powered; otherwise it is applied at the next
    /// stream start. Controls are not gated by the streaming lock.
    pub fn set_gamma_correction(
        &self,
        enable: bool,
        bus: &mut dyn RegisterBus,
        power: &dyn PowerGate,
    ) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        st.gamma_correction = enable;

        if power.is_powered() {
            bus.write(
                self.id,
                regs::gmcr(self.id),
                if enable { regs::GMCR_ENABLE } else { 0 },
            )?;
        }

        Ok(())
    }

    // ========================================================================
    // Streaming
    // ========================================================================

    /// Transition Idle -> Streaming.
    ///
    /// Programs the committed state through `bus` (consulting `converter`
    /// on the color-conversion pipe), then locks the active copies.
    /// Returns [`Error::Busy`] if already streaming; collaborator failures
    /// propagate verbatim and leave the pipe idle.
    pub fn start_streaming(
        &self,
        bus: &mut dyn RegisterBus,
        converter: &dyn ColorConverter,
    ) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        if st.streaming {
            return Err(Error::Busy);
        }

        let cfg = program::StreamConfig {
            pipe: self.id,
            frame_skip: st.frame_skip,
            crop: st.active.crop,
            compose: st.active.compose,
            sink_fmt: &st.active.sink_fmt,
            src_fmt: &st.active.src_fmt,
            gamma_correction: st.gamma_correction,
        };
        program::apply(&cfg, bus, converter)?;

        st.streaming = true;
        Ok(())
    }

    /// Transition Streaming -> Idle. Only re-enables mutation; the
    /// hardware keeps its configuration.
    pub fn stop_streaming(&self) {
        self.state.lock().unwrap().streaming = false;
    }
}
