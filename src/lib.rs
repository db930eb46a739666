//! # pixproc
//!
//! Configuration and negotiation core for a dual-pipe camera
//! pixel-processing stage.
//!
//! The stage sits between a sensor-facing input and a memory/encoder-facing
//! output. For each of its two independent pipes (Main, Auxiliary) this
//! crate negotiates the sink/source format pair, the crop and compose
//! windows and the output frame rate, plans the hardware's two-stage
//! downscale, and emits the ordered register program when streaming
//! starts. Pixel data never flows through here; hardware access is
//! abstracted behind the [`regs::RegisterBus`] and
//! [`program::ColorConverter`] seams.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pixproc::prelude::*;
//!
//! let pipe = PixelPipe::new("pixproc-main")?;
//!
//! // Negotiate: the sink format drives the source side.
//! let sink = ImageFormat {
//!     width: 1920,
//!     height: 1080,
//!     ..ImageFormat::default_for(Pad::Sink)
//! };
//! pipe.set_format(Pad::Sink, Which::Active, sink)?;
//! pipe.set_selection(Pad::Sink, Which::Active, SelectionTarget::Compose,
//!                    Rect::new(0, 0, 960, 540))?;
//!
//! // Program the hardware through your bus implementation.
//! pipe.start_streaming(&mut bus, &converter)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod error;
pub mod format;
pub mod framerate;
pub mod geometry;
pub mod pipe;
pub mod program;
pub mod regs;
pub mod scaler;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::format::{
        FrameInterval, ImageFormat, Pad, PixelEncoding, Rect, Size, Which,
    };
    pub use crate::pipe::{PixelPipe, SelectionTarget};
    pub use crate::program::{ColorConvConfig, ColorConverter};
    pub use crate::regs::{PipeId, PowerGate, RegisterBus};
}

pub use error::{Error, Result};
