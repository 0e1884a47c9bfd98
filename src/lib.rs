//! # Renoise
//!
//! Temporal denoiser for path-traced frame sequences.
//!
//! Consumes one noisy frame at a time (beauty color plus auxiliary
//! geometric channels: normal, depth, world position, object id, and the
//! frame's transform table) and produces a spatially and temporally
//! filtered color buffer. Three passes per frame:
//!
//! 1. A joint bilateral filter denoises the frame using auxiliary-buffer
//!    similarity.
//! 2. Reprojection maps each pixel back to its previous-frame location via
//!    the object transforms and fetches the accumulated history there.
//! 3. Temporal accumulation clamps the history against its local
//!    neighborhood and blends it with the filtered frame.
//!
//! ## Modules
//!
//! - [`util`] - Errors, math re-exports and numeric helpers
//! - [`buffer`] - Dense 2D pixel buffers
//! - [`frame`] - Per-frame snapshots of renderer output
//! - [`denoise`] - The three passes and the frame-sequencing state machine
//!
//! ## Example
//!
//! ```ignore
//! use renoise::prelude::*;
//!
//! let mut denoiser = Denoiser::new(DenoiserConfig::default())?;
//! for frame in frames {
//!     let output = denoiser.process_frame(&frame);
//!     display(output);
//! }
//! ```
//!
//! Image I/O and scene representation are the caller's concern; the crate
//! only consumes assembled [`frame::FrameInfo`] snapshots.

pub mod buffer;
pub mod denoise;
pub mod frame;
pub mod util;

// Re-export commonly used types
pub use buffer::Buffer2D;
pub use denoise::{Denoiser, DenoiserConfig};
pub use frame::{FrameInfo, BACKGROUND_ID};
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::buffer::Buffer2D;
    pub use crate::denoise::{Denoiser, DenoiserConfig};
    pub use crate::frame::{FrameInfo, BACKGROUND_ID};
    pub use crate::util::{Error, Result, Mat4, Vec3};
}
