//! Utility types and functions for the denoiser.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam plus numeric helpers used by the passes

mod error;
mod math;

pub use error::*;
pub use math::*;
