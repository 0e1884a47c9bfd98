//! The denoising pipeline: spatial filter, reprojection, temporal accumulation.
//!
//! [`Denoiser`] sequences the three passes across a frame stream:
//!
//! ```text
//! FrameInfo → bilateral filter ─┬─ (cold) → init history
//!                               └─ (warm) → reproject → accumulate
//! ```
//!
//! Every warm-frame pass writes into a scratch buffer and swaps it into the
//! accumulated color afterwards, so a pass never reads a pixel another worker
//! has already overwritten.

pub mod bilateral;
mod reproject;
mod temporal;

use serde::{Deserialize, Serialize};

use crate::buffer::Buffer2D;
use crate::frame::FrameInfo;
use crate::util::{Error, Result, Vec3};

/// Filter bandwidths and blend factors, fixed at construction.
///
/// Defaults follow the reference renderer: a 33×33 spatial kernel with wide
/// coordinate falloff, and a 0.2 temporal blend.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DenoiserConfig {
    /// Spatial filter radius in pixels (kernel is `2r + 1` square).
    pub kernel_radius: usize,
    /// Bandwidth of the pixel-distance weight.
    pub sigma_coord: f32,
    /// Bandwidth of the color-distance weight.
    pub sigma_color: f32,
    /// Bandwidth of the normal-angle weight.
    pub sigma_normal: f32,
    /// Bandwidth of the plane-distance weight.
    pub sigma_plane: f32,
    /// Outlier clamp width in standard deviations.
    pub color_box_k: f32,
    /// Temporal blend factor in `(0, 1]`; 1 keeps no history.
    pub alpha: f32,
}

impl Default for DenoiserConfig {
    fn default() -> Self {
        Self {
            kernel_radius: 16,
            sigma_coord: 32.0,
            sigma_color: 0.6,
            sigma_normal: 0.1,
            sigma_plane: 0.1,
            color_box_k: 1.0,
            alpha: 0.2,
        }
    }
}

impl DenoiserConfig {
    /// Check that every parameter is inside its allowed range.
    pub fn validate(&self) -> Result<()> {
        if self.kernel_radius == 0 {
            return Err(Error::config("kernel_radius must be at least 1"));
        }
        for (name, sigma) in [
            ("sigma_coord", self.sigma_coord),
            ("sigma_color", self.sigma_color),
            ("sigma_normal", self.sigma_normal),
            ("sigma_plane", self.sigma_plane),
        ] {
            if !(sigma > 0.0) {
                return Err(Error::config(format!("{name} must be positive, got {sigma}")));
            }
        }
        if !(self.color_box_k > 0.0) {
            return Err(Error::config(format!(
                "color_box_k must be positive, got {}",
                self.color_box_k
            )));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::config(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

/// History state: `Cold` until the first frame has been processed, then
/// `Warm` with the retained previous snapshot.
#[derive(Clone, Debug)]
enum State {
    Cold,
    Warm { prev: FrameInfo },
}

/// Sequences the denoising passes across a stream of frames.
///
/// Persistent state is three buffers at the resolution of the first frame
/// (accumulated color, scratch, validity) plus an owned clone of the previous
/// frame's snapshot. Feeding a frame at a different resolution is a
/// precondition violation; reinitialize the denoiser on resolution change.
#[derive(Clone, Debug)]
pub struct Denoiser {
    config: DenoiserConfig,
    state: State,
    acc_color: Buffer2D<Vec3>,
    misc: Buffer2D<Vec3>,
    valid: Buffer2D<bool>,
}

impl Denoiser {
    /// Create a denoiser with a validated configuration.
    pub fn new(config: DenoiserConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: State::Cold,
            acc_color: Buffer2D::new(0, 0),
            misc: Buffer2D::new(0, 0),
            valid: Buffer2D::new(0, 0),
        })
    }

    /// The active configuration.
    #[inline]
    pub fn config(&self) -> &DenoiserConfig {
        &self.config
    }

    /// Whether history has been established (at least one frame processed).
    #[inline]
    pub fn is_warm(&self) -> bool {
        matches!(self.state, State::Warm { .. })
    }

    /// Current accumulated color; empty before the first frame.
    #[inline]
    pub fn output(&self) -> &Buffer2D<Vec3> {
        &self.acc_color
    }

    /// Per-pixel reprojection validity of the most recent warm frame.
    #[inline]
    pub fn validity(&self) -> &Buffer2D<bool> {
        &self.valid
    }

    /// Run the full pipeline on one frame and return the updated accumulated
    /// color, valid until the next call.
    pub fn process_frame(&mut self, frame: &FrameInfo) -> &Buffer2D<Vec3> {
        let _span = tracing::info_span!("process_frame").entered();
        let filtered = bilateral::filter(&self.config, frame);
        self.advance(frame, filtered)
    }

    /// Spatial filtering only: no history is kept or consumed.
    pub fn process_frame_filter_only(&mut self, frame: &FrameInfo) -> &Buffer2D<Vec3> {
        let _span = tracing::info_span!("process_frame_filter_only").entered();
        self.acc_color = bilateral::filter(&self.config, frame);
        &self.acc_color
    }

    /// Reprojection and accumulation only: the raw beauty image stands in
    /// for the filtered input.
    pub fn process_frame_reproject_only(&mut self, frame: &FrameInfo) -> &Buffer2D<Vec3> {
        let _span = tracing::info_span!("process_frame_reproject_only").entered();
        let filtered = frame.beauty().clone();
        self.advance(frame, filtered)
    }

    /// Shared tail of the frame entry points: temporal stages (or cold-start
    /// initialization), then history maintenance.
    fn advance(&mut self, frame: &FrameInfo, filtered: Buffer2D<Vec3>) -> &Buffer2D<Vec3> {
        match &self.state {
            State::Warm { prev } => {
                assert_eq!(
                    frame.dimensions(),
                    self.acc_color.dimensions(),
                    "frame resolution changed mid-stream; reinitialize the denoiser"
                );
                reproject::reproject(frame, prev, &self.acc_color, &mut self.misc, &mut self.valid);
                self.acc_color.swap(&mut self.misc);
                temporal::accumulate(
                    &self.config,
                    &filtered,
                    &self.acc_color,
                    &self.valid,
                    &mut self.misc,
                );
                self.acc_color.swap(&mut self.misc);
            }
            State::Cold => {
                tracing::debug!(
                    width = frame.width(),
                    height = frame.height(),
                    "first frame, initializing history"
                );
                let (width, height) = filtered.dimensions();
                self.acc_color = filtered;
                self.misc = Buffer2D::new(width, height);
                self.valid = Buffer2D::new(width, height);
            }
        }
        self.state = State::Warm {
            prev: frame.clone(),
        };
        &self.acc_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::tests_support::uniform_frame;

    #[test]
    fn test_config_defaults_validate() {
        assert!(DenoiserConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_bad_alpha() {
        let mut config = DenoiserConfig::default();
        config.alpha = 0.0;
        assert!(config.validate().is_err());
        config.alpha = 1.5;
        assert!(config.validate().is_err());
        config.alpha = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_bad_sigma() {
        let mut config = DenoiserConfig::default();
        config.sigma_normal = 0.0;
        assert!(config.validate().is_err());
        config.sigma_normal = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = DenoiserConfig::default();
        config.kernel_radius = 0;
        assert!(Denoiser::new(config).is_err());
    }

    #[test]
    fn test_cold_to_warm_transition() {
        let mut denoiser = Denoiser::new(DenoiserConfig::default()).unwrap();
        assert!(!denoiser.is_warm());

        let frame = uniform_frame(2, 2, crate::util::Vec3::splat(0.5));
        denoiser.process_frame(&frame);
        assert!(denoiser.is_warm());
        assert_eq!(denoiser.output().dimensions(), (2, 2));
    }

    #[test]
    fn test_filter_only_keeps_no_history() {
        let mut denoiser = Denoiser::new(DenoiserConfig::default()).unwrap();
        let frame = uniform_frame(2, 2, crate::util::Vec3::splat(0.5));
        denoiser.process_frame_filter_only(&frame);
        assert!(!denoiser.is_warm());
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = DenoiserConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: DenoiserConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kernel_radius, config.kernel_radius);
        assert_eq!(back.alpha, config.alpha);
    }
}
