//! Temporal accumulation with outlier clamping.
//!
//! Blends the reprojected history with the freshly filtered frame using an
//! exponential moving average. Before blending, history is clamped to a box
//! around the local mean of the reprojected color, which suppresses stale
//! values after lighting changes or reprojection error. Pixels the
//! reprojector marked invalid take the filtered color at full weight.

use rayon::prelude::*;

use crate::buffer::Buffer2D;
use crate::denoise::DenoiserConfig;
use crate::util::{lerp, safe_sqrt, Vec3};

/// Radius of the neighborhood used for the outlier clamp statistics.
pub(crate) const TEMPORAL_RADIUS: i32 = 3;

/// Mean and standard deviation of `buf` over the square neighborhood of
/// `radius` around `(x, y)`, counting in-bounds pixels only.
fn neighborhood_stats(buf: &Buffer2D<Vec3>, x: i32, y: i32, radius: i32) -> (Vec3, Vec3) {
    let mut sum = Vec3::ZERO;
    let mut count = 0.0f32;
    for ny in (y - radius)..=(y + radius) {
        for nx in (x - radius)..=(x + radius) {
            if buf.contains(nx, ny) {
                sum += buf.get(nx as usize, ny as usize);
                count += 1.0;
            }
        }
    }
    // The center pixel is always in bounds, so count >= 1.
    let mean = sum / count;

    let mut variance = Vec3::ZERO;
    for ny in (y - radius)..=(y + radius) {
        for nx in (x - radius)..=(x + radius) {
            if buf.contains(nx, ny) {
                let d = buf.get(nx as usize, ny as usize) - mean;
                variance += d * d;
            }
        }
    }
    (mean, safe_sqrt(variance / count))
}

/// Blend `filtered` into the reprojected history, writing the result into
/// `misc`.
///
/// `acc_color` holds the reprojected history (post-swap from the reprojection
/// pass) and is only read; the caller swaps `misc` into it afterwards.
pub(crate) fn accumulate(
    config: &DenoiserConfig,
    filtered: &Buffer2D<Vec3>,
    acc_color: &Buffer2D<Vec3>,
    valid: &Buffer2D<bool>,
    misc: &mut Buffer2D<Vec3>,
) {
    let _span = tracing::info_span!("temporal_accumulate").entered();
    let k = config.color_box_k;

    misc.par_rows_mut().enumerate().for_each(|(y, row)| {
        for (x, out) in row.iter_mut().enumerate() {
            let history = acc_color.get(x, y);
            let (mean, sd) =
                neighborhood_stats(acc_color, x as i32, y as i32, TEMPORAL_RADIUS);
            let clamped = history.clamp(mean - sd * k, mean + sd * k);

            let alpha = if valid.get(x, y) { config.alpha } else { 1.0 };
            *out = lerp(clamped, filtered.get(x, y), alpha);
        }
    });
}
