//! Joint bilateral spatial filter.
//!
//! Denoises a single frame by averaging each pixel's beauty color over a
//! square neighborhood, weighted by similarity in the auxiliary channels:
//! pixel distance, color distance, normal angle, and the angle between the
//! center normal and the direction to the neighbor's world position (the
//! "plane" term, which keeps edges between surfaces at different depths
//! sharp).

use rayon::prelude::*;

use crate::buffer::Buffer2D;
use crate::denoise::DenoiserConfig;
use crate::frame::FrameInfo;
use crate::util::{safe_acos, sqr, Vec3};

/// Filter one frame, returning a new color buffer of identical dimensions.
///
/// Each output pixel is independent; rows are processed in parallel.
pub fn filter(config: &DenoiserConfig, frame: &FrameInfo) -> Buffer2D<Vec3> {
    let _span = tracing::info_span!("bilateral_filter").entered();
    let (width, height) = frame.dimensions();
    let radius = config.kernel_radius as i32;

    // Gaussian denominators, hoisted out of the pixel loop.
    let two_sigma_coord2 = 2.0 * sqr(config.sigma_coord);
    let two_sigma_color2 = 2.0 * sqr(config.sigma_color);
    let two_sigma_normal2 = 2.0 * sqr(config.sigma_normal);
    let two_sigma_plane2 = 2.0 * sqr(config.sigma_plane);

    let mut filtered = Buffer2D::new(width, height);
    filtered.par_rows_mut().enumerate().for_each(|(y, row)| {
        let y = y as i32;
        for (x, out) in row.iter_mut().enumerate() {
            let x = x as i32;
            let color_i = frame.beauty().get(x as usize, y as usize);
            let normal_i = frame.normal().get(x as usize, y as usize);
            let pos_i = frame.position().get(x as usize, y as usize);

            let mut sum_of_weights = 0.0f32;
            let mut sum_of_weighted = Vec3::ZERO;

            for ny in (y - radius)..=(y + radius) {
                for nx in (x - radius)..=(x + radius) {
                    if !frame.beauty().contains(nx, ny) {
                        continue;
                    }
                    let (jx, jy) = (nx as usize, ny as usize);
                    let color_j = frame.beauty().get(jx, jy);
                    let normal_j = frame.normal().get(jx, jy);
                    let pos_j = frame.position().get(jx, jy);

                    let d2_coord = sqr((nx - x) as f32) + sqr((ny - y) as f32);
                    let coord_term = -d2_coord / two_sigma_coord2;
                    let color_term =
                        -(color_j - color_i).length_squared() / two_sigma_color2;
                    let normal_term =
                        -sqr(safe_acos(normal_i.dot(normal_j))) / two_sigma_normal2;

                    // Coincident positions have no direction to measure
                    // against; their plane term is zero.
                    let offset = pos_j - pos_i;
                    let plane_term = if offset.length_squared() > 0.0 {
                        -sqr(normal_i.dot(offset.normalize())) / two_sigma_plane2
                    } else {
                        0.0
                    };

                    let weight =
                        (coord_term + color_term + normal_term + plane_term).exp();
                    sum_of_weighted += color_j * weight;
                    sum_of_weights += weight;
                }
            }

            // The center pixel always contributes weight 1, so a zero sum
            // cannot occur; guarded regardless.
            *out = if sum_of_weights == 0.0 {
                Vec3::ZERO
            } else {
                sum_of_weighted / sum_of_weights
            };
        }
    });
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::tests_support::uniform_frame;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_field_is_identity() {
        // Power-of-two components keep every weight multiply exact, so a
        // uniform input must come back bit-identical.
        let color = Vec3::new(0.5, 0.25, 1.0);
        let frame = uniform_frame(8, 8, color);
        let filtered = filter(&DenoiserConfig::default(), &frame);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(filtered.get(x, y), color);
            }
        }
    }

    #[test]
    fn test_output_dimensions_match_input() {
        let frame = uniform_frame(5, 3, Vec3::ONE);
        let filtered = filter(&DenoiserConfig::default(), &frame);
        assert_eq!(filtered.dimensions(), (5, 3));
    }

    #[test]
    fn test_smooths_isolated_outlier() {
        let mut config = DenoiserConfig::default();
        config.kernel_radius = 3;
        // Wide color bandwidth so the outlier does not reject its neighbors.
        config.sigma_color = 100.0;

        let base = uniform_frame(7, 7, Vec3::splat(0.5));
        let mut beauty = base.beauty().clone();
        beauty.set(3, 3, Vec3::splat(10.0));
        let frame = crate::frame::FrameInfo::new(
            beauty,
            base.normal().clone(),
            base.depth().clone(),
            base.position().clone(),
            base.object_id().clone(),
            vec![crate::util::Mat4::IDENTITY; 3],
        )
        .unwrap();

        let filtered = filter(&config, &frame);
        let center = filtered.get(3, 3);
        // The spike is averaged down toward its neighborhood.
        assert!(center.x < 5.0, "outlier not attenuated: {center:?}");
        assert!(center.x > 0.5);
    }

    #[test]
    fn test_weights_are_normalized() {
        // A field of equal colors but varying normals still averages to the
        // input color, since color is uniform.
        let color = Vec3::splat(0.25);
        let frame = uniform_frame(6, 6, color);
        let mut config = DenoiserConfig::default();
        config.kernel_radius = 2;
        let filtered = filter(&config, &frame);
        for y in 0..6 {
            for x in 0..6 {
                assert_relative_eq!(filtered.get(x, y).x, color.x, max_relative = 1e-6);
            }
        }
    }
}
