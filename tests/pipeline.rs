//! End-to-end tests of the denoising pipeline against its observable
//! properties: determinism, cold-start behavior, temporal convergence and
//! the disocclusion bypass.

use renoise::denoise::bilateral;
use renoise::prelude::*;

/// Single-object frame: uniform beauty color, +Z normals, world positions
/// equal to pixel coordinates on the z = 1 plane, identity transforms.
/// Every pixel reprojects onto itself under an identity screen matrix.
fn uniform_frame(width: usize, height: usize, color: Vec3, id: f32, objects: usize) -> FrameInfo {
    let mut matrices = vec![Mat4::IDENTITY; objects];
    matrices.push(Mat4::IDENTITY); // world-to-camera
    matrices.push(Mat4::IDENTITY); // world-to-screen
    FrameInfo::new(
        Buffer2D::from_fn(width, height, |_, _| color),
        Buffer2D::from_fn(width, height, |_, _| Vec3::Z),
        Buffer2D::from_fn(width, height, |_, _| 1.0),
        Buffer2D::from_fn(width, height, |x, y| Vec3::new(x as f32, y as f32, 1.0)),
        Buffer2D::from_fn(width, height, |_, _| id),
        matrices,
    )
    .expect("well-formed test frame")
}

fn small_config() -> DenoiserConfig {
    DenoiserConfig {
        kernel_radius: 4,
        ..Default::default()
    }
}

#[test]
fn determinism_across_runs() {
    let frames: Vec<FrameInfo> = (0..3)
        .map(|i| uniform_frame(16, 12, Vec3::new(0.3 + 0.1 * i as f32, 0.6, 0.9), 0.0, 1))
        .collect();

    let mut a = Denoiser::new(small_config()).unwrap();
    let mut b = Denoiser::new(small_config()).unwrap();
    for frame in &frames {
        a.process_frame(frame);
        b.process_frame(frame);
    }
    assert_eq!(a.output().as_bytes(), b.output().as_bytes());
}

#[test]
fn cold_start_equals_bilateral_filter() {
    let config = small_config();
    let frame = uniform_frame(10, 8, Vec3::new(0.7, 0.2, 0.4), 0.0, 1);

    let mut denoiser = Denoiser::new(config).unwrap();
    let output = denoiser.process_frame(&frame).clone();
    let filtered = bilateral::filter(&config, &frame);
    assert_eq!(output.as_bytes(), filtered.as_bytes());
}

#[test]
fn static_scene_converges_geometrically() {
    // Cold frame at color 1, then static frames at color 0. With alpha 0.5
    // and power-of-two values every blend is exact, so the accumulated
    // color must be exactly (1 - alpha)^k after k warm frames.
    let config = DenoiserConfig {
        kernel_radius: 4,
        alpha: 0.5,
        ..Default::default()
    };
    let mut denoiser = Denoiser::new(config).unwrap();

    denoiser.process_frame(&uniform_frame(8, 8, Vec3::ONE, 0.0, 1));
    let dark = uniform_frame(8, 8, Vec3::ZERO, 0.0, 1);
    for k in 1..=6 {
        let output = denoiser.process_frame(&dark);
        let expected = Vec3::splat(0.5f32.powi(k));
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(output.get(x, y), expected, "frame {k} pixel ({x},{y})");
            }
        }
        assert!(denoiser.validity().as_slice().iter().all(|&v| v));
    }
}

#[test]
fn invalid_pixels_bypass_history() {
    // The previous frame saw object 1 everywhere, the current frame object
    // 0: every reprojection lands on the wrong id, so the output must equal
    // the current filtered color exactly.
    let config = small_config();
    let mut denoiser = Denoiser::new(config).unwrap();
    denoiser.process_frame(&uniform_frame(8, 6, Vec3::ONE, 1.0, 2));

    let frame = uniform_frame(8, 6, Vec3::new(0.1, 0.5, 0.9), 0.0, 2);
    let output = denoiser.process_frame(&frame).clone();
    assert!(denoiser.validity().as_slice().iter().all(|&v| !v));

    let filtered = bilateral::filter(&config, &frame);
    assert_eq!(output.as_bytes(), filtered.as_bytes());
}

#[test]
fn background_never_reads_history() {
    let config = small_config();
    let mut denoiser = Denoiser::new(config).unwrap();
    let frame = uniform_frame(6, 6, Vec3::splat(0.5), BACKGROUND_ID, 1);
    denoiser.process_frame(&frame);
    let output = denoiser.process_frame(&frame).clone();

    assert!(denoiser.validity().as_slice().iter().all(|&v| !v));
    let filtered = bilateral::filter(&config, &frame);
    assert_eq!(output.as_bytes(), filtered.as_bytes());
}

#[test]
fn static_2x2_scene_stays_at_its_color() {
    // Smallest end-to-end scenario: 2x2, object 0 everywhere, identity
    // transforms, uniform color across two frames.
    let color = Vec3::splat(0.5);
    let config = DenoiserConfig {
        kernel_radius: 4,
        alpha: 0.5,
        ..Default::default()
    };
    let mut denoiser = Denoiser::new(config).unwrap();

    let frame = uniform_frame(2, 2, color, 0.0, 1);
    denoiser.process_frame(&frame);
    let output = denoiser.process_frame(&frame);

    for y in 0..2 {
        for x in 0..2 {
            assert_eq!(output.get(x, y), color);
        }
    }
    assert!(denoiser.validity().as_slice().iter().all(|&v| v));
}

#[test]
fn reproject_only_mode_accumulates_raw_beauty() {
    // With uniform frames the raw beauty buffer is its own filtered image,
    // so reproject-only accumulation follows the same geometric decay.
    let config = DenoiserConfig {
        alpha: 0.5,
        ..Default::default()
    };
    let mut denoiser = Denoiser::new(config).unwrap();

    denoiser.process_frame_reproject_only(&uniform_frame(4, 4, Vec3::ONE, 0.0, 1));
    let dark = uniform_frame(4, 4, Vec3::ZERO, 0.0, 1);
    let output = denoiser.process_frame_reproject_only(&dark).clone();
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(output.get(x, y), Vec3::splat(0.5));
        }
    }
}

#[test]
fn filter_only_mode_has_no_temporal_state() {
    let config = small_config();
    let mut denoiser = Denoiser::new(config).unwrap();

    let bright = uniform_frame(6, 6, Vec3::ONE, 0.0, 1);
    let dark = uniform_frame(6, 6, Vec3::ZERO, 0.0, 1);
    denoiser.process_frame_filter_only(&bright);
    let output = denoiser.process_frame_filter_only(&dark).clone();

    // No blend with the bright frame happened.
    let filtered = bilateral::filter(&config, &dark);
    assert_eq!(output.as_bytes(), filtered.as_bytes());
}
