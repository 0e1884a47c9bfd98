//! Renoise CLI - Benchmark the denoising pipeline on a synthetic sequence.
//!
//! Generates a procedural animated scene (a moving quad over background,
//! with hash-based noise in the beauty channel), so no image I/O is needed.

use std::env;
use std::time::Instant;

use renoise::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            _ => filtered_args.push(arg),
        }
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if filtered_args.is_empty() {
        print_usage(&args[0]);
        return;
    }

    match filtered_args[0] {
        "bench" | "b" => {
            let size = filtered_args.get(1).copied().unwrap_or("320x180");
            let frames: usize = filtered_args
                .get(2)
                .and_then(|s| s.parse().ok())
                .unwrap_or(8);
            match parse_size(size) {
                Some((w, h)) => cmd_bench(w, h, frames),
                None => {
                    eprintln!("Bad size '{size}', expected WIDTHxHEIGHT");
                    std::process::exit(1);
                }
            }
        }
        "config" | "c" => cmd_config(),
        "help" | "h" | "-h" | "--help" => print_usage(&args[0]),
        _ => {
            eprintln!("Unknown command: {}", filtered_args[0]);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    println!(
        "Renoise CLI - Temporal denoiser benchmark (built {} {})",
        env!("RENOISE_BUILD_DATE"),
        env!("RENOISE_BUILD_TIME")
    );
    println!();
    println!("Usage: {} [options] <command> [args]", prog);
    println!();
    println!("Commands:");
    println!("  b, bench [WxH] [frames]   Denoise a synthetic sequence (default 320x180, 8 frames)");
    println!("  c, config                 Print the default configuration as JSON");
    println!("  h, help                   Show this help");
    println!();
    println!("Options:");
    println!("  -v, --verbose  Debug output");
    println!("  -vv, --trace   Trace output (very verbose)");
    println!("  -q, --quiet    Suppress output");
}

fn parse_size(s: &str) -> Option<(usize, usize)> {
    let (w, h) = s.split_once('x')?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

fn cmd_config() {
    let config = DenoiserConfig::default();
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize config: {e}"),
    }
}

fn cmd_bench(width: usize, height: usize, frames: usize) {
    info!("Benchmarking {}x{} over {} frames", width, height, frames);

    let mut denoiser = match Denoiser::new(DenoiserConfig::default()) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to create denoiser: {e}");
            std::process::exit(1);
        }
    };

    let start = Instant::now();
    for index in 0..frames {
        let frame = synth_frame(width, height, index);
        let frame_start = Instant::now();
        let output = denoiser.process_frame(&frame);
        let elapsed = frame_start.elapsed();
        debug!(
            "frame {}: {:.1}ms, mean luminance {:.4}",
            index,
            elapsed.as_secs_f64() * 1000.0,
            mean_luminance(output)
        );
    }

    let total = start.elapsed().as_secs_f64();
    info!(
        "Done: {:.2}s total, {:.1}ms/frame",
        total,
        total * 1000.0 / frames.max(1) as f64
    );
}

/// Procedural frame: a quad two pixels wider each frame sliding right over
/// background, with deterministic hash noise on its color.
fn synth_frame(width: usize, height: usize, index: usize) -> FrameInfo {
    let quad_w = width / 3;
    let quad_h = height / 2;
    let offset = (index * 2) as f32;
    let quad_x0 = width as f32 / 6.0 + offset;
    let quad_y0 = height as f32 / 4.0;

    let covered = |x: usize, y: usize| {
        let (xf, yf) = (x as f32, y as f32);
        xf >= quad_x0 && xf < quad_x0 + quad_w as f32 && yf >= quad_y0 && yf < quad_y0 + quad_h as f32
    };

    let beauty = Buffer2D::from_fn(width, height, |x, y| {
        if covered(x, y) {
            let n = hash_noise(x as u32, y as u32, index as u32);
            Vec3::new(0.8, 0.4, 0.2) + Vec3::splat(n * 0.3 - 0.15)
        } else {
            Vec3::splat(0.05)
        }
    });
    let normal = Buffer2D::from_fn(width, height, |_, _| Vec3::Z);
    let depth = Buffer2D::from_fn(width, height, |x, y| if covered(x, y) { 1.0 } else { 0.0 });
    // Quad surface points expressed in screen coordinates; the object
    // transform carries the per-frame slide.
    let position = Buffer2D::from_fn(width, height, |x, y| Vec3::new(x as f32, y as f32, 1.0));
    let object_id = Buffer2D::from_fn(width, height, |x, y| {
        if covered(x, y) {
            0.0
        } else {
            BACKGROUND_ID
        }
    });

    let object_to_world = Mat4::from_translation(Vec3::new(offset, 0.0, 0.0));
    let matrices = vec![object_to_world, Mat4::IDENTITY, Mat4::IDENTITY];

    FrameInfo::new(beauty, normal, depth, position, object_id, matrices)
        .expect("synthetic frame is well formed")
}

/// Cheap integer hash mapped to [0, 1).
fn hash_noise(x: u32, y: u32, t: u32) -> f32 {
    let mut h = x.wrapping_mul(0x9e37_79b9) ^ y.wrapping_mul(0x85eb_ca6b) ^ t.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    (h >> 8) as f32 / (1u32 << 24) as f32
}

fn mean_luminance(buf: &Buffer2D<Vec3>) -> f32 {
    if buf.is_empty() {
        return 0.0;
    }
    let sum: f32 = buf
        .as_slice()
        .iter()
        .map(|c| c.dot(Vec3::new(0.299, 0.587, 0.114)))
        .sum();
    sum / buf.len() as f32
}
