//! Math type re-exports and denoiser-specific numeric helpers.
//!
//! This module re-exports types from `glam` and provides the small set of
//! clamped numeric operations the filter passes rely on.

// Re-export glam types
pub use glam::{
    // Vectors
    Vec2, Vec3, Vec4,
    IVec2, UVec2,
    // Matrices
    Mat3, Mat4,
};

/// Arccosine with the argument clamped to [-1, 1].
///
/// Dot products of two unit normals can land slightly outside the valid
/// domain due to rounding; plain `acos` would return NaN there.
#[inline]
pub fn safe_acos(x: f32) -> f32 {
    x.clamp(-1.0, 1.0).acos()
}

/// Component-wise square root with negative inputs clamped to zero.
///
/// Variance computed as a difference of running sums can come out as a tiny
/// negative number.
#[inline]
pub fn safe_sqrt(v: Vec3) -> Vec3 {
    let v = v.max(Vec3::ZERO);
    Vec3::new(v.x.sqrt(), v.y.sqrt(), v.z.sqrt())
}

/// Linear blend `a * (1 - t) + b * t`.
///
/// Written in the two-product form so that `t = 1.0` returns `b` exactly;
/// temporal accumulation depends on that for the invalid-pixel bypass.
#[inline]
pub fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a * (1.0 - t) + b * t
}

/// Squared scalar, for the Gaussian weight exponents.
#[inline]
pub fn sqr(x: f32) -> f32 {
    x * x
}
