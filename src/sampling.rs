use crate::{Float, Point2f, Vec2f, Vec3f};
use cgmath::prelude::*;
use std::f32;

pub fn concentric_sample_disk(u: Point2f) -> Point2f {
    // map sample from [0, 1] to [-1, 1]
    let u_offset = 2.0 * u - Vec2f::new(1.0, 1.0);
    if u_offset == Point2f::new(0.0, 0.0) {
        return Point2f::new(0.0, 0.0);
    }

    let (r, theta) = if u_offset.x.abs() > u_offset.y.abs() {
        (u_offset.x, f32::consts::FRAC_PI_4 * (u_offset.y / u_offset.x))
    } else {
        (u_offset.y, f32::consts::FRAC_PI_2 - f32::consts::FRAC_PI_4 * (u_offset.x / u_offset.y))
    };

    r * Point2f::new(theta.cos(), theta.sin())
}

/// Cosine-weighted hemisphere sample in the local frame where the normal is +z.
pub fn cosine_sample_hemisphere(u: Point2f) -> Vec3f {
    let d = concentric_sample_disk(u);
    let z = Float::sqrt(Float::max(0.0, 1.0 - d.x * d.x - d.y * d.y));
    Vec3f::new(d.x, d.y, z)
}

/// Returns two vectors completing an orthonormal basis with `v1`.
/// `v1` must be normalized.
pub fn coordinate_system(v1: Vec3f) -> (Vec3f, Vec3f) {
    let v2 = if v1.x.abs() > v1.y.abs() {
        Vec3f::new(-v1.z, 0.0, v1.x) / (v1.x * v1.x + v1.z * v1.z).sqrt()
    } else {
        Vec3f::new(0.0, v1.z, -v1.y) / (v1.y * v1.y + v1.z * v1.z).sqrt()
    };
    (v2, v1.cross(v2))
}

/// Cosine-weighted hemisphere sample around the world-space normal `n`,
/// returning the sampled direction and its solid-angle pdf.
pub fn sample_cos_hemisphere(n: Vec3f, u: Point2f) -> (Vec3f, Float) {
    let w = cosine_sample_hemisphere(u);
    let (s, t) = coordinate_system(n);
    let omega_in = s * w.x + t * w.y + n * w.z;
    (omega_in, w.z * f32::consts::FRAC_1_PI)
}

/// Pdf matching `sample_cos_hemisphere`. Zero for directions below the
/// hemisphere around `n`.
pub fn pdf_cos_hemisphere(n: Vec3f, omega_in: Vec3f) -> Float {
    let cos_theta = n.dot(omega_in);
    if cos_theta > 0.0 {
        cos_theta * f32::consts::FRAC_1_PI
    } else {
        0.0
    }
}
