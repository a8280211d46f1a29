//! First-order spherical harmonics for the light volumes.
//!
//! Radiance in a cell is stored as 4 SH coefficients per color channel in
//! the component order `(dc, -y, z, -x)`. The constants and component order
//! here must match `lpv_sample.wgsl` exactly or GPU decode drifts from the
//! CPU simulation.

use glam::{Vec3, Vec4};

/// Band-0 SH basis scale, 1 / (2 * sqrt(pi)).
pub const SH_C0: f32 = 0.282_094_79;
/// Band-1 SH basis scale, sqrt(3) / (2 * sqrt(pi)).
pub const SH_C1: f32 = 0.488_602_51;
/// Band-0 scale of the clamped cosine lobe, sqrt(pi) / 2.
pub const COS_C0: f32 = 0.886_226_93;
/// Band-1 scale of the clamped cosine lobe, sqrt(pi / 3).
pub const COS_C1: f32 = 1.023_326_7;

/// SH basis evaluated in `dir`. `dir` must be normalized.
#[inline]
pub fn basis(dir: Vec3) -> Vec4 {
    Vec4::new(SH_C0, -SH_C1 * dir.y, SH_C1 * dir.z, -SH_C1 * dir.x)
}

/// Coefficients of a cosine lobe clamped to the hemisphere around `dir`,
/// carrying one unit of flux. Scale by the actual flux to project a
/// virtual point light into a cell.
#[inline]
pub fn clamped_cosine_lobe(dir: Vec3) -> Vec4 {
    Vec4::new(COS_C0, -COS_C1 * dir.y, COS_C1 * dir.z, -COS_C1 * dir.x)
}

/// Radiance of the stored distribution toward `dir`. Signed; consumers
/// clamp at zero where negative lobes are meaningless.
#[inline]
pub fn evaluate(coeffs: Vec4, dir: Vec3) -> f32 {
    coeffs.dot(basis(dir))
}
