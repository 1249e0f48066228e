//! Warps from the unit square onto the domains the renderer samples.
//!
//! Every function takes its uniform variates explicitly so callers keep
//! ownership of their random state.

use crate::Vec3;
use std::f32::consts::PI;

/// Direction from spherical angles (theta from +Z, phi around Z).
#[inline]
pub fn spherical_to_cartesian(theta: f32, phi: f32) -> Vec3 {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec3::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}

/// Uniform direction on the upper (z >= 0) hemisphere.
///
/// Uses `z = |1 - 2 u1|`, which folds the full-sphere warp onto one side,
/// so the density is `1 / (2π)` with respect to solid angle.
pub fn uniform_hemisphere(u1: f32, u2: f32) -> Vec3 {
    let z = (1.0 - 2.0 * u1).abs();
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * u2;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Uniform direction on the unit sphere; density `1 / (4π)`.
pub fn uniform_sphere(u1: f32, u2: f32) -> Vec3 {
    let z = 1.0 - 2.0 * u1;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * u2;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Uniform barycentric coordinates `(b1, b2)` on a triangle.
pub fn uniform_triangle(u1: f32, u2: f32) -> (f32, f32) {
    let su = u1.sqrt();
    (1.0 - su, u2 * su)
}

/// GGX (Trowbridge-Reitz) microfacet normal in the local frame.
///
/// `alpha` is the GGX width; the polar angle follows
/// `cos²θ = (1 - u1) / ((α² - 1) u1 + 1)`.
pub fn ggx_microfacet_normal(alpha: f32, u1: f32, u2: f32) -> Vec3 {
    let a2 = alpha * alpha;
    let cos2_theta = ((1.0 - u1) / ((a2 - 1.0) * u1 + 1.0)).clamp(0.0, 1.0);
    let theta = cos2_theta.sqrt().acos();
    spherical_to_cartesian(theta, 2.0 * PI * u2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: [f32; 5] = [0.0, 0.1, 0.5, 0.9, 0.999];

    #[test]
    fn test_uniform_hemisphere_stays_above() {
        for &u1 in &GRID {
            for &u2 in &GRID {
                let d = uniform_hemisphere(u1, u2);
                assert!(d.z >= 0.0);
                assert!((d.length() - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_uniform_sphere_is_unit() {
        for &u1 in &GRID {
            for &u2 in &GRID {
                assert!((uniform_sphere(u1, u2).length() - 1.0).abs() < 1e-5);
            }
        }
        assert!(uniform_sphere(0.99, 0.3).z < 0.0);
    }

    #[test]
    fn test_uniform_triangle_inside() {
        for &u1 in &GRID {
            for &u2 in &GRID {
                let (b1, b2) = uniform_triangle(u1, u2);
                assert!(b1 >= 0.0 && b2 >= 0.0 && b1 + b2 <= 1.0 + 1e-6);
            }
        }
    }

    #[test]
    fn test_ggx_microfacet_normal() {
        // Near-zero roughness collapses onto the normal
        let m = ggx_microfacet_normal(1e-4, 0.7, 0.2);
        assert!(m.z > 0.9999);

        for &u1 in &GRID {
            let m = ggx_microfacet_normal(0.5, u1, 0.4);
            assert!(m.z >= 0.0);
            assert!((m.length() - 1.0).abs() < 1e-5);
        }
    }
}
