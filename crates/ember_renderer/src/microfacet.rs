//! GGX microfacet lobe (Cook-Torrance).
//!
//! Distribution: GGX/Trowbridge-Reitz with `α = roughness`.
//! Geometry: Smith joint masking built from Schlick-GGX with
//! `k = (roughness + 1)² / 8`.
//! Fresnel: Schlick, with F0 blended from 0.04 to albedo by `metallic`.
//! A Lambert term weighted by `Kd = (1 - F)(1 - metallic)` carries the
//! energy the specular lobe does not reflect.

use crate::gen_f32;
use crate::material::{reflect, Bxdf, Color};
use ember_math::{sampling, to_world, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// Smallest roughness a lobe will hold; keeps `D` and the pdf finite.
pub const MIN_ROUGHNESS: f32 = 1e-4;

/// Reflectance at normal incidence for dielectrics.
const DIELECTRIC_F0: f32 = 0.04;

/// Floor on the Cook-Torrance denominator.
const DENOM_FLOOR: f32 = 1e-4;

/// GGX microfacet material.
#[derive(Debug, Clone)]
pub struct MicrofacetGgx {
    albedo: Color,
    roughness: f32,
    metallic: f32,
}

impl MicrofacetGgx {
    pub fn new(albedo: Color, roughness: f32, metallic: f32) -> Self {
        Self {
            albedo: albedo.clamp(Color::ZERO, Color::ONE),
            roughness: roughness.clamp(MIN_ROUGHNESS, 1.0),
            metallic: metallic.clamp(0.0, 1.0),
        }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    pub fn metallic(&self) -> f32 {
        self.metallic
    }

    /// Fresnel reflectance at normal incidence.
    fn fresnel_0(&self) -> Color {
        Color::splat(DIELECTRIC_F0).lerp(self.albedo, self.metallic)
    }
}

impl Bxdf for MicrofacetGgx {
    fn sample(&self, wo: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let m_local = sampling::ggx_microfacet_normal(self.roughness, gen_f32(rng), gen_f32(rng));
        let m = to_world(m_local, n);
        // Mirror the view direction about the sampled microfacet
        reflect(-wo, m).normalize_or_zero()
    }

    fn pdf(&self, wi: Vec3, wo: Vec3, n: Vec3) -> f32 {
        let h = (wi + wo).normalize_or_zero();
        let n_dot_h = n.dot(h);
        let wo_dot_h = wo.dot(h);
        if n_dot_h <= 0.0 || wo_dot_h <= 0.0 {
            return 0.0;
        }
        ggx_d(n_dot_h, self.roughness) * n_dot_h / (4.0 * wo_dot_h)
    }

    fn eval(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        let n_dot_l = n.dot(wi);
        if n_dot_l <= 0.0 {
            return Color::ZERO;
        }
        let n_dot_v = n.dot(wo).max(0.0);

        let h = (wi + wo).normalize_or_zero();
        let d = ggx_d(n.dot(h).max(0.0), self.roughness);
        let k = (self.roughness + 1.0) * (self.roughness + 1.0) / 8.0;
        let g = smith_g(n_dot_v, n_dot_l, k);
        let f = schlick_fresnel3(self.fresnel_0(), n_dot_v);

        let kd = (Color::ONE - f) * (1.0 - self.metallic);
        let specular = d * g * f / (4.0 * n_dot_l * n_dot_v).max(DENOM_FLOOR);

        kd * self.albedo / PI + specular
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Schlick weight for Fresnel.
#[inline]
fn schlick_weight(cos_theta: f32) -> f32 {
    let x = (1.0 - cos_theta).clamp(0.0, 1.0);
    let x2 = x * x;
    x2 * x2 * x // (1 - cos_theta)^5
}

/// Schlick Fresnel approximation.
#[inline]
fn schlick_fresnel3(f0: Color, cos_theta: f32) -> Color {
    f0 + (Color::ONE - f0) * schlick_weight(cos_theta)
}

/// GGX/Trowbridge-Reitz distribution.
///
/// The denominator `cos²θ (α² - 1) + 1` is evaluated as `sin²θ + cos²θ α²`;
/// the textbook form cancels to zero in f32 once α² drops below epsilon.
#[inline]
fn ggx_d(n_dot_h: f32, alpha: f32) -> f32 {
    let a2 = alpha * alpha;
    let cos2 = n_dot_h * n_dot_h;
    let denom = (1.0 - cos2).max(0.0) + cos2 * a2;
    a2 / (PI * denom * denom)
}

/// Schlick-GGX masking for one direction.
#[inline]
fn schlick_g1(n_dot_x: f32, k: f32) -> f32 {
    n_dot_x / (n_dot_x * (1.0 - k) + k)
}

/// Smith joint masking-shadowing.
#[inline]
fn smith_g(n_dot_v: f32, n_dot_l: f32, k: f32) -> f32 {
    schlick_g1(n_dot_v, k) * schlick_g1(n_dot_l, k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn upper_directions() -> Vec<Vec3> {
        vec![
            Vec3::Y,
            Vec3::new(0.3, 0.9, 0.1).normalize(),
            Vec3::new(-0.7, 0.2, 0.5).normalize(),
            Vec3::new(0.99, 0.01, 0.0).normalize(),
            Vec3::new(-0.4, 0.6, -0.6).normalize(),
        ]
    }

    #[test]
    fn test_eval_and_pdf_finite_non_negative() {
        let n = Vec3::Y;
        for &roughness in &[MIN_ROUGHNESS, 0.001, 0.01, 0.1, 0.3, 0.8, 1.0] {
            for &metallic in &[0.0, 0.4, 1.0] {
                let lobe = MicrofacetGgx::new(Color::new(0.95, 0.64, 0.54), roughness, metallic);
                for wi in upper_directions() {
                    for wo in upper_directions() {
                        let f = lobe.eval(wi, wo, n);
                        let pdf = lobe.pdf(wi, wo, n);
                        assert!(f.is_finite(), "eval not finite: r={roughness} {wi} {wo}");
                        assert!(f.min_element() >= 0.0, "eval negative: r={roughness}");
                        assert!(pdf.is_finite(), "pdf not finite: r={roughness} {wi} {wo}");
                        assert!(pdf >= 0.0, "pdf negative: r={roughness}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_eval_zero_below_horizon() {
        let lobe = MicrofacetGgx::new(Color::ONE, 0.5, 0.5);
        let wi = Vec3::new(0.3, -0.5, 0.1).normalize();
        assert_eq!(lobe.eval(wi, Vec3::Y, Vec3::Y), Color::ZERO);
    }

    #[test]
    fn test_pdf_integrates_to_visible_mass() {
        // For wo = n the reflected density keeps exactly the microfacets with
        // θh < 45°, which is 80% of the GGX mass at α = 0.5.
        let lobe = MicrofacetGgx::new(Color::ONE, 0.5, 0.0);
        let n = Vec3::Y;
        let mut rng = StdRng::seed_from_u64(42);

        let count = 200_000;
        let mut sum = 0.0_f64;
        for _ in 0..count {
            let local = sampling::uniform_hemisphere(gen_f32(&mut rng), gen_f32(&mut rng));
            let wi = to_world(local, n);
            sum += (lobe.pdf(wi, n, n) * 2.0 * PI) as f64;
        }
        let integral = sum / count as f64;
        assert!((integral - 0.8).abs() < 0.02, "integral = {integral}");
    }

    #[test]
    fn test_smooth_sample_is_mirror_direction() {
        let lobe = MicrofacetGgx::new(Color::ONE, MIN_ROUGHNESS, 1.0);
        let n = Vec3::Y;
        let wo = Vec3::new(1.0, 1.0, 0.0).normalize();
        let mirror = Vec3::new(-1.0, 1.0, 0.0).normalize();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..100 {
            let wi = lobe.sample(wo, n, &mut rng);
            assert!((wi - mirror).length() < 0.05, "wi = {wi}");
            assert!(lobe.pdf(wi, wo, n) > 0.0);
        }
    }

    #[test]
    fn test_fresnel_0_blend() {
        let albedo = Color::new(1.0, 0.71, 0.29);
        let dielectric = MicrofacetGgx::new(albedo, 0.5, 0.0);
        let metal = MicrofacetGgx::new(albedo, 0.5, 1.0);

        assert_eq!(dielectric.fresnel_0(), Color::splat(0.04));
        assert!((metal.fresnel_0() - albedo).length() < 1e-6);
    }

    #[test]
    fn test_full_metal_has_no_diffuse_term() {
        // Perpendicular-ish pair far from the specular peak: only Kd term could remain
        let n = Vec3::Y;
        let wi = Vec3::new(0.9, 0.1, 0.0).normalize();
        let wo = Vec3::new(0.0, 0.1, 0.9).normalize();

        let metal = MicrofacetGgx::new(Color::ONE, 0.05, 1.0);
        let plastic = MicrofacetGgx::new(Color::ONE, 0.05, 0.0);

        assert!(metal.eval(wi, wo, n).max_element() < plastic.eval(wi, wo, n).max_element());
    }

    #[test]
    fn test_roughness_floor() {
        let lobe = MicrofacetGgx::new(Color::ONE, 0.0, 2.0);
        assert_eq!(lobe.roughness(), MIN_ROUGHNESS);
        assert_eq!(lobe.metallic(), 1.0);
    }

    #[test]
    fn test_schlick_weight() {
        assert!((schlick_weight(1.0) - 0.0).abs() < 0.001);
        assert!((schlick_weight(0.0) - 1.0).abs() < 0.001);
        assert!((schlick_weight(-0.5) - 1.0).abs() < 0.001);
    }
}
