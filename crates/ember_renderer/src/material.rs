//! Surface materials: the reflectance lobes and the emission they carry.
//!
//! Direction convention for every lobe: `wo` points from the shading point
//! toward the viewer, `wi` points toward the light (or the sampled
//! continuation direction). Both are unit vectors on the side of `n`
//! they describe.

use crate::gen_f32;
use crate::microfacet::MicrofacetGgx;
use ember_math::{sampling, to_world, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// Color type alias (linear RGB radiance or reflectance)
pub type Color = Vec3;

/// Emission magnitudes below this count as "not a light".
pub const EMISSION_EPSILON: f32 = 1e-5;

/// A reflectance lobe that can be importance sampled.
pub trait Bxdf: Send + Sync {
    /// Draw a light-side direction `wi` given the view direction `wo`.
    fn sample(&self, wo: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3;

    /// Solid-angle density with which `sample` produces `wi`.
    fn pdf(&self, wi: Vec3, wo: Vec3, n: Vec3) -> f32;

    /// BRDF value for the pair of directions.
    fn eval(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color;
}

/// Ideal diffuse reflector, sampled uniformly over the hemisphere.
#[derive(Debug, Clone)]
pub struct IdealDiffuse {
    albedo: Color,
}

impl IdealDiffuse {
    pub fn new(albedo: Color) -> Self {
        Self {
            albedo: albedo.clamp(Color::ZERO, Color::ONE),
        }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }
}

impl Bxdf for IdealDiffuse {
    fn sample(&self, _wo: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let local = sampling::uniform_hemisphere(gen_f32(rng), gen_f32(rng));
        to_world(local, n).normalize()
    }

    fn pdf(&self, wi: Vec3, _wo: Vec3, n: Vec3) -> f32 {
        if wi.dot(n) > 0.0 {
            0.5 / PI
        } else {
            0.0
        }
    }

    fn eval(&self, wi: Vec3, _wo: Vec3, n: Vec3) -> Color {
        if n.dot(wi) > 0.0 {
            self.albedo / PI
        } else {
            Color::ZERO
        }
    }
}

/// The reflectance model of a material, one implementation per kind.
#[derive(Debug, Clone)]
pub enum Surface {
    IdealDiffuse(IdealDiffuse),
    MicrofacetGgx(MicrofacetGgx),
}

impl Surface {
    fn bxdf(&self) -> &dyn Bxdf {
        match self {
            Surface::IdealDiffuse(lobe) => lobe,
            Surface::MicrofacetGgx(lobe) => lobe,
        }
    }
}

/// A surface material: a reflectance lobe plus emitted radiance.
///
/// Materials are immutable once built and shared across render workers
/// behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Material {
    surface: Surface,
    emission: Color,
    /// Reserved for a transmissive lobe; neither implemented lobe reads it.
    ior: f32,
}

impl Material {
    /// Ideal diffuse material with the given albedo.
    pub fn diffuse(albedo: Color) -> Self {
        Self::from_surface(Surface::IdealDiffuse(IdealDiffuse::new(albedo)))
    }

    /// GGX microfacet material.
    ///
    /// - `roughness`: GGX width, floored so it never reaches zero
    /// - `metallic`: 0 = dielectric (F0 = 0.04), 1 = conductor (F0 = albedo)
    pub fn microfacet(albedo: Color, roughness: f32, metallic: f32) -> Self {
        Self::from_surface(Surface::MicrofacetGgx(MicrofacetGgx::new(
            albedo, roughness, metallic,
        )))
    }

    fn from_surface(surface: Surface) -> Self {
        Self {
            surface,
            emission: Color::ZERO,
            ior: 1.0,
        }
    }

    /// Builder method to make the material emissive. Negative channels are dropped.
    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission.max(Color::ZERO);
        self
    }

    /// Builder method to set the index of refraction.
    pub fn with_ior(mut self, ior: f32) -> Self {
        self.ior = ior;
        self
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn emission(&self) -> Color {
        self.emission
    }

    pub fn ior(&self) -> f32 {
        self.ior
    }

    /// True if the material emits light.
    pub fn has_emission(&self) -> bool {
        self.emission.length() > EMISSION_EPSILON
    }
}

impl Bxdf for Material {
    fn sample(&self, wo: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.surface.bxdf().sample(wo, n, rng)
    }

    fn pdf(&self, wi: Vec3, wo: Vec3, n: Vec3) -> f32 {
        self.surface.bxdf().pdf(wi, wo, n)
    }

    fn eval(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        self.surface.bxdf().eval(wi, wo, n)
    }
}

/// Reflect a vector about a normal.
#[inline]
pub(crate) fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn directions() -> Vec<Vec3> {
        vec![
            Vec3::Y,
            Vec3::new(0.3, 0.9, 0.1).normalize(),
            Vec3::new(-0.7, 0.2, 0.5).normalize(),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.5, -0.1, 0.5).normalize(),
        ]
    }

    #[test]
    fn test_diffuse_pdf() {
        let mat = Material::diffuse(Color::splat(0.5));
        let n = Vec3::Y;

        for wi in directions() {
            let pdf = mat.pdf(wi, Vec3::Y, n);
            if wi.dot(n) > 0.0 {
                assert_eq!(pdf, 0.5 / PI);
            } else {
                assert_eq!(pdf, 0.0);
            }
        }
    }

    #[test]
    fn test_diffuse_eval_independent_of_wo() {
        let albedo = Color::new(0.63, 0.065, 0.05);
        let mat = Material::diffuse(albedo);
        let n = Vec3::Y;

        for wi in directions() {
            for wo in directions() {
                let f = mat.eval(wi, wo, n);
                if n.dot(wi) > 0.0 {
                    assert_eq!(f, albedo / PI);
                } else {
                    assert_eq!(f, Color::ZERO);
                }
            }
        }
    }

    #[test]
    fn test_diffuse_sample_stays_in_hemisphere() {
        let mat = Material::diffuse(Color::ONE);
        let n = Vec3::new(0.2, -0.4, 0.9).normalize();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1000 {
            let wi = mat.sample(n, n, &mut rng);
            assert!(wi.dot(n) >= 0.0);
            assert!((wi.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_diffuse_sampling_is_uniform() {
        // Uniform hemisphere sampling has E[cos] = 1/2 (cosine-weighted would give 2/3)
        let mat = Material::diffuse(Color::ONE);
        let n = Vec3::Z;
        let mut rng = StdRng::seed_from_u64(7);

        let count = 100_000;
        let mean_cos: f32 =
            (0..count).map(|_| mat.sample(n, n, &mut rng).dot(n)).sum::<f32>() / count as f32;
        assert!((mean_cos - 0.5).abs() < 0.01, "mean cos = {mean_cos}");
    }

    #[test]
    fn test_emission() {
        let plain = Material::diffuse(Color::ONE);
        assert!(!plain.has_emission());

        let light = Material::diffuse(Color::splat(0.65)).with_emission(Color::new(8.0, -1.0, 4.0));
        assert!(light.has_emission());
        assert_eq!(light.emission(), Color::new(8.0, 0.0, 4.0));
    }

    #[test]
    fn test_albedo_is_clamped() {
        let mat = IdealDiffuse::new(Color::new(1.5, 0.5, -0.2));
        assert_eq!(mat.albedo(), Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_ior_is_reserved_data() {
        let mat = Material::microfacet(Color::ONE, 0.5, 0.0).with_ior(1.5);
        assert_eq!(mat.ior(), 1.5);
        assert!(matches!(mat.surface(), Surface::MicrofacetGgx(_)));
    }

    #[test]
    fn test_reflect() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        assert_eq!(reflect(v, Vec3::Y), Vec3::new(1.0, 1.0, 0.0));
    }
}
