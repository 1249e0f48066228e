//! Unidirectional path tracing with next-event estimation.
//!
//! Every vertex of the walk combines one light sample (direct term) with one
//! material sample that continues the walk (indirect term). Walks end on a
//! miss, on an emitter, by Russian roulette, or at the optional depth cap.

use crate::hittable::Intersection;
use crate::material::Bxdf;
use crate::scene::Scene;
use crate::{gen_f32, Color};
use ember_math::{Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Where radiance is clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadianceClamp {
    /// Clamp each vertex's result before it is handed to the previous vertex.
    PerBounce,
    /// Clamp only the value returned for the whole path.
    #[default]
    Final,
}

/// Radiance returned when a walk lands on an emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitterHit {
    /// Constant `(1, 1, 1)` regardless of the emitter.
    White,
    /// The emitter's own radiance.
    #[default]
    Emission,
}

/// Tunables of the radiance estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    /// Probability of continuing the walk at each vertex
    pub russian_roulette: f32,
    /// Floor applied to every pdf and squared distance used as a divisor
    pub pdf_floor: f32,
    /// Hard cap on path vertices; `None` leaves termination to Russian roulette
    pub max_depth: Option<u32>,
    /// Max distance between a shadow probe's hit and the sampled light point
    pub visibility_tolerance: f32,
    pub clamp: RadianceClamp,
    pub emitter_hit: EmitterHit,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            russian_roulette: 0.8,
            pdf_floor: 1e-4,
            max_depth: Some(64),
            visibility_tolerance: 0.01,
            clamp: RadianceClamp::Final,
            emitter_hit: EmitterHit::Emission,
        }
    }
}

/// Per-vertex record of the walk: `L = direct + weight * L_next`.
#[derive(Debug, Clone, Copy)]
struct PathVertex {
    direct: Color,
    weight: Color,
}

/// Vertex storage reused across the walks of one worker.
#[derive(Debug, Default)]
pub struct PathScratch {
    vertices: Vec<PathVertex>,
}

/// Monte Carlo radiance estimator.
#[derive(Debug, Clone, Default)]
pub struct PathIntegrator {
    config: IntegratorConfig,
}

impl PathIntegrator {
    pub fn new(config: IntegratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    /// Estimate the radiance arriving along `ray`.
    ///
    /// `depth` is the bounce index the walk starts at (0 for camera rays).
    /// The result is componentwise within `[0, 1]`; a ray that hits nothing
    /// returns exactly zero.
    pub fn estimate(&self, scene: &Scene, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        self.estimate_with(scene, ray, depth, &mut PathScratch::default(), rng)
    }

    /// [`estimate`](Self::estimate) with caller-owned vertex storage.
    pub fn estimate_with(
        &self,
        scene: &Scene,
        ray: &Ray,
        depth: u32,
        scratch: &mut PathScratch,
        rng: &mut dyn RngCore,
    ) -> Color {
        let cfg = &self.config;
        let vertices = &mut scratch.vertices;
        vertices.clear();
        let mut ray = *ray;
        let mut bounce = depth;

        // Radiance arriving at the last recorded vertex
        let tail = loop {
            if cfg.max_depth.is_some_and(|max| bounce >= max) {
                break Color::ZERO;
            }

            let Some(hit) = scene.intersect(&ray) else {
                break Color::ZERO;
            };

            if hit.is_emissive() {
                break match cfg.emitter_hit {
                    EmitterHit::White => Color::ONE,
                    EmitterHit::Emission => hit.emission,
                };
            }

            let wo = -ray.direction();
            let direct = self.direct_light(scene, &hit, wo, rng);

            if gen_f32(rng) >= cfg.russian_roulette {
                vertices.push(PathVertex {
                    direct,
                    weight: Color::ZERO,
                });
                break Color::ZERO;
            }

            let n = hit.normal;
            let wi = hit.material.sample(wo, n, rng);
            let pdf = hit.material.pdf(wi, wo, n).max(cfg.pdf_floor);
            let weight = hit.material.eval(wi, wo, n) * wi.dot(n) / pdf / cfg.russian_roulette;

            vertices.push(PathVertex { direct, weight });
            ray = Ray::new(hit.p, wi);
            bounce += 1;
        };

        let clamp_each = cfg.clamp == RadianceClamp::PerBounce;
        let mut radiance = if clamp_each { clamp01(tail) } else { tail };
        for vertex in vertices.iter().rev() {
            radiance = vertex.direct + vertex.weight * radiance;
            if clamp_each {
                radiance = clamp01(radiance);
            }
        }

        clamp01(radiance)
    }

    /// One light sample with a shadow probe toward it.
    fn direct_light(
        &self,
        scene: &Scene,
        hit: &Intersection<'_>,
        wo: Vec3,
        rng: &mut dyn RngCore,
    ) -> Color {
        let cfg = &self.config;
        let light = scene.sample_light(rng);

        let to_light = light.point - hit.p;
        let dist2 = to_light.length_squared();
        let wi = to_light.normalize_or_zero();

        let probe = Ray::new(hit.p, wi);
        let visible = scene
            .intersect(&probe)
            .is_some_and(|h| (h.p - light.point).length() < cfg.visibility_tolerance);
        if !visible {
            return Color::ZERO;
        }

        let n = hit.normal;
        let cos_light = (-wi).dot(light.normal).max(0.0);
        let cos_surface = wi.dot(n).max(0.0);

        light.emission * hit.material.eval(wi, wo, n) * cos_light * cos_surface
            / dist2.max(cfg.pdf_floor)
            / light.pdf.max(cfg.pdf_floor)
    }
}

fn clamp01(c: Color) -> Color {
    c.clamp(Color::ZERO, Color::ONE)
}
