//! Area-proportional sampling of emissive surfaces.
//!
//! An emitter `k` is picked with probability `area_k / total` and a point is
//! drawn uniformly on it with density `1 / area_k`, so the density over the
//! union of all emitters is the constant `1 / total`.

use crate::error::{RenderError, RenderResult};
use crate::hittable::Primitive;
use crate::{gen_f32, Color};
use ember_math::Vec3;
use rand::RngCore;
use std::sync::Arc;

/// A point sampled on a light.
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    pub point: Vec3,
    /// Outward normal of the emitter at `point`
    pub normal: Vec3,
    pub emission: Color,
    /// Area density over all emissive surface (`1 / total_area`)
    pub pdf: f32,
    /// Index of the chosen emitter among the sampler's emitters
    pub emitter: usize,
}

/// Samples points on the scene's emissive primitives.
pub struct LightSampler {
    emitters: Vec<Arc<dyn Primitive>>,
    /// Running sum of emitter areas; last entry is the total
    cumulative_area: Vec<f32>,
    total_area: f32,
}

impl LightSampler {
    /// Collect the emissive primitives of a scene.
    ///
    /// Fails with [`RenderError::NoEmitters`] when there is no emissive area,
    /// since every sample would have to divide by zero.
    pub fn new(primitives: &[Arc<dyn Primitive>]) -> RenderResult<Self> {
        let emitters: Vec<Arc<dyn Primitive>> = primitives
            .iter()
            .filter(|p| p.has_emission() && p.area() > 0.0)
            .cloned()
            .collect();

        let cumulative_area: Vec<f32> = emitters
            .iter()
            .scan(0.0_f32, |sum, p| {
                *sum += p.area();
                Some(*sum)
            })
            .collect();
        let total_area = cumulative_area.last().copied().unwrap_or(0.0);

        if !(total_area > 0.0) {
            return Err(RenderError::NoEmitters);
        }

        log::debug!(
            "Light sampler: {} emitters, total emissive area {:.3}",
            emitters.len(),
            total_area
        );

        Ok(Self {
            emitters,
            cumulative_area,
            total_area,
        })
    }

    pub fn total_area(&self) -> f32 {
        self.total_area
    }

    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    /// Area of emitter `index`, if there is one.
    pub fn emitter_area(&self, index: usize) -> Option<f32> {
        self.emitters.get(index).map(|e| e.area())
    }

    /// Pick an emitter by area and a uniform point on it.
    pub fn sample(&self, rng: &mut dyn RngCore) -> LightSample {
        let target = gen_f32(rng) * self.total_area;
        let emitter = self
            .cumulative_area
            .partition_point(|&sum| sum <= target)
            .min(self.emitters.len() - 1);

        let primitive = &self.emitters[emitter];
        let surface = primitive.sample_surface_point(rng);

        LightSample {
            point: surface.point,
            normal: surface.normal,
            emission: primitive.material().emission(),
            pdf: 1.0 / self.total_area,
            emitter,
        }
    }
}
