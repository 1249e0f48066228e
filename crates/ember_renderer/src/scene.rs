//! Scene container: primitives, their BVH and the light sampler.

use crate::bvh::BvhNode;
use crate::error::{RenderError, RenderResult};
use crate::hittable::{Hittable, Intersection, Primitive};
use crate::light::{LightSample, LightSampler};
use ember_math::{Interval, Ray};
use rand::RngCore;
use std::sync::Arc;

/// Smallest ray parameter accepted by scene queries.
pub const RAY_T_MIN: f32 = 0.001;

/// An immutable, fully built scene, safe to share between render workers.
pub struct Scene {
    primitives: Vec<Arc<dyn Primitive>>,
    bvh: BvhNode,
    lights: LightSampler,
}

impl Scene {
    /// Build a scene from a list of primitives.
    ///
    /// Fails if the list is empty or carries no emissive area.
    pub fn new(primitives: Vec<Arc<dyn Primitive>>) -> RenderResult<Self> {
        if primitives.is_empty() {
            return Err(RenderError::EmptyScene);
        }

        let lights = LightSampler::new(&primitives)?;
        let bvh = BvhNode::new(primitives.clone());

        log::debug!(
            "Scene: {} primitives, BVH depth {}, {} emitters",
            primitives.len(),
            bvh.depth(),
            lights.emitter_count()
        );

        Ok(Self {
            primitives,
            bvh,
            lights,
        })
    }

    pub fn builder() -> SceneBuilder {
        SceneBuilder::default()
    }

    /// Nearest intersection along `ray`, ignoring hits closer than [`RAY_T_MIN`].
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection<'_>> {
        self.bvh.hit(ray, Interval::forward(RAY_T_MIN))
    }

    /// Draw a point on the scene's lights.
    pub fn sample_light(&self, rng: &mut dyn RngCore) -> LightSample {
        self.lights.sample(rng)
    }

    pub fn lights(&self) -> &LightSampler {
        &self.lights
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

/// Accumulates primitives before freezing them into a [`Scene`].
#[derive(Default)]
pub struct SceneBuilder {
    primitives: Vec<Arc<dyn Primitive>>,
}

impl SceneBuilder {
    pub fn add<P: Primitive + 'static>(&mut self, primitive: P) -> &mut Self {
        self.primitives.push(Arc::new(primitive));
        self
    }

    /// Add several primitives at once (e.g. both halves of a quad).
    pub fn extend<P, I>(&mut self, primitives: I) -> &mut Self
    where
        P: Primitive + 'static,
        I: IntoIterator<Item = P>,
    {
        self.primitives
            .extend(primitives.into_iter().map(|p| Arc::new(p) as Arc<dyn Primitive>));
        self
    }

    pub fn build(self) -> RenderResult<Scene> {
        Scene::new(self.primitives)
    }
}
