//! Ember renderer - CPU path tracing core.
//!
//! A Monte Carlo path tracer with next-event estimation and Russian
//! roulette, importance-sampled diffuse and GGX microfacet materials, an
//! area-weighted light sampler and a range-partitioned parallel scheduler.

mod bvh;
mod camera;
mod config;
mod error;
mod framebuffer;
mod hittable;
mod integrator;
mod light;
mod material;
mod microfacet;
mod output;
mod scene;
mod scheduler;
mod sphere;
mod triangle;

pub use bvh::BvhNode;
pub use camera::Camera;
pub use config::{default_threads, OutputConfig, RenderSettings, DEFAULT_SAMPLES_PER_PIXEL};
pub use error::{RenderError, RenderResult};
pub use framebuffer::Framebuffer;
pub use hittable::{Hittable, Intersection, Primitive, SurfaceSample};
pub use integrator::{EmitterHit, IntegratorConfig, PathIntegrator, PathScratch, RadianceClamp};
pub use light::{LightSample, LightSampler};
pub use material::{Bxdf, Color, IdealDiffuse, Material, Surface, EMISSION_EPSILON};
pub use microfacet::{MicrofacetGgx, MIN_ROUGHNESS};
pub use output::{encode_channel, output_file_name, output_path, to_rgb8, write_image};
pub use scene::{Scene, SceneBuilder, RAY_T_MIN};
pub use scheduler::{partition, render, RenderJob};
pub use sphere::Sphere;
pub use triangle::{quad, Triangle};

/// Re-export common math types from ember_math
pub use ember_math::{Aabb, Interval, Ray, Vec3};

use rand::{Rng, RngCore};

/// Uniform `f32` in `[0, 1)` from a type-erased generator.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen()
}
