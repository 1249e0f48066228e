//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.
//! The outward normal follows the winding `(v1 - v0) × (v2 - v0)`. Light
//! sampling only counts emission toward that side, while a ray landing on
//! either side of an emitter reads its emission.

use crate::hittable::{Hittable, Intersection, Primitive, SurfaceSample};
use crate::{gen_f32, Material};
use ember_math::{sampling, Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// A triangle primitive.
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length)
    normal: Vec3,
    area: f32,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<Material>) -> Self {
        let cross = (v1 - v0).cross(v2 - v0);
        let min = v0.min(v1).min(v2);
        let max = v0.max(v1).max(v2);

        Self {
            v0,
            v1,
            v2,
            normal: cross.normalize_or_zero(),
            area: 0.5 * cross.length(),
            material,
            bbox: Aabb::from_points(min, max),
        }
    }

    /// Outward face normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

/// Split the planar quad `a b c d` into two triangles sharing its winding.
pub fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3, material: Arc<Material>) -> [Triangle; 2] {
    [
        Triangle::new(a, b, c, Arc::clone(&material)),
        Triangle::new(a, c, d, material),
    ]
}

impl Hittable for Triangle {
    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Intersection<'_>> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.surrounds(t) {
            return None;
        }

        Some(Intersection::new(ray, t, self.normal, &self.material))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

impl Primitive for Triangle {
    fn material(&self) -> &Material {
        &self.material
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn sample_surface_point(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        let (b1, b2) = sampling::uniform_triangle(gen_f32(rng), gen_f32(rng));
        let point = self.v0 + b1 * (self.v1 - self.v0) + b2 * (self.v2 - self.v0);

        SurfaceSample {
            point,
            normal: self.normal,
            pdf: 1.0 / self.area,
        }
    }
}
