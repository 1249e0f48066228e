//! Geometry oracle interface: nearest-hit queries and emitter surfaces.

use crate::{Color, Material};
use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Record of a ray-surface intersection.
///
/// Produced fresh by every query and owned by the caller; it borrows the
/// material of the surface that was hit.
#[derive(Clone, Debug)]
pub struct Intersection<'a> {
    /// Ray parameter of the hit
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Unit surface normal, always facing against the incoming ray
    pub normal: Vec3,
    /// Whether the ray hit the front (outward-facing) side
    pub front_face: bool,
    /// Material at the intersection point
    pub material: &'a Material,
    /// Radiance emitted by the surface (zero for non-emitters)
    pub emission: Color,
}

impl<'a> Intersection<'a> {
    /// Build a record, orienting `outward_normal` against the ray.
    pub fn new(ray: &Ray, t: f32, outward_normal: Vec3, material: &'a Material) -> Self {
        let front_face = ray.direction().dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };

        Self {
            t,
            p: ray.at(t),
            normal,
            front_face,
            material,
            emission: material.emission(),
        }
    }

    /// True if the surface that was hit is a light.
    pub fn is_emissive(&self) -> bool {
        self.material.has_emission()
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with this object inside `ray_t`, if any.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Intersection<'_>>;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}

/// A point drawn on a primitive's surface.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceSample {
    pub point: Vec3,
    /// Outward geometric normal at `point`
    pub normal: Vec3,
    /// Area density of the draw (`1 / area` for uniform sampling)
    pub pdf: f32,
}

/// A scene primitive: intersectable, with a material and a samplable surface.
pub trait Primitive: Hittable {
    fn material(&self) -> &Material;

    /// Surface area in world units.
    fn area(&self) -> f32;

    /// Uniformly sample a point on the surface.
    fn sample_surface_point(&self, rng: &mut dyn RngCore) -> SurfaceSample;

    fn has_emission(&self) -> bool {
        self.material().has_emission()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_normal_orientation() {
        let material = Material::diffuse(Color::ONE);
        let outward = Vec3::Z;

        let front = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let rec = Intersection::new(&front, 5.0, outward, &material);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);
        assert_eq!(rec.p, Vec3::ZERO);

        let back = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let rec = Intersection::new(&back, 5.0, outward, &material);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::Z);
    }

    #[test]
    fn test_intersection_carries_emission() {
        let light = Material::diffuse(Color::ONE).with_emission(Color::splat(4.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        let rec = Intersection::new(&ray, 2.0, -Vec3::Y, &light);

        assert!(rec.is_emissive());
        assert_eq!(rec.emission, Color::splat(4.0));
    }
}
