//! Sphere primitive for ray tracing.

use crate::hittable::{Hittable, Intersection, Primitive, SurfaceSample};
use crate::{gen_f32, Material};
use ember_math::{sampling, Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;
use std::sync::Arc;

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere. Negative radii are treated as zero.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Intersection<'_>> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        Some(Intersection::new(ray, root, outward_normal, &self.material))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

impl Primitive for Sphere {
    fn material(&self) -> &Material {
        &self.material
    }

    fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    fn sample_surface_point(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        let normal = sampling::uniform_sphere(gen_f32(rng), gen_f32(rng));
        SurfaceSample {
            point: self.center + self.radius * normal,
            normal,
            pdf: 1.0 / self.area(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grey_sphere() -> Sphere {
        Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Material::diffuse(Color::splat(0.5))),
        )
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = grey_sphere();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let rec = sphere
            .hit(&ray, Interval::forward(0.001))
            .expect("ray should hit the sphere");
        assert!((rec.t - 0.5).abs() < 0.001);
        assert!(rec.front_face);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let sphere = grey_sphere();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::X);

        let rec = sphere.hit(&ray, Interval::forward(0.001)).expect("inside hit");
        assert!((rec.t - 0.5).abs() < 0.001);
        assert!(!rec.front_face);
        assert!((rec.normal + Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = grey_sphere();
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert!(sphere.hit(&ray, Interval::forward(0.001)).is_none());
    }

    #[test]
    fn test_sphere_surface_sample() {
        let sphere = grey_sphere();
        let mut rng = StdRng::seed_from_u64(42);

        assert!((sphere.area() - PI).abs() < 1e-5);
        for _ in 0..100 {
            let s = sphere.sample_surface_point(&mut rng);
            assert!(((s.point - sphere.center).length() - 0.5).abs() < 1e-4);
            assert!((s.normal.length() - 1.0).abs() < 1e-4);
            assert!((s.pdf - 1.0 / PI).abs() < 1e-6);
        }
    }
}
