//! Built-in Cornell box scene.

use anyhow::{Context, Result};
use ember_math::Vec3;
use ember_renderer::{quad, Camera, Color, Material, Scene, SceneBuilder, Sphere};
use std::sync::Arc;

/// Ceiling light radiance: three spectral peaks folded to RGB.
fn light_emission() -> Color {
    8.0 * Color::new(0.747 + 0.058, 0.747 + 0.258, 0.747)
        + 15.6 * Color::new(0.740 + 0.287, 0.740 + 0.160, 0.740)
        + 18.4 * Color::new(0.737 + 0.642, 0.737 + 0.159, 0.737)
}

fn add_quad(builder: &mut SceneBuilder, corners: [[f32; 3]; 4], material: &Arc<Material>) {
    let [a, b, c, d] = corners.map(Vec3::from_array);
    builder.extend(quad(a, b, c, d, Arc::clone(material)));
}

/// The classic box: marble floor, ceiling and back wall, red and green
/// walls, a silver tall box, a gold sphere and a ceiling light.
pub fn build_scene() -> Result<Scene> {
    let white_marble = Arc::new(Material::microfacet(Color::new(0.875, 0.83, 0.82), 0.001, 0.0));
    let red_plastic = Arc::new(Material::microfacet(Color::new(1.0, 0.05, 0.04), 0.8, 0.0));
    let green_plastic = Arc::new(Material::microfacet(Color::new(0.14, 1.0, 0.091), 0.8, 0.0));
    let silver = Arc::new(Material::microfacet(Color::new(0.95, 0.93, 0.88), 0.01, 1.0));
    let gold = Arc::new(Material::microfacet(Color::new(1.0, 0.71, 0.29), 0.0001, 1.0));
    let light = Arc::new(Material::diffuse(Color::splat(0.65)).with_emission(light_emission()));

    let mut builder = Scene::builder();

    // Floor, ceiling, back wall
    add_quad(
        &mut builder,
        [[552.8, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 559.2], [549.6, 0.0, 559.2]],
        &white_marble,
    );
    add_quad(
        &mut builder,
        [[556.0, 548.8, 0.0], [556.0, 548.8, 559.2], [0.0, 548.8, 559.2], [0.0, 548.8, 0.0]],
        &white_marble,
    );
    add_quad(
        &mut builder,
        [[549.6, 0.0, 559.2], [0.0, 0.0, 559.2], [0.0, 548.8, 559.2], [556.0, 548.8, 559.2]],
        &white_marble,
    );

    // Side walls
    add_quad(
        &mut builder,
        [[552.8, 0.0, 0.0], [549.6, 0.0, 559.2], [556.0, 548.8, 559.2], [556.0, 548.8, 0.0]],
        &red_plastic,
    );
    add_quad(
        &mut builder,
        [[0.0, 0.0, 559.2], [0.0, 0.0, 0.0], [0.0, 548.8, 0.0], [0.0, 548.8, 559.2]],
        &green_plastic,
    );

    // Tall box
    let tall_box = [
        [
            [423.0, 330.0, 247.0],
            [265.0, 330.0, 296.0],
            [314.0, 330.0, 456.0],
            [472.0, 330.0, 406.0],
        ],
        [[423.0, 0.0, 247.0], [423.0, 330.0, 247.0], [472.0, 330.0, 406.0], [472.0, 0.0, 406.0]],
        [[472.0, 0.0, 406.0], [472.0, 330.0, 406.0], [314.0, 330.0, 456.0], [314.0, 0.0, 456.0]],
        [[314.0, 0.0, 456.0], [314.0, 330.0, 456.0], [265.0, 330.0, 296.0], [265.0, 0.0, 296.0]],
        [[265.0, 0.0, 296.0], [265.0, 330.0, 296.0], [423.0, 330.0, 247.0], [423.0, 0.0, 247.0]],
    ];
    for face in tall_box {
        add_quad(&mut builder, face, &silver);
    }

    builder.add(Sphere::new(Vec3::new(138.0, 120.0, 334.0), 120.0, gold));

    // Wound so the light faces down into the box
    add_quad(
        &mut builder,
        [
            [343.0, 548.7, 227.0],
            [343.0, 548.7, 332.0],
            [213.0, 548.7, 332.0],
            [213.0, 548.7, 227.0],
        ],
        &light,
    );

    builder.build().context("Failed to build Cornell box scene")
}

/// Camera in front of the open side of the box.
pub fn camera(width: u32, height: u32) -> Camera {
    Camera::new()
        .with_resolution(width, height)
        .with_position(
            Vec3::new(278.0, 273.0, -800.0),
            Vec3::new(278.0, 273.0, 0.0),
            Vec3::Y,
        )
        .with_vfov(40.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cornell_scene_builds() {
        let scene = build_scene().expect("scene");
        // 10 wall triangles, 10 box triangles, 1 sphere, 2 light triangles
        assert_eq!(scene.len(), 23);
        assert_eq!(scene.lights().emitter_count(), 2);
        assert!((scene.lights().total_area() - 130.0 * 105.0).abs() < 1.0);
    }

    #[test]
    fn test_light_emission_is_bright() {
        let e = light_emission();
        assert!(e.min_element() > 30.0);
        assert!(e.x > e.z);
    }

    #[test]
    fn test_center_ray_enters_box() {
        let scene = build_scene().expect("scene");
        let camera = camera(64, 64);
        let hit = scene.intersect(&camera.center_ray(32, 32)).expect("hits something");
        assert!(hit.p.z > 0.0);
    }
}
