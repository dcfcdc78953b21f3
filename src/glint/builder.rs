use nalgebra::Vector3;
use rand::Rng;

use crate::glint::scene::{LightSource, Material, Scene, Sphere};
use crate::util::random_vec;

/// Random spheres land with each axis in [-HALF_WIDTH, HALF_WIDTH].
pub const POSITION_HALF_WIDTH: f32 = 5.0;
pub const RADIUS_MIN: f32 = 0.2;
pub const RADIUS_MAX: f32 = 1.5;
const SHININESS_MAX: f32 = 1000.0;

/// The fixed light rig every generated scene ends with.
fn light_rig() -> [LightSource; 3] {
    [
        LightSource::new(
            Vector3::new(10.0, 10.0, -10.0),
            Vector3::new(1.2, 1.2, 1.2),
        ),
        LightSource::new(Vector3::new(-10.0, 10.0, 10.0), Vector3::new(0.6, 0.6, 0.9)),
        LightSource::new(Vector3::new(0.0, -10.0, 0.0), Vector3::new(0.3, 0.3, 0.3)),
    ]
}

/// Hand-authored startup scene, also the "reset" target.
pub fn default_scene() -> Scene {
    let mut scene = Scene::new();

    let matte_red = scene.add_material(Material::new(
        Vector3::new(0.9, 0.15, 0.1),
        Vector3::new(0.1, 0.1, 0.1),
        30.0,
    ));
    let matte_green = scene.add_material(Material::new(
        Vector3::new(0.15, 0.8, 0.2),
        Vector3::new(0.1, 0.1, 0.1),
        30.0,
    ));
    let polished_blue = scene.add_material(Material::new(
        Vector3::new(0.1, 0.25, 0.85),
        Vector3::new(0.9, 0.9, 0.9),
        200.0,
    ));
    let mirror = scene.add_material(Material::new(
        Vector3::new(0.05, 0.05, 0.05),
        Vector3::new(0.95, 0.95, 0.95),
        900.0,
    ));
    let glass = {
        let mut material = Material::new(
            Vector3::new(0.9, 0.9, 0.9),
            Vector3::new(0.6, 0.6, 0.6),
            300.0,
        );
        material.make_transparent(0.8, 1.5);
        scene.add_material(material)
    };
    let tinted_glass = {
        let mut material = Material::new(
            Vector3::new(0.7, 0.9, 0.8),
            Vector3::new(0.4, 0.4, 0.4),
            150.0,
        );
        material.make_transparent(0.9, 1.03);
        scene.add_material(material)
    };

    scene.add_object(Sphere::new(Vector3::new(0.0, 0.0, 0.0), 2.0, mirror));
    scene.add_object(Sphere::new(Vector3::new(3.5, 0.0, 0.0), 1.0, matte_red));
    scene.add_object(Sphere::new(Vector3::new(-3.5, 0.0, 0.0), 1.0, matte_green));
    scene.add_object(Sphere::new(Vector3::new(0.0, 3.5, 0.0), 1.0, polished_blue));
    scene.add_object(Sphere::new(Vector3::new(0.0, -3.5, 0.0), 1.0, matte_red));
    scene.add_object(Sphere::new(Vector3::new(2.5, 2.5, -2.5), 0.8, glass));
    scene.add_object(Sphere::new(
        Vector3::new(-2.5, -2.5, 2.5),
        0.8,
        tinted_glass,
    ));

    for light in light_rig() {
        scene.add_light(light);
    }

    scene
}

/// Fresh scene of `count` random spheres plus the fixed light rig.
/// Replaces the current scene wholesale; it never merges.
pub fn random_scene(count: usize, rng: &mut impl Rng) -> Scene {
    let mut scene = Scene::new();

    for _ in 0..count {
        push_random_sphere(&mut scene, rng);
    }
    for light in light_rig() {
        scene.add_light(light);
    }

    scene
}

/// Appends one random sphere (with its own fresh material) to an existing
/// scene. Lights and previously added materials are untouched.
pub fn add_random_object(scene: &mut Scene, rng: &mut impl Rng) {
    push_random_sphere(scene, rng);
}

fn push_random_sphere(scene: &mut Scene, rng: &mut impl Rng) {
    let albedo: Vector3<f32> = random_vec(rng, 0.0..1.0f32);

    // Split reflectance between diffuse and specular by a random coefficient.
    let split = rng.gen::<f32>();
    let mut material = Material::new(
        albedo * split,
        Vector3::repeat(1.0 - split),
        rng.gen_range(0.0..SHININESS_MAX),
    );
    if rng.gen_bool(0.3) {
        material.make_transparent(rng.gen_range(0.5..1.0), rng.gen_range(1.0..2.0));
    }
    let material_index = scene.add_material(material);

    scene.add_object(Sphere::new(
        random_vec(rng, -POSITION_HALF_WIDTH..POSITION_HALF_WIDTH),
        rng.gen_range(RADIUS_MIN..RADIUS_MAX),
        material_index,
    ));
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn default_scene_is_the_fixed_layout() {
        let scene = default_scene();
        assert_eq!(scene.spheres().len(), 7);
        assert_eq!(scene.lights().len(), 3);
        assert_eq!(scene.materials().len(), 6);

        // One material carries the tinted-glass transparency pair.
        assert!(scene
            .materials()
            .iter()
            .any(|m| m.refraction_coeff == 0.9 && m.refraction_index == 1.03));
    }

    #[test]
    fn random_scene_has_exact_counts_for_any_seed() {
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let scene = random_scene(25, &mut rng);

            assert_eq!(scene.spheres().len(), 25);
            assert_eq!(scene.lights().len(), 3);
            for sphere in scene.spheres() {
                assert!(sphere.radius >= RADIUS_MIN && sphere.radius < RADIUS_MAX);
                assert!(sphere.material_index < scene.materials().len());
                for axis in 0..3 {
                    assert!(sphere.position[axis].abs() <= POSITION_HALF_WIDTH);
                }
            }
        }
    }

    #[test]
    fn random_scene_of_zero_spheres_still_has_the_light_rig() {
        let mut rng = StdRng::seed_from_u64(7);
        let scene = random_scene(0, &mut rng);
        assert!(scene.spheres().is_empty());
        assert_eq!(scene.lights().len(), 3);
    }

    #[test]
    fn add_random_object_grows_incrementally() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut scene = default_scene();
        let lights = scene.lights().len();
        let spheres = scene.spheres().len();
        let materials = scene.materials().len();

        add_random_object(&mut scene, &mut rng);

        assert_eq!(scene.spheres().len(), spheres + 1);
        assert_eq!(scene.materials().len(), materials + 1);
        assert_eq!(scene.lights().len(), lights);
        let added = scene.spheres().last().unwrap();
        assert_eq!(added.material_index, materials);
    }
}
