use bytemuck::{Pod, Zeroable};
use nalgebra::{Matrix4, Point3};
use thiserror::Error;

use crate::camera::Camera;
use crate::glint::sampling::SamplingTables;
use crate::glint::scene::Scene;
use crate::settings::RenderSettings;
use crate::util::vec_to_array;

/// Fixed capacities of the shader's uniform arrays. The scene itself is
/// unbounded; marshalling clamps to these.
pub const MAX_SPHERES: usize = 32;
pub const MAX_LIGHTS: usize = 8;
pub const MAX_MATERIALS: usize = 32;

#[derive(Debug, Error)]
pub enum MarshalError {
    #[error(
        "sphere {sphere} references material {index}, but the scene only has {materials} materials"
    )]
    InvalidMaterialIndex {
        sphere: usize,
        index: usize,
        materials: usize,
    },
}

// Layouts mirror the uniform block in shaders/raytrace.wgsl; the paddings
// keep every array stride a multiple of 16 bytes.

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SphereUniform {
    pub center: [f32; 3],
    pub radius: f32,
    pub material: u32,
    pub _pad: [u32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub _pad0: f32,
    pub color: [f32; 3],
    pub _pad1: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    pub diffuse: [f32; 3],
    pub shininess: f32,
    pub specular: [f32; 3],
    pub refraction_coeff: f32,
    pub refraction_index: f32,
    pub _pad: [f32; 3],
}

/// The complete per-frame parameter set consumed by the ray tracing
/// program.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub model: [[f32; 4]; 4],
    pub camera_to_world: [[f32; 4]; 4],
    pub spheres: [SphereUniform; MAX_SPHERES],
    pub lights: [LightUniform; MAX_LIGHTS],
    pub materials: [MaterialUniform; MAX_MATERIALS],

    pub background: [f32; 3],
    pub sphere_count: u32,
    pub resolution: [f32; 2],
    pub light_count: u32,
    pub material_count: u32,
    pub fov_degrees: f32,
    pub tan_half_fov: f32,
    pub iteration_limit: u32,
    pub sample_count: u32,
    pub sampling_mode: u32,
    pub transparency_enabled: u32,
    pub jitter_size: u32,
    pub random_count: u32,
}

/// Flattens scene, camera and settings into one [`FrameUniforms`]. Pure
/// transform-and-flatten: no geometry or lighting math happens here, and
/// the same inputs always produce the same output. Sphere and light
/// positions are carried through the current model matrix; everything
/// else passes through unchanged. Overflowing entries are truncated with
/// a warning, including any sphere whose material fell past the clamped
/// table; the emitted indices always stay inside `material_count`.
pub fn marshal(
    scene: &Scene,
    camera: &Camera,
    settings: &RenderSettings,
    tables: &SamplingTables,
) -> Result<FrameUniforms, MarshalError> {
    // Dangling material references abort the frame before any data is
    // emitted.
    let materials = scene.materials();
    for (index, sphere) in scene.spheres().iter().enumerate() {
        if sphere.material_index >= materials.len() {
            return Err(MarshalError::InvalidMaterialIndex {
                sphere: index,
                index: sphere.material_index,
                materials: materials.len(),
            });
        }
    }

    let model = camera.model_matrix();
    let mut out = FrameUniforms::zeroed();
    out.model = model.into();
    out.camera_to_world = camera.camera_to_world().into();

    let material_count = clamped_len("materials", materials.len(), MAX_MATERIALS);

    // Only spheres whose material survived the clamp are emitted; a
    // reference into the truncated tail must never reach the shader.
    let mut sphere_count = 0;
    let mut truncated_refs = 0;
    let mut overflowed = 0;
    for sphere in scene.spheres() {
        if sphere.material_index >= material_count {
            truncated_refs += 1;
            continue;
        }
        if sphere_count == MAX_SPHERES {
            overflowed += 1;
            continue;
        }
        out.spheres[sphere_count] = SphereUniform {
            center: transform(&model, sphere.position.into()),
            radius: sphere.radius,
            material: sphere.material_index as u32,
            _pad: [0; 3],
        };
        sphere_count += 1;
    }
    if truncated_refs > 0 {
        log::warn!(
            "dropped {truncated_refs} spheres referencing materials past the shader capacity of {MAX_MATERIALS}"
        );
    }
    if overflowed > 0 {
        log::warn!(
            "scene holds {} spheres but the shader capacity is {MAX_SPHERES}; truncating",
            sphere_count + overflowed
        );
    }

    let light_count = clamped_len("lights", scene.lights().len(), MAX_LIGHTS);
    for (slot, light) in scene.lights()[..light_count].iter().enumerate() {
        out.lights[slot] = LightUniform {
            position: transform(&model, light.position.into()),
            _pad0: 0.0,
            color: vec_to_array(&light.color),
            _pad1: 0.0,
        };
    }

    for (slot, material) in materials[..material_count].iter().enumerate() {
        out.materials[slot] = MaterialUniform {
            diffuse: vec_to_array(&material.diffuse),
            shininess: material.shininess,
            specular: vec_to_array(&material.specular),
            refraction_coeff: material.refraction_coeff,
            refraction_index: material.refraction_index,
            _pad: [0.0; 3],
        };
    }

    out.background = settings.background();
    out.sphere_count = sphere_count as u32;
    out.resolution = camera.resolution();
    out.light_count = light_count as u32;
    out.material_count = material_count as u32;
    out.fov_degrees = camera.fov_degrees();
    // Precomputed so the shader skips the trigonometric call per pixel.
    out.tan_half_fov = (camera.fov_degrees().to_radians() * 0.5).tan();
    out.iteration_limit = settings.iteration_limit();
    out.sample_count = settings.sample_count();
    out.sampling_mode = settings.sampling_mode() as u32;
    out.transparency_enabled = settings.transparency_enabled() as u32;
    out.jitter_size = tables.jitter_size();
    out.random_count = tables.randoms().len() as u32;

    Ok(out)
}

fn transform(model: &Matrix4<f32>, point: Point3<f32>) -> [f32; 3] {
    let moved = model.transform_point(&point);
    [moved.x, moved.y, moved.z]
}

fn clamped_len(what: &str, len: usize, capacity: usize) -> usize {
    if len > capacity {
        log::warn!("scene holds {len} {what} but the shader capacity is {capacity}; truncating");
        capacity
    } else {
        len
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use winit::dpi::PhysicalSize;

    use crate::glint::builder;
    use crate::glint::scene::{Material, Sphere};
    use crate::settings::SamplingMode;

    use super::*;

    fn fixtures() -> (Scene, Camera, RenderSettings, SamplingTables) {
        (
            builder::default_scene(),
            Camera::new(45.0, PhysicalSize::new(640, 480)),
            RenderSettings::default(),
            SamplingTables::generate(8, 64, &mut StdRng::seed_from_u64(9)),
        )
    }

    #[test]
    fn marshalling_is_idempotent() {
        let (scene, camera, settings, tables) = fixtures();
        let first = marshal(&scene, &camera, &settings, &tables).unwrap();
        let second = marshal(&scene, &camera, &settings, &tables).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn scalar_settings_pass_through_unchanged() {
        let (scene, camera, mut settings, tables) = fixtures();
        settings.set_iteration_limit(9);
        settings.set_sample_count(4);
        settings.set_sampling_mode(SamplingMode::MultiJittered);
        settings.set_background([0.1, 0.2, 0.3]);
        settings.set_transparency_enabled(true);

        let out = marshal(&scene, &camera, &settings, &tables).unwrap();
        assert_eq!(out.iteration_limit, 9);
        assert_eq!(out.sample_count, 4);
        assert_eq!(out.sampling_mode, 1);
        assert_eq!(out.background, [0.1, 0.2, 0.3]);
        assert_eq!(out.transparency_enabled, 1);
        assert_eq!(out.resolution, [640.0, 480.0]);
        assert_eq!(out.fov_degrees, 45.0);
        assert!((out.tan_half_fov - (45.0f32.to_radians() * 0.5).tan()).abs() < 1e-6);
        assert_eq!(out.jitter_size, 8);
        assert_eq!(out.random_count, 64);
    }

    #[test]
    fn scene_order_becomes_array_order() {
        let (scene, camera, settings, tables) = fixtures();
        let out = marshal(&scene, &camera, &settings, &tables).unwrap();

        assert_eq!(out.sphere_count as usize, scene.spheres().len());
        assert_eq!(out.light_count as usize, scene.lights().len());
        assert_eq!(out.material_count as usize, scene.materials().len());

        // Zero rotation: positions survive the model transform verbatim.
        for (slot, sphere) in scene.spheres().iter().enumerate() {
            assert_eq!(out.spheres[slot].center, vec_to_array(&sphere.position));
            assert_eq!(out.spheres[slot].radius, sphere.radius);
            assert_eq!(out.spheres[slot].material, sphere.material_index as u32);
        }
        for (slot, material) in scene.materials().iter().enumerate() {
            assert_eq!(out.materials[slot].shininess, material.shininess);
            assert_eq!(
                out.materials[slot].refraction_index,
                material.refraction_index
            );
        }
    }

    #[test]
    fn model_matrix_rotates_marshalled_positions() {
        let (_, mut camera, settings, tables) = fixtures();
        let mut scene = Scene::new();
        let index = scene.add_material(Material::default());
        scene.add_object(Sphere::new(Vector3::new(0.0, 0.0, 1.0), 1.0, index));

        // Quarter turn about +Y maps +Z to +X.
        camera.begin_drag(0.0, 0.0);
        camera.drag_to(90.0, 0.0);

        let out = marshal(&scene, &camera, &settings, &tables).unwrap();
        let [x, y, z] = out.spheres[0].center;
        assert!((x - 1.0).abs() < 1e-5);
        assert!(y.abs() < 1e-5);
        assert!(z.abs() < 1e-5);
        assert_eq!(out.spheres[0].radius, 1.0);
    }

    #[test]
    fn overflow_clamps_to_shader_capacity() {
        let (_, camera, settings, tables) = fixtures();
        let mut scene = Scene::new();
        let index = scene.add_material(Material::default());
        for _ in 0..MAX_SPHERES + 5 {
            scene.add_object(Sphere::new(Vector3::zeros(), 1.0, index));
        }

        let out = marshal(&scene, &camera, &settings, &tables).unwrap();
        assert_eq!(out.sphere_count as usize, MAX_SPHERES);
    }

    #[test]
    fn spheres_referencing_truncated_materials_are_dropped() {
        let (_, camera, settings, tables) = fixtures();
        let mut scene = Scene::new();
        for _ in 0..MAX_MATERIALS + 4 {
            scene.add_material(Material::default());
        }
        // Valid in the scene, but past the clamped shader table.
        scene.add_object(Sphere::new(Vector3::zeros(), 1.0, MAX_MATERIALS + 2));
        scene.add_object(Sphere::new(Vector3::new(2.0, 0.0, 0.0), 0.5, 0));

        let out = marshal(&scene, &camera, &settings, &tables).unwrap();
        assert_eq!(out.material_count as usize, MAX_MATERIALS);
        assert_eq!(out.sphere_count, 1);
        for slot in 0..out.sphere_count as usize {
            assert!(out.spheres[slot].material < out.material_count);
        }
        assert_eq!(out.spheres[0].radius, 0.5);
    }

    #[test]
    fn dangling_material_index_fails_fast() {
        let (_, camera, settings, tables) = fixtures();
        let mut scene = Scene::new();
        scene.add_material(Material::default());
        scene.add_object(Sphere::new(Vector3::zeros(), 1.0, 3));

        let error = marshal(&scene, &camera, &settings, &tables).unwrap_err();
        assert!(matches!(
            error,
            MarshalError::InvalidMaterialIndex {
                sphere: 0,
                index: 3,
                materials: 1,
            }
        ));
    }
}
