use nalgebra::Vector3;

/// Surface description forwarded verbatim to the shader. Out-of-range
/// values are not rejected here; range policy belongs to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub shininess: f32,
    /// Opacity-to-transparency blend, 0.0 = fully opaque.
    pub refraction_coeff: f32,
    /// Ratio of light bending, 1.0 = no refraction effect.
    pub refraction_index: f32,
}

impl Material {
    pub fn new(diffuse: Vector3<f32>, specular: Vector3<f32>, shininess: f32) -> Self {
        Self {
            diffuse,
            specular,
            shininess,
            refraction_coeff: 0.0,
            refraction_index: 1.0,
        }
    }

    /// Enables transparency evaluation downstream. Leaves the reflectance
    /// parameters untouched.
    pub fn make_transparent(&mut self, coeff: f32, index: f32) {
        self.refraction_coeff = coeff;
        self.refraction_index = index;
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Vector3::new(1.0, 1.0, 1.0), Vector3::zeros(), 50.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sphere {
    pub position: Vector3<f32>,
    pub radius: f32,
    /// Index into the owning scene's material list. The caller keeps it
    /// valid; marshalling fails fast on a dangling index.
    pub material_index: usize,
}

impl Sphere {
    pub fn new(position: Vector3<f32>, radius: f32, material_index: usize) -> Self {
        Self {
            position,
            radius,
            material_index,
        }
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            radius: 1.0,
            material_index: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightSource {
    pub position: Vector3<f32>,
    /// Unbounded positive intensity, components may exceed 1.0.
    pub color: Vector3<f32>,
}

impl LightSource {
    pub fn new(position: Vector3<f32>, color: Vector3<f32>) -> Self {
        Self { position, color }
    }
}

/// Ordered collections of spheres, lights and materials. Insertion order
/// is the index used for cross-references and for array position when the
/// scene is flattened for the shader; nothing is ever removed or reordered
/// short of replacing the whole scene.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    spheres: Vec<Sphere>,
    lights: Vec<LightSource>,
    materials: Vec<Material>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, sphere: Sphere) {
        self.spheres.push(sphere);
    }

    pub fn add_light(&mut self, light: LightSource) {
        self.lights.push(light);
    }

    /// Appends and returns the newly assigned index, which equals the
    /// prior material count.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Panics if `index` was never returned by [`Scene::add_material`].
    pub fn material_mut(&mut self, index: usize) -> &mut Material {
        &mut self.materials[index]
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn lights(&self) -> &[LightSource] {
        &self.lights
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Removes all spheres. Lights and materials persist so a scene can be
    /// wiped and rebuilt without re-specifying the light rig or palette.
    pub fn clear(&mut self) {
        self.spheres.clear();
    }
}
