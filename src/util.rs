use nalgebra::Vector3;
use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::Rng;

/// Vector with each component drawn independently from `range`.
/// The rng comes in by argument so callers can seed it for reproducible runs.
pub fn random_vec<T, R>(rng: &mut impl Rng, range: R) -> Vector3<T>
where
    T: SampleUniform,
    R: SampleRange<T> + Clone,
{
    Vector3::new(
        rng.gen_range(range.clone()),
        rng.gen_range(range.clone()),
        rng.gen_range(range),
    )
}

pub fn vec_to_array(vec: &Vector3<f32>) -> [f32; 3] {
    [vec.x, vec.y, vec.z]
}
