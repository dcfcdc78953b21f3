use rand::Rng;

pub const JITTER_GRID_SIZE: u32 = 256;
pub const RANDOM_POOL_SIZE: usize = 4096;

/// Precomputed per-session sampling data: a stratified 2D jitter grid and
/// a flat pool of uniform randoms. Generated once, read-only afterwards;
/// the shader consumes both as lookup textures.
pub struct SamplingTables {
    jitter: Vec<[f32; 2]>,
    jitter_size: u32,
    randoms: Vec<f32>,
}

impl SamplingTables {
    /// One random sample per stratum: cell (i, j) of an NxN grid holds
    /// `((i + r1)/N, (j + r2)/N)`, stored row-major at `j * N + i`.
    pub fn generate(jitter_size: u32, pool_size: usize, rng: &mut impl Rng) -> Self {
        let n = jitter_size.max(1);

        let mut jitter = Vec::with_capacity((n * n) as usize);
        for j in 0..n {
            for i in 0..n {
                jitter.push([
                    (i as f32 + rng.gen::<f32>()) / n as f32,
                    (j as f32 + rng.gen::<f32>()) / n as f32,
                ]);
            }
        }

        let randoms = (0..pool_size.max(1)).map(|_| rng.gen()).collect();

        Self {
            jitter,
            jitter_size: n,
            randoms,
        }
    }

    pub fn from_entropy() -> Self {
        Self::generate(JITTER_GRID_SIZE, RANDOM_POOL_SIZE, &mut rand::thread_rng())
    }

    pub fn jitter(&self) -> &[[f32; 2]] {
        &self.jitter
    }

    pub fn jitter_size(&self) -> u32 {
        self.jitter_size
    }

    pub fn randoms(&self) -> &[f32] {
        &self.randoms
    }
}
