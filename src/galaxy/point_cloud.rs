use super::GalaxyConfig;
use rand::prelude::*;
use rayon::prelude::*;

/// Edge length of the cube the particles are scattered in, centered on the origin.
pub const CUBE_EXTENT: f32 = 3.0;

// particles handed to each rayon task
const PAR_CHUNK: usize = 4096;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GalaxyError {
    #[error("particle count must not be negative (got {count})")]
    Validation { count: i32 },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Blending {
    Additive,
}

/// How a cloud is drawn. Everything but `size` is fixed.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PointStyle {
    pub size: f32,
    pub size_attenuation: bool,
    pub depth_write: bool,
    pub blending: Blending,
}

impl PointStyle {
    pub fn with_size(size: f32) -> Self {
        Self {
            size,
            size_attenuation: true,
            depth_write: false,
            blending: Blending::Additive,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PointCloud {
    /// xyz triples, `3 * count` floats
    pub positions: Vec<f32>,
    pub style: PointStyle,
}

impl PointCloud {
    /// Scatters `config.count` points uniformly over the cube `[-1.5, 1.5)^3`.
    pub fn generate<R: Rng + ?Sized>(
        config: &GalaxyConfig,
        rng: &mut R,
    ) -> Result<Self, GalaxyError> {
        let mut positions = Self::alloc(config)?;
        fill_uniform(&mut positions, rng);

        Ok(Self {
            positions,
            style: PointStyle::with_size(config.size),
        })
    }

    /// Same contract as [`PointCloud::generate`], filled across the rayon pool
    /// from each worker's thread-local rng.
    pub fn generate_par(config: &GalaxyConfig) -> Result<Self, GalaxyError> {
        if config.count <= PAR_CHUNK as i32 {
            return Self::generate(config, &mut rand::rng());
        }
        let mut positions = Self::alloc(config)?;
        positions
            .par_chunks_mut(3 * PAR_CHUNK)
            .for_each(|chunk| fill_uniform(chunk, &mut rand::rng()));

        Ok(Self {
            positions,
            style: PointStyle::with_size(config.size),
        })
    }

    fn alloc(config: &GalaxyConfig) -> Result<Vec<f32>, GalaxyError> {
        Ok(vec![0.0; buffer_len(config.count)?])
    }

    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The positions viewed as one `[x, y, z]` per particle.
    pub fn points(&self) -> &[[f32; 3]] {
        bytemuck::cast_slice(&self.positions)
    }
}

/// Floats needed for `count` particles. Rejects negative counts and counts
/// whose buffer would not be addressable on this target.
fn buffer_len(count: i32) -> Result<usize, GalaxyError> {
    usize::try_from(count)
        .ok()
        .and_then(|n| n.checked_mul(3))
        .ok_or(GalaxyError::Validation { count })
}

fn fill_uniform<R: Rng + ?Sized>(buf: &mut [f32], rng: &mut R) {
    for v in buf.iter_mut() {
        *v = (rng.random::<f32>() - 0.5) * CUBE_EXTENT;
    }
}
