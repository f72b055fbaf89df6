pub mod morph;
pub mod normalize;

use rand::Rng;

pub use morph::{MorphController, MorphError};
pub use normalize::{normalize, NormalizeError, NormalizedPointSet, PointCloud};

/// Everything the particle renderer needs from the loaded asset.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    pub sets: Vec<NormalizedPointSet>,
    pub sizes: Vec<f32>,
}

impl ParticleSystem {
    pub fn new(clouds: &[PointCloud], rng: &mut impl Rng) -> Result<Self, NormalizeError> {
        let sets = normalize(clouds, rng)?;
        let max_count = sets.first().map_or(0, NormalizedPointSet::len);
        let sizes = (0..max_count).map(|_| rng.gen::<f32>()).collect();
        Ok(Self { sets, sizes })
    }

    pub fn max_count(&self) -> usize {
        self.sizes.len()
    }

    /// Set shown as the morph target before the first morph.
    pub fn initial_target(&self) -> usize {
        self.sets.len().saturating_sub(1).min(3)
    }
}
