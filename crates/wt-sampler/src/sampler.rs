//! Random sampling of simulation parameters.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use wt_types::{Bounds, ConfigError, ParameterBounds, TrialParameters};

/// Independent uniform sampling of x, y, z from their inclusive ranges.
///
/// Bounds are validated at construction, so every sampler that exists can
/// only produce in-range parameters.
#[derive(Debug, Clone)]
pub struct ParameterSampler {
    bounds: ParameterBounds,
    rng: ChaCha8Rng,
}

impl ParameterSampler {
    /// Sampler seeded from the thread-local generator.
    pub fn new(bounds: ParameterBounds) -> Result<Self, ConfigError> {
        Self::seeded(bounds, rand::thread_rng().gen())
    }

    /// Deterministic sampler; the same seed yields the same sequence.
    pub fn seeded(bounds: ParameterBounds, seed: u64) -> Result<Self, ConfigError> {
        bounds.validate()?;
        Ok(Self {
            bounds,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Restart the sequence from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn bounds(&self) -> &ParameterBounds {
        &self.bounds
    }

    pub fn sample(&mut self) -> TrialParameters {
        let x = draw(&mut self.rng, self.bounds.x);
        let y = draw(&mut self.rng, self.bounds.y);
        let z = draw(&mut self.rng, self.bounds.z);
        TrialParameters { x, y, z }
    }

    /// Draw `count` parameter sets in sequence.
    pub fn suggest(&mut self, count: usize) -> Vec<TrialParameters> {
        (0..count).map(|_| self.sample()).collect()
    }
}

fn draw<R: Rng>(rng: &mut R, bounds: Bounds) -> i64 {
    rng.gen_range(bounds.min..=bounds.max)
}
