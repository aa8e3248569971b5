use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of symmetric uniform perturbations for sale prices and durations.
pub trait JitterSource {
    /// One draw from U[-ratio, +ratio]. A zero ratio yields exactly 0.
    fn sample(&mut self, ratio: f64) -> f64;
}

/// [`JitterSource`] backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct UniformJitter<R> {
    rng: R,
}

impl<R: Rng> UniformJitter<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl UniformJitter<ChaCha8Rng> {
    /// Independent generator for one path of a Monte Carlo run.
    pub fn for_path(base_seed: u64, path_index: u32) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(derive_seed(base_seed, path_index)))
    }
}

impl<R: Rng> JitterSource for UniformJitter<R> {
    fn sample(&mut self, ratio: f64) -> f64 {
        if ratio <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-ratio..=ratio)
    }
}

/// Replays a fixed list of draws, then zeros. Useful for scripted paths.
#[derive(Debug, Clone, Default)]
pub struct ScriptedJitter {
    draws: Vec<f64>,
    next: usize,
}

impl ScriptedJitter {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, next: 0 }
    }

    pub fn consumed(&self) -> usize {
        self.next
    }
}

impl JitterSource for ScriptedJitter {
    fn sample(&mut self, ratio: f64) -> f64 {
        let draw = self.draws.get(self.next).copied().unwrap_or(0.0);
        self.next += 1;
        draw.clamp(-ratio.abs(), ratio.abs())
    }
}

pub(crate) fn derive_seed(base_seed: u64, path_index: u32) -> u64 {
    splitmix64(base_seed ^ ((path_index as u64) << 32) ^ path_index as u64)
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
