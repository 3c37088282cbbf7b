use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Derives independent, reproducible RNG streams from one master seed.
pub struct RngManager {
    seed: u64,
    master: ChaCha8Rng,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            master: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seeds the manager from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(rand::thread_rng().next_u64())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Next stream in the master sequence. The n-th call on managers with
    /// the same seed always yields the same stream.
    pub fn next_stream(&mut self) -> ChaCha8Rng {
        let mut seed_bytes = [0u8; 8];
        self.master.fill_bytes(&mut seed_bytes);
        ChaCha8Rng::seed_from_u64(u64::from_le_bytes(seed_bytes))
    }
}

/// Uniform draws in `[min, max)`, scaled from a unit sample.
pub trait RngExt {
    fn random_f64(&mut self, min: f64, max: f64) -> f64;
}

impl<R: Rng + ?Sized> RngExt for R {
    fn random_f64(&mut self, min: f64, max: f64) -> f64 {
        self.gen::<f64>() * (max - min) + min
    }
}
