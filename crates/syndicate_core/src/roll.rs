//! Uniform draws for the probabilistic checks.
//!
//! The engine never touches an RNG directly; it asks a [`Roller`] for a
//! number in `[0, 100)` and compares it against an exposed chance.

use rand::Rng;

pub trait Roller {
    /// Uniform draw in `[0, 100)`.
    fn roll(&mut self) -> f64;
}

impl<R: Rng + ?Sized> Roller for R {
    fn roll(&mut self) -> f64 {
        self.gen::<f64>() * 100.0
    }
}

/// A check passes iff the draw lands strictly below the chance.
/// Chances outside `[0, 100]` are not clamped: a negative chance never passes.
pub fn passes(roll: f64, chance: f64) -> bool {
    roll < chance
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn rng_rolls_stay_in_percent_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..1_000 {
            let r = rng.roll();
            assert!((0.0..100.0).contains(&r), "roll out of range: {r}");
        }
    }

    #[test]
    fn negative_chance_never_passes() {
        assert!(!passes(0.0, -5.0));
        assert!(passes(0.0, 0.5));
        assert!(!passes(50.0, 50.0));
    }
}
