use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::rules::dice::{DieSpec, RollMode, RollOutcome};

#[derive(Debug, Clone)]
pub struct Roller {
    rng: StdRng,
}

impl Roller {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let rng = StdRng::from_os_rng();
        Roller { rng }
    }

    pub fn from_seed(seed: u64) -> Self {
        let rng = StdRng::seed_from_u64(seed);
        Roller { rng }
    }

    /// Uniform draw in `[1, sides]`.
    pub fn roll_once(&mut self, die: DieSpec) -> u32 {
        self.rng.random_range(1..=die.sides())
    }

    pub fn roll_with_mode(&mut self, die: DieSpec, mode: RollMode) -> RollOutcome {
        let first = self.roll_once(die);
        if !mode.is_dual() {
            return RollOutcome::single(first);
        }
        let second = self.roll_once(die);
        RollOutcome::resolve(mode, first, second)
    }

    #[cfg(test)]
    pub fn test_rng() -> Self {
        Self::from_seed(42)
    }
}
