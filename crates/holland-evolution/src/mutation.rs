//! Per-allele point mutation.
//!
//! Every position of every offspring is an independent trial: a value is drawn from
//! `[0, n)` and the allele is toggled when the draw hits the trigger value, i.e. with
//! probability `1/n`. How an allele is toggled depends on the encoding:
//!
//! - [`binary_toggle`] flips `0 <-> 1` (default)
//! - [`ternary_toggle`] cycles `0 -> 1 -> # -> 0` for classifier-rule genomes
//!
//! Any other `fn(Allele) -> Allele` can be supplied with [`PointMutation::with_toggle`].

use std::num::NonZeroU32;

use holland_core::{Allele, Genome, OFF, ON, WILDCARD};
use rand::{Rng as _, RngCore};

use crate::operators::MutationOperator;

/// Maps an allele to its mutated value.
pub type Toggle = fn(Allele) -> Allele;

/// Draw value that triggers a mutation.
const TRIGGER: u32 = 1;

/// Flips a binary allele. Anything that is not [`ON`] becomes [`ON`].
#[must_use]
pub fn binary_toggle(allele: Allele) -> Allele {
    if allele == ON { OFF } else { ON }
}

/// Cycles through the ternary classifier alphabet `0 -> 1 -> # -> 0`.
#[must_use]
pub fn ternary_toggle(allele: Allele) -> Allele {
    match allele {
        OFF => ON,
        ON => WILDCARD,
        _ => OFF,
    }
}

/// Toggles each allele independently with probability `1 / chance_denominator`.
///
/// A denominator of 1 never mutates, since every draw from `[0, 1)` is 0.
#[derive(Debug, Clone, Copy)]
pub struct PointMutation {
    chance_denominator: NonZeroU32,
    toggle: Toggle,
}

impl Default for PointMutation {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CHANCE_DENOMINATOR)
    }
}

impl PointMutation {
    pub const DEFAULT_CHANCE_DENOMINATOR: NonZeroU32 = NonZeroU32::new(10).unwrap();

    #[must_use]
    pub fn new(chance_denominator: NonZeroU32) -> Self {
        Self {
            chance_denominator,
            toggle: binary_toggle,
        }
    }

    #[must_use]
    pub fn with_toggle(self, toggle: Toggle) -> Self {
        Self { toggle, ..self }
    }

    #[must_use]
    pub fn chance_denominator(&self) -> NonZeroU32 {
        self.chance_denominator
    }
}

impl MutationOperator for PointMutation {
    fn mutate(&self, genome: &Genome, rng: &mut dyn RngCore) -> Genome {
        genome
            .alleles()
            .iter()
            .map(|&allele| {
                if rng.random_range(0..self.chance_denominator.get()) == TRIGGER {
                    (self.toggle)(allele)
                } else {
                    allele
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use holland_core::Seed;

    use super::*;

    fn denominator(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_length_is_preserved() {
        let genome: Genome = "1010110010".parse().unwrap();
        let mut rng = Seed::from(8).rng();
        for n in 2..20 {
            let mutant = PointMutation::new(denominator(n)).mutate(&genome, &mut rng);
            assert_eq!(mutant.len(), genome.len());
        }
    }

    #[test]
    fn test_original_is_untouched() {
        let genome = Genome::new(vec![OFF; 64]);
        let mut rng = Seed::from(8).rng();
        let mutant = PointMutation::new(denominator(2)).mutate(&genome, &mut rng);
        assert_eq!(genome.count(OFF), 64);
        assert_ne!(mutant, genome);
    }

    #[test]
    fn test_denominator_one_never_mutates() {
        let genome: Genome = "1100".parse().unwrap();
        let mut rng = Seed::from(1).rng();
        for _ in 0..50 {
            assert_eq!(
                PointMutation::new(denominator(1)).mutate(&genome, &mut rng),
                genome
            );
        }
    }

    #[test]
    fn test_rate_is_about_one_in_n() {
        let genome = Genome::new(vec![OFF; 10_000]);
        let mut rng = Seed::from(12).rng();
        let mutant = PointMutation::new(denominator(4)).mutate(&genome, &mut rng);
        let flipped = mutant.count(ON);
        assert!((2300..2700).contains(&flipped), "{flipped}");
    }

    #[test]
    fn test_toggles() {
        assert_eq!(binary_toggle(OFF), ON);
        assert_eq!(binary_toggle(ON), OFF);
        assert_eq!(ternary_toggle(OFF), ON);
        assert_eq!(ternary_toggle(ON), WILDCARD);
        assert_eq!(ternary_toggle(WILDCARD), OFF);
    }

    #[test]
    fn test_custom_toggle() {
        let genome = Genome::new(vec![ON; 1000]);
        let mut rng = Seed::from(6).rng();
        let mutation = PointMutation::new(denominator(2)).with_toggle(ternary_toggle);
        let mutant = mutation.mutate(&genome, &mut rng);
        assert!(mutant.alleles().iter().all(|&a| a == ON || a == WILDCARD));
        assert!(mutant.count(WILDCARD) > 0);
    }
}
