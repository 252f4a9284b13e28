use holland_core::{Allele, Genome, ON};

use crate::operators::FitnessFunction;

/// Scores a genome by how many of its positions hold one allele.
///
/// The default counts [`ON`] alleles, the classic "one-max" problem whose optimum is a
/// genome of all ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlleleCount {
    pub allele: Allele,
}

impl Default for AlleleCount {
    fn default() -> Self {
        Self { allele: ON }
    }
}

impl FitnessFunction for AlleleCount {
    #[expect(clippy::cast_precision_loss)]
    fn fitness(&self, genome: &Genome) -> f64 {
        genome.count(self.allele) as f64
    }
}
