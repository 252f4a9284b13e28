//! Random candidate generation.

use holland_core::{Allele, Genome, InvalidLengthError, OFF, ON, WILDCARD};
use rand::{Rng as _, RngCore};

use crate::operators::CandidateGenerator;

/// Draws every allele uniformly from a fixed alphabet.
///
/// The default alphabet is binary (`{0, 1}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformCandidate {
    alphabet: Vec<Allele>,
}

impl Default for UniformCandidate {
    fn default() -> Self {
        Self {
            alphabet: vec![OFF, ON],
        }
    }
}

impl UniformCandidate {
    /// Creates a generator over `alphabet`, or `None` if the alphabet is empty.
    #[must_use]
    pub fn new(alphabet: Vec<Allele>) -> Option<Self> {
        (!alphabet.is_empty()).then_some(Self { alphabet })
    }

    /// The classifier-condition alphabet `{0, 1, #}`.
    #[must_use]
    pub fn ternary() -> Self {
        Self {
            alphabet: vec![OFF, ON, WILDCARD],
        }
    }

    #[must_use]
    pub fn alphabet(&self) -> &[Allele] {
        &self.alphabet
    }
}

impl CandidateGenerator for UniformCandidate {
    fn generate(
        &self,
        length: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Genome, InvalidLengthError> {
        if length == 0 {
            return Err(InvalidLengthError { length });
        }
        Ok((0..length)
            .map(|_| self.alphabet[rng.random_range(0..self.alphabet.len())])
            .collect())
    }
}

/// Appends freshly generated candidates to `genomes` until it holds `size` of them.
pub fn fill_random<G>(
    genomes: &mut Vec<Genome>,
    size: usize,
    length: usize,
    generator: &G,
    rng: &mut dyn RngCore,
) -> Result<(), InvalidLengthError>
where
    G: CandidateGenerator + ?Sized,
{
    genomes.reserve(size.saturating_sub(genomes.len()));
    while genomes.len() < size {
        genomes.push(generator.generate(length, rng)?);
    }
    Ok(())
}
