//! Single-point crossover and pairing of the breeding pool.

use holland_core::{Genome, LengthMismatchError};
use rand::{Rng as _, RngCore};

use crate::operators::CrossoverOperator;

/// Single-point crossover.
///
/// A crossover point `c` is drawn uniformly from `[0, len)`; the children are
/// `a[..c] + b[c..]` and `b[..c] + a[c..]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SinglePoint;

/// Swaps the tails of two equal-length parents at `point`.
///
/// # Panics
///
/// Panics if `point` is greater than the parents' length.
///
/// # Examples
///
/// ```
/// use holland_core::Genome;
/// use holland_evolution::crossover;
///
/// let a: Genome = "1000".parse().unwrap();
/// let b: Genome = "0001".parse().unwrap();
/// let (child_a, child_b) = crossover::crossover_at(&a, &b, 3).unwrap();
/// assert_eq!(child_a.to_string(), "1001");
/// assert_eq!(child_b.to_string(), "0000");
/// ```
pub fn crossover_at(
    parent_a: &Genome,
    parent_b: &Genome,
    point: usize,
) -> Result<(Genome, Genome), LengthMismatchError> {
    check_lengths(parent_a, parent_b)?;
    Ok((
        parent_a.splice(parent_b, point),
        parent_b.splice(parent_a, point),
    ))
}

fn check_lengths(parent_a: &Genome, parent_b: &Genome) -> Result<(), LengthMismatchError> {
    if parent_a.len() != parent_b.len() {
        return Err(LengthMismatchError {
            left: parent_a.len(),
            right: parent_b.len(),
        });
    }
    Ok(())
}

impl CrossoverOperator for SinglePoint {
    fn crossover(
        &self,
        parent_a: &Genome,
        parent_b: &Genome,
        rng: &mut dyn RngCore,
    ) -> Result<(Genome, Genome), LengthMismatchError> {
        check_lengths(parent_a, parent_b)?;
        if parent_a.is_empty() {
            return Ok((parent_a.clone(), parent_b.clone()));
        }
        let point = rng.random_range(0..parent_a.len());
        crossover_at(parent_a, parent_b, point)
    }
}

/// Recombines adjacent pairs of the pool (`0&1`, `2&3`, ...).
///
/// An unpaired last genome is dropped, so the result has `pool.len()` rounded down to
/// an even number of genomes.
pub fn recombine<C>(
    pool: &[Genome],
    operator: &C,
    rng: &mut dyn RngCore,
) -> Result<Vec<Genome>, LengthMismatchError>
where
    C: CrossoverOperator + ?Sized,
{
    let mut offspring = Vec::with_capacity(pool.len());
    let pairs = pool.chunks_exact(2);
    if !pairs.remainder().is_empty() {
        log::trace!("dropping unpaired genome from breeding pool of {}", pool.len());
    }
    for pair in pairs {
        let (child_a, child_b) = operator.crossover(&pair[0], &pair[1], rng)?;
        offspring.push(child_a);
        offspring.push(child_b);
    }
    Ok(offspring)
}

#[cfg(test)]
mod tests {
    use holland_core::{ON, Seed};

    use super::*;

    fn genome(s: &str) -> Genome {
        s.parse().unwrap()
    }

    #[test]
    fn test_crossover_at_point_three() {
        let (a, b) = crossover_at(&genome("1000"), &genome("0001"), 3).unwrap();
        let children = [a, b];
        let found = children.iter().find(|c| c.to_string() == "1001").unwrap();
        assert_eq!(found.count(ON), 2);
    }

    #[test]
    fn test_children_keep_parent_length() {
        let mut rng = Seed::from(17).rng();
        let a = genome("1111100000");
        let b = genome("0101010101");
        for _ in 0..100 {
            let (child_a, child_b) = SinglePoint.crossover(&a, &b, &mut rng).unwrap();
            assert_eq!(child_a.len(), a.len());
            assert_eq!(child_b.len(), a.len());
        }
    }

    #[test]
    fn test_children_swap_tails() {
        let mut rng = Seed::from(2).rng();
        let a = genome("11111111");
        let b = genome("00000000");
        for _ in 0..50 {
            let (child_a, child_b) = SinglePoint.crossover(&a, &b, &mut rng).unwrap();
            // every allele comes from exactly one parent at each position
            assert_eq!(child_a.count(ON) + child_b.count(ON), 8);
            let point = child_a.count(ON);
            assert_eq!(child_a, a.splice(&b, point));
            assert_eq!(child_b, b.splice(&a, point));
        }
    }

    #[test]
    fn test_length_mismatch() {
        let mut rng = Seed::from(0).rng();
        let err = SinglePoint
            .crossover(&genome("101"), &genome("10"), &mut rng)
            .unwrap_err();
        assert_eq!(err, LengthMismatchError { left: 3, right: 2 });
        assert!(crossover_at(&genome("1"), &genome("10"), 0).is_err());
    }

    #[test]
    fn test_empty_parents() {
        let mut rng = Seed::from(0).rng();
        let (a, b) = SinglePoint
            .crossover(&Genome::default(), &Genome::default(), &mut rng)
            .unwrap();
        assert!(a.is_empty() && b.is_empty());
    }

    #[test]
    fn test_recombine_drops_unpaired_genome() {
        let mut rng = Seed::from(4).rng();
        let pool = ["1100", "0011", "1111", "0000", "1010"].map(genome);
        let offspring = recombine(&pool, &SinglePoint, &mut rng).unwrap();
        assert_eq!(offspring.len(), 4);
    }

    #[test]
    fn test_recombine_pairs_adjacent_genomes() {
        let mut rng = Seed::from(4).rng();
        // identical pairs produce copies of themselves
        let pool = ["1111", "1111", "0000", "0000"].map(genome);
        let offspring = recombine(&pool, &SinglePoint, &mut rng).unwrap();
        assert_eq!(offspring, pool);
    }
}
