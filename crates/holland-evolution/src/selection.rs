//! Selection operators building a breeding pool from an evaluated population.
//!
//! # Tournament Selection
//!
//! For each slot of the pool, two individuals are drawn uniformly with replacement and
//! the fitter one wins. On a tie the second-drawn individual wins. The pool may contain
//! duplicates.
//!
//! # Roulette-Wheel Selection
//!
//! Fitness-proportionate selection. A value is drawn uniformly from
//! `[0, total_fitness)` and each individual's fitness is subtracted from it in
//! population order; the individual that brings the remainder to zero or below is
//! selected. Fitness must be non-negative and the total must be positive and finite.

use holland_core::{EmptyPopulationError, Genome, ZeroFitnessError};
use rand::{Rng as _, RngCore};

use crate::{
    operators::SelectionOperator,
    population::{Individual, Population, is_fitter},
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum SelectionError {
    #[display("{_0}")]
    EmptyPopulation(EmptyPopulationError),
    #[display("{_0}")]
    ZeroFitness(ZeroFitnessError),
}

/// Binary tournament selection.
#[derive(Debug, Default, Clone, Copy)]
pub struct Tournament;

impl Tournament {
    /// Runs one tournament and returns its winner.
    pub fn select_one<'a>(
        &self,
        population: &'a Population,
        rng: &mut dyn RngCore,
    ) -> Result<&'a Individual, EmptyPopulationError> {
        let individuals = population.individuals();
        if individuals.is_empty() {
            return Err(EmptyPopulationError);
        }
        let first = &individuals[rng.random_range(0..individuals.len())];
        let second = &individuals[rng.random_range(0..individuals.len())];
        if is_fitter(first.fitness(), second.fitness()) {
            Ok(first)
        } else {
            Ok(second)
        }
    }
}

impl SelectionOperator for Tournament {
    fn select(
        &self,
        population: &Population,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Genome>, SelectionError> {
        if population.is_empty() {
            return Err(EmptyPopulationError.into());
        }
        (0..population.len())
            .map(|_| {
                self.select_one(population, rng)
                    .map(|winner| winner.genome().clone())
                    .map_err(SelectionError::from)
            })
            .collect()
    }
}

/// Fitness-proportionate (roulette-wheel) selection.
///
/// As a [`SelectionOperator`] it fills a pool as large as the population; use
/// [`RouletteWheel::select_parents`] for a different number of parents.
#[derive(Debug, Default, Clone, Copy)]
pub struct RouletteWheel;

impl RouletteWheel {
    /// Returns the total selection weight of `population`.
    ///
    /// Fails if the population is empty or its weight is not a positive finite number.
    pub fn total_weight(population: &Population) -> Result<f64, SelectionError> {
        if population.is_empty() {
            return Err(EmptyPopulationError.into());
        }
        let total = population.total_fitness();
        if !total.is_finite() || total <= 0.0 {
            return Err(ZeroFitnessError.into());
        }
        Ok(total)
    }

    /// Spins the wheel once over a population of known positive `total_weight`.
    fn spin<'a>(
        population: &'a Population,
        total_weight: f64,
        rng: &mut dyn RngCore,
    ) -> &'a Individual {
        let individuals = population.individuals();
        let mut remainder = rng.random_range(0.0..total_weight);
        for individual in individuals {
            remainder -= individual.fitness();
            if remainder <= 0.0 {
                return individual;
            }
        }
        // rounding left a positive remainder
        &individuals[individuals.len() - 1]
    }

    /// Selects one individual.
    pub fn select_one<'a>(
        &self,
        population: &'a Population,
        rng: &mut dyn RngCore,
    ) -> Result<&'a Individual, SelectionError> {
        let total = Self::total_weight(population)?;
        Ok(Self::spin(population, total, rng))
    }

    /// Selects `count` parents, independently and with replacement.
    ///
    /// The total weight is summed once before the first draw.
    pub fn select_parents(
        &self,
        population: &Population,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Genome>, SelectionError> {
        let total = Self::total_weight(population)?;
        Ok((0..count)
            .map(|_| Self::spin(population, total, rng).genome().clone())
            .collect())
    }
}

impl SelectionOperator for RouletteWheel {
    fn select(
        &self,
        population: &Population,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Genome>, SelectionError> {
        self.select_parents(population, population.len(), rng)
    }
}

#[cfg(test)]
mod tests {
    use holland_core::Seed;
    use rand::Rng as _;

    use crate::{config::Evaluation, fitness::AlleleCount};

    use super::*;

    fn population(list: &[&str]) -> Population {
        let genomes = list.iter().map(|s| s.parse().unwrap()).collect();
        Population::evaluate(genomes, &AlleleCount::default(), Evaluation::Sequential)
    }

    #[test]
    fn test_tournament_preserves_size() {
        let population = population(&["1111", "0111", "0011", "0001", "0000"]);
        let mut rng = Seed::from(7).rng();
        for _ in 0..20 {
            let pool = Tournament.select(&population, &mut rng).unwrap();
            assert_eq!(pool.len(), population.len());
        }
    }

    #[test]
    fn test_tournament_does_not_lower_average() {
        let population = population(&["1111", "0111", "0011", "0001"]);
        let fitness = AlleleCount::default();
        let mut rng = Seed::from(3).rng();
        let mut before = 0.0;
        let mut after = 0.0;
        for _ in 0..200 {
            let pool = Tournament.select(&population, &mut rng).unwrap();
            before += population.average_fitness().unwrap();
            after += crate::population::average_fitness(&pool, &fitness).unwrap();
        }
        assert!(after >= before, "{after} < {before}");
    }

    #[test]
    fn test_tournament_never_picks_strictly_lower() {
        // With two individuals, a winner of fitness 0 implies both draws were the
        // zero-fitness individual.
        let population = population(&["0000", "1111"]);
        let mut rng = Seed::from(11).rng();
        let mut zero_wins = 0;
        for _ in 0..1000 {
            let winner = Tournament.select_one(&population, &mut rng).unwrap();
            if winner.fitness() == 0.0 {
                zero_wins += 1;
            }
        }
        // expected about 250 (1/4 of the tournaments)
        assert!((150..350).contains(&zero_wins), "{zero_wins}");
    }

    #[test]
    fn test_tournament_tie_keeps_equal_fitness() {
        let population = population(&["1100", "0011", "1010"]);
        let mut rng = Seed::from(5).rng();
        let pool = Tournament.select(&population, &mut rng).unwrap();
        assert!(pool.iter().all(|g| g.count(holland_core::ON) == 2));
    }

    #[test]
    fn test_tournament_tie_picks_second_draw() {
        let population = population(&["1100", "0011", "1010", "0101"]);
        for seed in 0..50 {
            let mut rng = Seed::from(seed).rng();
            let mut replay = rng.clone();
            let _first = replay.random_range(0..population.len());
            let second = replay.random_range(0..population.len());

            let winner = Tournament.select_one(&population, &mut rng).unwrap();
            assert!(
                std::ptr::eq(winner, &population.individuals()[second]),
                "seed {seed}"
            );
        }
    }

    #[test]
    fn test_tournament_nan_loses_to_any_score() {
        let population = Population::from_individuals(vec![
            Individual::evaluate("0".parse().unwrap(), &|_: &Genome| f64::NAN),
            Individual::evaluate("1".parse().unwrap(), &|_: &Genome| 0.5),
        ]);
        for seed in 0..50 {
            let mut rng = Seed::from(seed).rng();
            let mut replay = rng.clone();
            let first = replay.random_range(0..population.len());
            let second = replay.random_range(0..population.len());

            let winner = Tournament.select_one(&population, &mut rng).unwrap();
            if first == 0 && second == 0 {
                assert!(winner.fitness().is_nan());
            } else {
                assert_eq!(winner.fitness(), 0.5, "seed {seed}");
            }
        }
    }

    #[test]
    fn test_tournament_empty_population() {
        let mut rng = Seed::from(0).rng();
        assert_eq!(
            Tournament.select(&Population::default(), &mut rng),
            Err(SelectionError::EmptyPopulation(EmptyPopulationError))
        );
    }

    #[test]
    fn test_roulette_zero_fitness() {
        let population = population(&["0000", "0000", "0000"]);
        let mut rng = Seed::from(0).rng();
        assert_eq!(
            RouletteWheel.select(&population, &mut rng),
            Err(SelectionError::ZeroFitness(ZeroFitnessError))
        );
    }

    #[test]
    fn test_roulette_empty_population() {
        let mut rng = Seed::from(0).rng();
        assert_eq!(
            RouletteWheel.select_parents(&Population::default(), 2, &mut rng),
            Err(SelectionError::EmptyPopulation(EmptyPopulationError))
        );
    }

    #[test]
    fn test_roulette_never_picks_zero_weight() {
        let population = population(&["0000", "0110", "0000", "1111"]);
        let mut rng = Seed::from(9).rng();
        let parents = RouletteWheel.select_parents(&population, 500, &mut rng).unwrap();
        assert_eq!(parents.len(), 500);
        assert!(parents.iter().all(|g| g.count(holland_core::ON) > 0));
    }

    #[test]
    fn test_roulette_is_fitness_proportionate() {
        // weights 1 and 3
        let population = population(&["1000", "1110"]);
        let mut rng = Seed::from(21).rng();
        let parents = RouletteWheel.select_parents(&population, 4000, &mut rng).unwrap();
        let heavy = parents.iter().filter(|g| g.count(holland_core::ON) == 3).count();
        assert!((2800..3200).contains(&heavy), "{heavy}");
    }

    #[test]
    fn test_roulette_selector_preserves_size() {
        let population = population(&["1000", "1110", "0101"]);
        let mut rng = Seed::from(1).rng();
        let pool = RouletteWheel.select(&population, &mut rng).unwrap();
        assert_eq!(pool.len(), 3);
    }
}
