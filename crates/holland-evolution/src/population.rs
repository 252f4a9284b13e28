//! Evaluated populations and fitness aggregation.

use std::{iter, thread};

use holland_core::{EmptyPopulationError, Genome};

use crate::{config::Evaluation, operators::FitnessFunction};

/// A genome together with its cached fitness score.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    genome: Genome,
    fitness: f64,
}

impl Individual {
    /// Scores `genome` with `fitness` and caches the result.
    pub fn evaluate<F>(genome: Genome, fitness: &F) -> Self
    where
        F: FitnessFunction + ?Sized,
    {
        let fitness = fitness.fitness(&genome);
        Self { genome, fitness }
    }

    #[must_use]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    #[must_use]
    pub fn into_genome(self) -> Genome {
        self.genome
    }

    /// Returns the cached fitness score.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }
}

/// An ordered collection of evaluated individuals.
///
/// A population is never edited in place across generations; the engine builds a new
/// one from the offspring of the previous one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Scores every genome with `fitness`.
    ///
    /// With [`Evaluation::Parallel`] the genomes are split into contiguous chunks scored
    /// on scoped worker threads. Fitness draws no randomness, so the result is the same
    /// as sequential evaluation.
    pub fn evaluate<F>(genomes: Vec<Genome>, fitness: &F, evaluation: Evaluation) -> Self
    where
        F: FitnessFunction + ?Sized,
    {
        let scores: Vec<f64> = match evaluation {
            Evaluation::Sequential => genomes.iter().map(|g| fitness.fitness(g)).collect(),
            Evaluation::Parallel { threads } => {
                let chunk_size = genomes.len().div_ceil(threads.get()).max(1);
                let mut scores = vec![0.0; genomes.len()];
                thread::scope(|s| {
                    for (genomes, scores) in
                        iter::zip(genomes.chunks(chunk_size), scores.chunks_mut(chunk_size))
                    {
                        s.spawn(move || {
                            for (genome, score) in iter::zip(genomes, scores) {
                                *score = fitness.fitness(genome);
                            }
                        });
                    }
                });
                scores
            }
        };
        let individuals = iter::zip(genomes, scores)
            .map(|(genome, fitness)| Individual { genome, fitness })
            .collect::<Vec<_>>();
        Self { individuals }
    }

    #[must_use]
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn genomes(&self) -> impl Iterator<Item = &Genome> + '_ {
        self.individuals.iter().map(Individual::genome)
    }

    #[must_use]
    pub fn into_genomes(self) -> Vec<Genome> {
        self.individuals
            .into_iter()
            .map(Individual::into_genome)
            .collect()
    }

    /// Sum of all cached fitness scores.
    #[must_use]
    pub fn total_fitness(&self) -> f64 {
        self.individuals.iter().map(Individual::fitness).sum()
    }

    /// Mean fitness of the population.
    #[expect(clippy::cast_precision_loss)]
    pub fn average_fitness(&self) -> Result<f64, EmptyPopulationError> {
        if self.individuals.is_empty() {
            return Err(EmptyPopulationError);
        }
        Ok(self.total_fitness() / self.individuals.len() as f64)
    }

    /// Highest fitness in the population.
    pub fn max_fitness(&self) -> Result<f64, EmptyPopulationError> {
        self.best()
            .map(Individual::fitness)
            .ok_or(EmptyPopulationError)
    }

    /// Returns the fittest individual, the earliest one on ties.
    ///
    /// A NaN score ranks below every other score.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.iter().reduce(|best, ind| {
            if is_fitter(ind.fitness, best.fitness) {
                ind
            } else {
                best
            }
        })
    }
}

/// Tests whether `score` strictly beats `other`, ranking NaN below everything.
pub(crate) fn is_fitter(score: f64, other: f64) -> bool {
    score > other || (other.is_nan() && !score.is_nan())
}

/// Mean fitness of `genomes` under `fitness`.
pub fn average_fitness<F>(genomes: &[Genome], fitness: &F) -> Result<f64, EmptyPopulationError>
where
    F: FitnessFunction + ?Sized,
{
    #[expect(clippy::cast_precision_loss)]
    let count = genomes.len() as f64;
    if genomes.is_empty() {
        return Err(EmptyPopulationError);
    }
    Ok(genomes.iter().map(|g| fitness.fitness(g)).sum::<f64>() / count)
}

/// Highest fitness of `genomes` under `fitness`.
pub fn max_fitness<F>(genomes: &[Genome], fitness: &F) -> Result<f64, EmptyPopulationError>
where
    F: FitnessFunction + ?Sized,
{
    genomes
        .iter()
        .map(|g| fitness.fitness(g))
        .reduce(f64::max)
        .ok_or(EmptyPopulationError)
}
