//! Engine and run configuration.
//!
//! Both types are plain data and (de)serialize with `serde`, so a driver can load them
//! from a file. Operators are runtime objects and are configured on
//! [`Operators`](crate::Operators) instead.
//!
//! ```
//! use holland_evolution::{EngineConfig, RunParams};
//!
//! let config: EngineConfig = serde_json::from_str(
//!     r#"{ "seed": "00000000000000000000000000000003", "backfill": "shrink" }"#,
//! )
//! .unwrap();
//! assert_eq!(config.target_fitness, None);
//!
//! let params: RunParams = serde_json::from_str(
//!     r#"{ "population_size": 10, "genome_length": 10, "max_generations": 50 }"#,
//! )
//! .unwrap();
//! assert!(params.track_average && params.track_max && !params.terminate_early);
//! ```

use std::num::NonZeroUsize;

use holland_core::Seed;
use rand::Rng as _;
use serde::{Deserialize, Serialize};

/// How the fitness of a new population is computed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    #[default]
    Sequential,
    /// Split the population over `threads` scoped worker threads.
    Parallel { threads: NonZeroUsize },
}

/// What happens when crossover leaves fewer offspring than the population size.
///
/// Crossover drops the last genome of an odd-sized breeding pool, and a custom
/// crossover or selection operator may return fewer genomes still.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backfill {
    /// Top the population up with freshly generated candidates.
    #[default]
    Random,
    /// Let the population shrink.
    Shrink,
}

/// Settings owned by an [`Engine`](crate::Engine) across runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seed of the engine's random source. Every run restarts from it.
    pub seed: Seed,
    #[serde(default)]
    pub evaluation: Evaluation,
    #[serde(default)]
    pub backfill: Backfill,
    /// Fitness at which a run with early termination stops.
    ///
    /// Defaults to the genome length, the maximum score of the default fitness
    /// function.
    #[serde(default)]
    pub target_fitness: Option<f64>,
}

impl EngineConfig {
    #[must_use]
    pub fn new(seed: Seed) -> Self {
        Self {
            seed,
            evaluation: Evaluation::default(),
            backfill: Backfill::default(),
            target_fitness: None,
        }
    }
}

impl Default for EngineConfig {
    /// Creates a configuration with a seed drawn from the OS-seeded thread generator.
    fn default() -> Self {
        Self::new(rand::rng().random())
    }
}

/// A configuration value that makes a run impossible.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be positive")]
    ZeroPopulationSize,
    #[display("genome length must be positive")]
    ZeroGenomeLength,
    #[display("target fitness must not be NaN")]
    NanTargetFitness,
    #[display("a population of one cannot breed without backfill")]
    ShrinkingSinglePopulation,
}

/// Parameters of one call to [`Engine::run`](crate::Engine::run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParams {
    pub population_size: usize,
    pub genome_length: usize,
    pub max_generations: usize,
    /// Report the average fitness of each generation to the metrics sink.
    #[serde(default = "default_true")]
    pub track_average: bool,
    /// Report the maximum fitness of each generation to the metrics sink.
    #[serde(default = "default_true")]
    pub track_max: bool,
    /// Stop as soon as the best candidate reaches the target fitness.
    #[serde(default)]
    pub terminate_early: bool,
}

fn default_true() -> bool {
    true
}

impl RunParams {
    /// Creates parameters tracking both metrics, without early termination.
    #[must_use]
    pub fn new(population_size: usize, genome_length: usize, max_generations: usize) -> Self {
        Self {
            population_size,
            genome_length,
            max_generations,
            track_average: true,
            track_max: true,
            terminate_early: false,
        }
    }

    #[must_use]
    pub fn terminate_early(self, terminate_early: bool) -> Self {
        Self {
            terminate_early,
            ..self
        }
    }

    #[must_use]
    pub fn track(self, track_average: bool, track_max: bool) -> Self {
        Self {
            track_average,
            track_max,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::ZeroPopulationSize);
        }
        if self.genome_length == 0 {
            return Err(ConfigError::ZeroGenomeLength);
        }
        Ok(())
    }
}
