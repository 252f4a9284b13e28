//! The generational loop.
//!
//! A run moves the engine through
//!
//! ```text
//! Uninitialized -> Populated -> (select -> recombine -> mutate -> evaluate)* -> Terminated
//! ```
//!
//! Each generation is built from scratch out of the previous one and only replaces it
//! once it has been evaluated and reported to the metrics sink. If any stage fails, the
//! run stops with an error and the engine keeps the last completed population, the best
//! candidate so far and the number of completed generations.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use holland_core::{EmptyPopulationError, Genome, InvalidLengthError, LengthMismatchError, Seed};
use rand_pcg::Pcg32;

use crate::{
    candidate,
    config::{Backfill, ConfigError, EngineConfig, RunParams},
    crossover,
    metrics::{GenerationRecord, MetricsSink, NullSink},
    operators::Operators,
    population::{Individual, Population, is_fitter},
    selection::SelectionError,
};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EvolutionError {
    #[display("invalid configuration: {_0}")]
    Config(ConfigError),
    #[display("candidate generation failed: {_0}")]
    Candidate(InvalidLengthError),
    #[display("selection failed: {_0}")]
    Selection(SelectionError),
    #[display("crossover failed: {_0}")]
    Crossover(LengthMismatchError),
    #[display("{_0}")]
    EmptyPopulation(EmptyPopulationError),
    #[display("failed to record metrics: {_0}")]
    Metrics(io::Error),
}

/// Shared flag for stopping a run from another thread.
///
/// The engine checks it once per generation boundary. Cancelling does not clear
/// itself; call [`CancelToken::reset`] before reusing the engine.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum StopReason {
    #[display("maximum generations reached")]
    MaxGenerations,
    #[display("target fitness reached")]
    TargetReached,
    #[display("cancelled")]
    Cancelled,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum EngineState {
    /// No run has produced a population yet.
    #[default]
    Uninitialized,
    /// A run is in progress, or stopped with an error after populating.
    Populated,
    /// The last run finished normally.
    Terminated,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionOutcome {
    /// The final population.
    pub population: Population,
    /// The fittest individual seen during the run, including the initial population.
    pub best: Individual,
    /// Number of generations completed.
    pub generations: usize,
    pub stop_reason: StopReason,
}

/// A genetic-algorithm engine.
///
/// The engine owns its configuration, its operator registry and its random source.
/// Engines share nothing, so several can run side by side.
///
/// ```
/// use holland_core::Seed;
/// use holland_evolution::{Engine, EngineConfig, RunParams};
///
/// let mut engine = Engine::new(EngineConfig::new(Seed::from(7)));
/// let outcome = engine.run(&RunParams::new(20, 16, 30)).unwrap();
/// assert_eq!(outcome.generations, 30);
/// assert_eq!(outcome.population.len(), 20);
/// assert!(outcome.best.fitness() <= 16.0);
/// ```
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    operators: Operators,
    rng: Pcg32,
    state: EngineState,
    population: Population,
    best: Option<Individual>,
    generation: usize,
    cancel: CancelToken,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// Creates an engine with the default operators.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_operators(config, Operators::default())
    }

    #[must_use]
    pub fn with_operators(config: EngineConfig, operators: Operators) -> Self {
        Self {
            rng: config.seed.rng(),
            config,
            operators,
            state: EngineState::Uninitialized,
            population: Population::default(),
            best: None,
            generation: 0,
            cancel: CancelToken::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn operators(&self) -> &Operators {
        &self.operators
    }

    /// Gives access to the registry for replacing operators between runs.
    pub fn operators_mut(&mut self) -> &mut Operators {
        &mut self.operators
    }

    /// Replaces the seed used by subsequent runs.
    pub fn set_seed(&mut self, seed: Seed) {
        self.config.seed = seed;
    }

    /// Returns a handle that cancels this engine's runs.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The last completed population.
    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn best_candidate(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    /// Number of generations completed by the current or last run.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Runs the algorithm without recording metrics.
    pub fn run(&mut self, params: &RunParams) -> Result<EvolutionOutcome, EvolutionError> {
        self.run_with_sink(params, &mut NullSink)
    }

    /// Runs the algorithm, reporting every completed generation to `sink`.
    ///
    /// The random source is reseeded from the configured seed first, so the same
    /// engine, parameters and operators always produce the same run.
    pub fn run_with_sink(
        &mut self,
        params: &RunParams,
        sink: &mut dyn MetricsSink,
    ) -> Result<EvolutionOutcome, EvolutionError> {
        let target = self.target_fitness(params)?;

        self.rng = self.config.seed.rng();
        self.state = EngineState::Uninitialized;
        self.population = Population::default();
        self.best = None;
        self.generation = 0;

        log::info!(
            "starting run: seed={}, population={}, genome length={}, generations={}",
            self.config.seed,
            params.population_size,
            params.genome_length,
            params.max_generations,
        );

        let mut genomes = Vec::with_capacity(params.population_size);
        candidate::fill_random(
            &mut genomes,
            params.population_size,
            params.genome_length,
            self.operators.candidate_generator(),
            &mut self.rng,
        )?;
        self.population = self.evaluate(genomes);
        self.best = self.population.best().cloned();
        self.state = EngineState::Populated;

        let stop_reason = loop {
            if let Some(reason) = self.should_stop(params, target) {
                break reason;
            }
            self.step(params, sink)?;
        };

        self.state = EngineState::Terminated;
        let best = self.best.clone().ok_or(EmptyPopulationError)?;
        log::info!(
            "run finished after {} generations ({stop_reason}): best fitness {}",
            self.generation,
            best.fitness(),
        );
        Ok(EvolutionOutcome {
            population: self.population.clone(),
            best,
            generations: self.generation,
            stop_reason,
        })
    }

    fn target_fitness(&self, params: &RunParams) -> Result<f64, ConfigError> {
        params.validate()?;
        // pairing a single parent leaves no offspring
        if self.config.backfill == Backfill::Shrink && params.population_size < 2 {
            return Err(ConfigError::ShrinkingSinglePopulation);
        }
        match self.config.target_fitness {
            Some(target) if target.is_nan() => Err(ConfigError::NanTargetFitness),
            Some(target) => Ok(target),
            None => {
                #[expect(clippy::cast_precision_loss)]
                let length = params.genome_length as f64;
                Ok(length)
            }
        }
    }

    fn should_stop(&self, params: &RunParams, target: f64) -> Option<StopReason> {
        if params.terminate_early
            && let Some(best) = &self.best
            && best.fitness() >= target
        {
            return Some(StopReason::TargetReached);
        }
        if self.generation >= params.max_generations {
            return Some(StopReason::MaxGenerations);
        }
        if self.cancel.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        None
    }

    fn evaluate(&self, genomes: Vec<Genome>) -> Population {
        Population::evaluate(
            genomes,
            self.operators.fitness_function(),
            self.config.evaluation,
        )
    }

    /// Builds, evaluates and reports the next generation, then commits it.
    fn step(
        &mut self,
        params: &RunParams,
        sink: &mut dyn MetricsSink,
    ) -> Result<(), EvolutionError> {
        let generation = self.generation + 1;

        let mut pool = self.operators.select(&self.population, &mut self.rng)?;
        if pool.len() > params.population_size {
            pool.truncate(params.population_size);
        }
        log::trace!("generation {generation}: breeding pool of {}", pool.len());

        let offspring =
            crossover::recombine(&pool, self.operators.crossover_operator(), &mut self.rng)?;
        let mut genomes = offspring
            .iter()
            .map(|genome| self.operators.mutate(genome, &mut self.rng))
            .collect::<Vec<_>>();
        genomes.truncate(params.population_size);

        let missing = params.population_size - genomes.len();
        if missing > 0 {
            match self.config.backfill {
                Backfill::Random => {
                    log::debug!("generation {generation}: backfilling {missing} random candidates");
                    candidate::fill_random(
                        &mut genomes,
                        params.population_size,
                        params.genome_length,
                        self.operators.candidate_generator(),
                        &mut self.rng,
                    )?;
                }
                Backfill::Shrink => {
                    log::warn!(
                        "generation {generation}: population shrinks by {missing} to {}",
                        genomes.len(),
                    );
                }
            }
        }

        let population = self.evaluate(genomes);
        let average = population.average_fitness()?;
        let max = population.max_fitness()?;

        let mut best = self.best.clone();
        if let Some(candidate) = population.best()
            && best
                .as_ref()
                .is_none_or(|b| is_fitter(candidate.fitness(), b.fitness()))
        {
            best = Some(candidate.clone());
        }
        log::debug!(
            "generation {generation}: average={average:.3}, max={max}, best={}",
            best.as_ref().map_or(f64::NAN, Individual::fitness),
        );

        sink.record(&GenerationRecord {
            generation,
            average_fitness: params.track_average.then_some(average),
            max_fitness: params.track_max.then_some(max),
        })?;

        self.population = population;
        self.best = best;
        self.generation = generation;
        Ok(())
    }
}
