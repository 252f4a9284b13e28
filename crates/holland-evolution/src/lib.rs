//! Genetic-algorithm engine over `holland-core` genomes.
//!
//! The engine runs a plain generational loop:
//!
//! 1. **Populate** - Fill the population with random candidates
//! 2. **Select** - Build a breeding pool as large as the population ([`Tournament`] by
//!    default)
//! 3. **Recombine** - Cross adjacent pairs of the pool ([`SinglePoint`] by default)
//! 4. **Mutate** - Perturb every offspring independently ([`PointMutation`] by default)
//! 5. **Evaluate** - Score the offspring, which become the next population
//! 6. **Record** - Report average and max fitness to a [`MetricsSink`]
//!
//! until a generation limit, a target fitness or a cancellation request stops it.
//!
//! # Architecture
//!
//! ```text
//! EngineConfig + RunParams
//!     ↓ configure
//! Engine ── owns ──> Operators (fitness, selection, crossover, mutation,
//!     │                         candidates, rule match/encode/decode)
//!     │ ── owns ──> Pcg32 seeded from EngineConfig::seed
//!     ↓ produces
//! Population per generation ──> MetricsSink
//!     ↓ returns
//! EvolutionOutcome (final population, best candidate, generations, stop reason)
//! ```
//!
//! Every stochastic operator draws from the engine's generator, so a seed and an
//! operator set fully determine a run.
//!
//! # Example
//!
//! ```
//! use holland_core::Seed;
//! use holland_evolution::{CsvMetricsWriter, Engine, EngineConfig, RunParams};
//!
//! let mut engine = Engine::new(EngineConfig::new(Seed::from(42)));
//! let mut csv = CsvMetricsWriter::new(Vec::new()).unwrap();
//! let outcome = engine
//!     .run_with_sink(&RunParams::new(10, 10, 50), &mut csv)
//!     .unwrap();
//!
//! let csv = String::from_utf8(csv.into_inner().unwrap()).unwrap();
//! assert_eq!(csv.lines().count(), 1 + outcome.generations);
//! println!("best: {} ({})", outcome.best.genome(), outcome.best.fitness());
//! ```

pub use self::{
    config::{Backfill, ConfigError, EngineConfig, Evaluation, RunParams},
    engine::{CancelToken, Engine, EngineState, EvolutionError, EvolutionOutcome, StopReason},
    metrics::{CsvMetricsWriter, GenerationRecord, MetricsSink, NullSink},
    operators::{
        CandidateGenerator, CrossoverOperator, FitnessFunction, MutationOperator, Operators,
        RuleDecoder, RuleEncoder, RuleMatcher, SelectionOperator, WildcardRuleCodec,
    },
    population::{Individual, Population},
};
pub use self::{
    candidate::UniformCandidate,
    crossover::SinglePoint,
    fitness::AlleleCount,
    mutation::PointMutation,
    selection::{RouletteWheel, SelectionError, Tournament},
};

pub mod candidate;
pub mod config;
pub mod crossover;
pub mod engine;
pub mod fitness;
pub mod metrics;
pub mod mutation;
pub mod operators;
pub mod population;
pub mod selection;
