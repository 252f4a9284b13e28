//! Core data model for the Holland evolutionary engine.
//!
//! This crate holds the value types that every other part of the system is built on:
//!
//! - [`Genome`] - A fixed-length sequence of [`Allele`]s, the unit of evolution
//! - [`Rule`], [`RuleLayout`], [`RuleBase`] - Classifier rules and their flat encoding
//! - [`Seed`] - Seed for the deterministic random source owned by an engine
//!
//! together with the typed failures reported by the genetic operators.
//!
//! Nothing in this crate draws randomness on its own. Stochastic behavior lives in
//! `holland-evolution`, which threads an explicitly seeded generator through every call.
//!
//! # Example
//!
//! ```
//! use holland_core::{Genome, RuleBase, RuleLayout};
//!
//! let genome: Genome = "1#01#10".parse().unwrap();
//! let layout = RuleLayout::new(2, 1).unwrap();
//!
//! let rules = RuleBase::decode(&genome.alleles()[..6], layout).unwrap();
//! assert_eq!(rules.len(), 2);
//! assert_eq!(rules.encode().as_slice(), &genome.alleles()[..6]);
//! ```

pub use self::{genome::*, rule::*, seed::*};

pub mod genome;
pub mod rule;
pub mod seed;

/// Two sequences that must share a length do not.
///
/// Reported by crossover (parents of different length) and by rule matching
/// (conditions of different length).
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("sequence lengths differ: {left} != {right}")]
pub struct LengthMismatchError {
    pub left: usize,
    pub right: usize,
}

/// A candidate was requested with a length that cannot hold any allele.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("candidate length must be positive, got {length}")]
pub struct InvalidLengthError {
    pub length: usize,
}

/// Fitness was aggregated over a population with no members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("population is empty")]
pub struct EmptyPopulationError;

/// Fitness-proportionate selection was attempted with no positive total weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("total fitness of the population is zero")]
pub struct ZeroFitnessError;

/// A flat rule sequence does not divide into whole rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("sequence of length {length} is not a multiple of rule length {rule_length}")]
pub struct MalformedSequenceError {
    pub length: usize,
    pub rule_length: usize,
}
