//! Operator roles and the registry holding the active implementation of each.
//!
//! Every stage of the generational loop is a trait, so the same engine can optimize any
//! problem and can be driven by deterministic stubs in tests:
//!
//! | Role                 | Trait                  | Default                         |
//! |----------------------|------------------------|---------------------------------|
//! | Fitness              | [`FitnessFunction`]    | [`AlleleCount`] (count of `1`s) |
//! | Selection            | [`SelectionOperator`]  | [`Tournament`]                  |
//! | Crossover            | [`CrossoverOperator`]  | [`SinglePoint`]                 |
//! | Mutation             | [`MutationOperator`]   | [`PointMutation`]               |
//! | Candidate generation | [`CandidateGenerator`] | [`UniformCandidate`] (binary)   |
//! | Rule matching        | [`RuleMatcher`]        | [`WildcardRuleCodec`]           |
//! | Rule encoding        | [`RuleEncoder`]        | [`WildcardRuleCodec`]           |
//! | Rule decoding        | [`RuleDecoder`]        | [`WildcardRuleCodec`]           |
//!
//! Each trait is implemented for plain closures with the matching signature, so an
//! operator can be swapped without declaring a type:
//!
//! ```
//! use holland_core::{Genome, OFF};
//! use holland_evolution::Operators;
//!
//! let mut operators = Operators::default();
//! operators.set_fitness(|genome: &Genome| genome.count(OFF) as f64);
//!
//! assert_eq!(operators.fitness(&"0001".parse().unwrap()), 3.0);
//! ```
//!
//! Randomized operators receive the engine's generator as `&mut dyn RngCore`; they must
//! not keep or reseed it.

use std::fmt;

use holland_core::{
    Allele, Genome, InvalidLengthError, LengthMismatchError, Rule, RuleBase,
    rule::{self, DecodeRulesError},
};
use rand::RngCore;

use crate::{
    candidate::UniformCandidate,
    crossover::SinglePoint,
    fitness::AlleleCount,
    mutation::PointMutation,
    population::Population,
    selection::{SelectionError, Tournament},
};

/// Scores a genome. Higher is fitter.
///
/// Implementations must be pure functions of the genome's alleles; populations cache
/// the score and fitness may be evaluated on several threads at once.
pub trait FitnessFunction: Send + Sync {
    fn fitness(&self, genome: &Genome) -> f64;
}

impl<F> FitnessFunction for F
where
    F: Fn(&Genome) -> f64 + Send + Sync,
{
    fn fitness(&self, genome: &Genome) -> f64 {
        self(genome)
    }
}

/// Builds a breeding pool from an evaluated population.
///
/// The pool is expected to have as many genomes as the population.
pub trait SelectionOperator: Send + Sync {
    fn select(
        &self,
        population: &Population,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Genome>, SelectionError>;
}

impl<F> SelectionOperator for F
where
    F: Fn(&Population, &mut dyn RngCore) -> Result<Vec<Genome>, SelectionError> + Send + Sync,
{
    fn select(
        &self,
        population: &Population,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Genome>, SelectionError> {
        self(population, rng)
    }
}

/// Recombines two parents into two children.
pub trait CrossoverOperator: Send + Sync {
    fn crossover(
        &self,
        parent_a: &Genome,
        parent_b: &Genome,
        rng: &mut dyn RngCore,
    ) -> Result<(Genome, Genome), LengthMismatchError>;
}

impl<F> CrossoverOperator for F
where
    F: Fn(&Genome, &Genome, &mut dyn RngCore) -> Result<(Genome, Genome), LengthMismatchError>
        + Send
        + Sync,
{
    fn crossover(
        &self,
        parent_a: &Genome,
        parent_b: &Genome,
        rng: &mut dyn RngCore,
    ) -> Result<(Genome, Genome), LengthMismatchError> {
        self(parent_a, parent_b, rng)
    }
}

/// Produces a perturbed copy of a genome of the same length.
pub trait MutationOperator: Send + Sync {
    fn mutate(&self, genome: &Genome, rng: &mut dyn RngCore) -> Genome;
}

impl<F> MutationOperator for F
where
    F: Fn(&Genome, &mut dyn RngCore) -> Genome + Send + Sync,
{
    fn mutate(&self, genome: &Genome, rng: &mut dyn RngCore) -> Genome {
        self(genome, rng)
    }
}

/// Creates fresh random candidates.
pub trait CandidateGenerator: Send + Sync {
    fn generate(
        &self,
        length: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Genome, InvalidLengthError>;
}

impl<F> CandidateGenerator for F
where
    F: Fn(usize, &mut dyn RngCore) -> Result<Genome, InvalidLengthError> + Send + Sync,
{
    fn generate(
        &self,
        length: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Genome, InvalidLengthError> {
        self(length, rng)
    }
}

pub trait RuleMatcher: Send + Sync {
    fn rules_match(&self, rule1: &Rule, rule2: &Rule) -> Result<bool, LengthMismatchError>;
}

impl<F> RuleMatcher for F
where
    F: Fn(&Rule, &Rule) -> Result<bool, LengthMismatchError> + Send + Sync,
{
    fn rules_match(&self, rule1: &Rule, rule2: &Rule) -> Result<bool, LengthMismatchError> {
        self(rule1, rule2)
    }
}

pub trait RuleEncoder: Send + Sync {
    fn encode(&self, rule_base: &RuleBase) -> Vec<Allele>;
}

impl<F> RuleEncoder for F
where
    F: Fn(&RuleBase) -> Vec<Allele> + Send + Sync,
{
    fn encode(&self, rule_base: &RuleBase) -> Vec<Allele> {
        self(rule_base)
    }
}

pub trait RuleDecoder: Send + Sync {
    fn decode(
        &self,
        sequence: &[Allele],
        condition_length: usize,
        rule_length: usize,
    ) -> Result<RuleBase, DecodeRulesError>;
}

impl<F> RuleDecoder for F
where
    F: Fn(&[Allele], usize, usize) -> Result<RuleBase, DecodeRulesError> + Send + Sync,
{
    fn decode(
        &self,
        sequence: &[Allele],
        condition_length: usize,
        rule_length: usize,
    ) -> Result<RuleBase, DecodeRulesError> {
        self(sequence, condition_length, rule_length)
    }
}

/// The classifier rule codec of `holland_core::rule`, with `#` wildcards in conditions.
#[derive(Debug, Default, Clone, Copy)]
pub struct WildcardRuleCodec;

impl RuleMatcher for WildcardRuleCodec {
    fn rules_match(&self, rule1: &Rule, rule2: &Rule) -> Result<bool, LengthMismatchError> {
        rule::rules_match(rule1, rule2)
    }
}

impl RuleEncoder for WildcardRuleCodec {
    fn encode(&self, rule_base: &RuleBase) -> Vec<Allele> {
        rule::encode(rule_base)
    }
}

impl RuleDecoder for WildcardRuleCodec {
    fn decode(
        &self,
        sequence: &[Allele],
        condition_length: usize,
        rule_length: usize,
    ) -> Result<RuleBase, DecodeRulesError> {
        rule::decode(sequence, condition_length, rule_length)
    }
}

/// The active implementation of every operator role.
///
/// Setting an operator affects every later call made through the registry. Scores
/// already cached in a [`Population`] are not recomputed.
pub struct Operators {
    fitness: Box<dyn FitnessFunction>,
    selection: Box<dyn SelectionOperator>,
    crossover: Box<dyn CrossoverOperator>,
    mutation: Box<dyn MutationOperator>,
    candidate: Box<dyn CandidateGenerator>,
    rule_matcher: Box<dyn RuleMatcher>,
    rule_encoder: Box<dyn RuleEncoder>,
    rule_decoder: Box<dyn RuleDecoder>,
}

impl Default for Operators {
    fn default() -> Self {
        Self {
            fitness: Box::new(AlleleCount::default()),
            selection: Box::new(Tournament),
            crossover: Box::new(SinglePoint),
            mutation: Box::new(PointMutation::default()),
            candidate: Box::new(UniformCandidate::default()),
            rule_matcher: Box::new(WildcardRuleCodec),
            rule_encoder: Box::new(WildcardRuleCodec),
            rule_decoder: Box::new(WildcardRuleCodec),
        }
    }
}

impl fmt::Debug for Operators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operators").finish_non_exhaustive()
    }
}

macro_rules! operator_slot {
    ($field:ident, $set:ident, $with:ident, $get:ident, $trait:ident $(,)?) => {
        #[doc = concat!("Replaces the active [`", stringify!($trait), "`].")]
        pub fn $set<T>(&mut self, operator: T) -> &mut Self
        where
            T: $trait + 'static,
        {
            self.$field = Box::new(operator);
            self
        }

        #[doc = concat!(
            "Like [`Self::",
            stringify!($set),
            "`], but consumes and returns the registry."
        )]
        #[must_use]
        pub fn $with<T>(mut self, operator: T) -> Self
        where
            T: $trait + 'static,
        {
            self.$field = Box::new(operator);
            self
        }

        #[must_use]
        pub fn $get(&self) -> &dyn $trait {
            &*self.$field
        }
    };
}

impl Operators {
    operator_slot!(
        fitness,
        set_fitness,
        with_fitness,
        fitness_function,
        FitnessFunction,
    );
    operator_slot!(
        selection,
        set_selection,
        with_selection,
        selection_operator,
        SelectionOperator,
    );
    operator_slot!(
        crossover,
        set_crossover,
        with_crossover,
        crossover_operator,
        CrossoverOperator,
    );
    operator_slot!(
        mutation,
        set_mutation,
        with_mutation,
        mutation_operator,
        MutationOperator,
    );
    operator_slot!(
        candidate,
        set_candidate,
        with_candidate,
        candidate_generator,
        CandidateGenerator,
    );
    operator_slot!(
        rule_matcher,
        set_rule_matcher,
        with_rule_matcher,
        rule_matcher,
        RuleMatcher,
    );
    operator_slot!(
        rule_encoder,
        set_rule_encoder,
        with_rule_encoder,
        rule_encoder,
        RuleEncoder,
    );
    operator_slot!(
        rule_decoder,
        set_rule_decoder,
        with_rule_decoder,
        rule_decoder,
        RuleDecoder,
    );

    /// Scores `genome` with the active fitness function.
    #[must_use]
    pub fn fitness(&self, genome: &Genome) -> f64 {
        self.fitness.fitness(genome)
    }

    pub fn select(
        &self,
        population: &Population,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Genome>, SelectionError> {
        self.selection.select(population, rng)
    }

    pub fn crossover(
        &self,
        parent_a: &Genome,
        parent_b: &Genome,
        rng: &mut dyn RngCore,
    ) -> Result<(Genome, Genome), LengthMismatchError> {
        self.crossover.crossover(parent_a, parent_b, rng)
    }

    pub fn mutate(&self, genome: &Genome, rng: &mut dyn RngCore) -> Genome {
        self.mutation.mutate(genome, rng)
    }

    pub fn generate_candidate(
        &self,
        length: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Genome, InvalidLengthError> {
        self.candidate.generate(length, rng)
    }

    pub fn rules_match(&self, rule1: &Rule, rule2: &Rule) -> Result<bool, LengthMismatchError> {
        self.rule_matcher.rules_match(rule1, rule2)
    }

    #[must_use]
    pub fn encode_rules(&self, rule_base: &RuleBase) -> Vec<Allele> {
        self.rule_encoder.encode(rule_base)
    }

    pub fn decode_rules(
        &self,
        sequence: &[Allele],
        condition_length: usize,
        rule_length: usize,
    ) -> Result<RuleBase, DecodeRulesError> {
        self.rule_decoder.decode(sequence, condition_length, rule_length)
    }
}
