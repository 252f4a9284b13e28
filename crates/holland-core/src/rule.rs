//! Classifier rules and their flat encoding.
//!
//! A classifier system represents its knowledge as a [`RuleBase`]: an ordered list of
//! [`Rule`]s, each pairing a condition with an output. Conditions may contain
//! [`WILDCARD`] symbols that match any allele at their position.
//!
//! Every rule in a base has the same [`RuleLayout`], so the whole base can be flattened
//! into a single allele sequence (and hence evolved as a [`Genome`](crate::Genome)):
//!
//! ```text
//! | condition | output | condition | output | ...
//! |<------ rule_length ->|
//! ```
//!
//! [`encode`] and [`decode`] convert between the two forms and round-trip exactly.
//! [`rules_match`] compares two rules with wildcard semantics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    LengthMismatchError, MalformedSequenceError,
    genome::{self, Allele, WILDCARD},
};

/// A condition paired with the output it produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    condition: Vec<Allele>,
    output: Vec<Allele>,
}

impl Rule {
    #[must_use]
    pub fn new(condition: Vec<Allele>, output: Vec<Allele>) -> Self {
        Self { condition, output }
    }

    /// Builds a rule from the compact text form of its condition and output.
    ///
    /// ```
    /// use holland_core::{Rule, WILDCARD};
    ///
    /// let rule = Rule::parse("1#0", "1").unwrap();
    /// assert_eq!(rule.condition(), &[1, WILDCARD, 0]);
    /// assert_eq!(rule.output(), &[1]);
    /// ```
    pub fn parse(condition: &str, output: &str) -> Result<Self, genome::ParseAlleleError> {
        Ok(Self::new(
            genome::parse_alleles(condition)?,
            genome::parse_alleles(output)?,
        ))
    }

    #[must_use]
    pub fn condition(&self) -> &[Allele] {
        &self.condition
    }

    #[must_use]
    pub fn output(&self) -> &[Allele] {
        &self.output
    }

    /// Returns the widths of this rule's condition and output.
    #[must_use]
    pub fn layout(&self) -> RuleLayout {
        RuleLayout {
            condition_length: self.condition.len(),
            output_length: self.output.len(),
        }
    }

    /// Tests whether this rule matches `other`.
    ///
    /// See [`rules_match`].
    pub fn matches(&self, other: &Self) -> Result<bool, LengthMismatchError> {
        rules_match(self, other)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        genome::write_alleles(f, &self.condition)?;
        f.write_str(" -> ")?;
        genome::write_alleles(f, &self.output)
    }
}

/// Widths of the condition and output parts of every rule in a [`RuleBase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[display("{condition_length}+{output_length}")]
pub struct RuleLayout {
    condition_length: usize,
    output_length: usize,
}

/// A rule layout that cannot describe the rules it is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum RuleLayoutError {
    #[display("rule length must be positive")]
    ZeroWidth,
    #[display("rule length {condition_length} + {output_length} overflows")]
    TooWide {
        condition_length: usize,
        output_length: usize,
    },
    #[display("condition length {condition_length} exceeds rule length {rule_length}")]
    ConditionTooLong {
        condition_length: usize,
        rule_length: usize,
    },
    #[display("rule layout {found} does not match rule base layout {expected}")]
    Mismatch {
        expected: RuleLayout,
        found: RuleLayout,
    },
}

impl RuleLayout {
    /// Creates a layout from the widths of the condition and output parts.
    pub fn new(condition_length: usize, output_length: usize) -> Result<Self, RuleLayoutError> {
        let Some(rule_length) = condition_length.checked_add(output_length) else {
            return Err(RuleLayoutError::TooWide {
                condition_length,
                output_length,
            });
        };
        if rule_length == 0 {
            return Err(RuleLayoutError::ZeroWidth);
        }
        Ok(Self {
            condition_length,
            output_length,
        })
    }

    /// Creates a layout from the condition width and the full slot width of one rule.
    pub fn from_rule_length(
        condition_length: usize,
        rule_length: usize,
    ) -> Result<Self, RuleLayoutError> {
        if condition_length > rule_length {
            return Err(RuleLayoutError::ConditionTooLong {
                condition_length,
                rule_length,
            });
        }
        Self::new(condition_length, rule_length - condition_length)
    }

    #[must_use]
    pub fn condition_length(&self) -> usize {
        self.condition_length
    }

    #[must_use]
    pub fn output_length(&self) -> usize {
        self.output_length
    }

    /// Width of one encoded rule: condition followed by output.
    #[must_use]
    pub fn rule_length(&self) -> usize {
        self.condition_length + self.output_length
    }
}

/// An ordered collection of rules sharing one [`RuleLayout`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RuleBase {
    layout: RuleLayout,
    rules: Vec<Rule>,
}

impl RuleBase {
    #[must_use]
    pub fn new(layout: RuleLayout) -> Self {
        Self {
            layout,
            rules: vec![],
        }
    }

    /// Builds a rule base, checking every rule against `layout`.
    pub fn from_rules<I>(layout: RuleLayout, rules: I) -> Result<Self, RuleLayoutError>
    where
        I: IntoIterator<Item = Rule>,
    {
        let mut base = Self::new(layout);
        for rule in rules {
            base.push(rule)?;
        }
        Ok(base)
    }

    /// Appends a rule, rejecting it if its widths differ from the base's layout.
    pub fn push(&mut self, rule: Rule) -> Result<(), RuleLayoutError> {
        let found = rule.layout();
        if found != self.layout {
            return Err(RuleLayoutError::Mismatch {
                expected: self.layout,
                found,
            });
        }
        self.rules.push(rule);
        Ok(())
    }

    #[must_use]
    pub fn layout(&self) -> RuleLayout {
        self.layout
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.rules.iter()
    }

    /// Returns the rules matching `query`, in rule base order.
    ///
    /// Rules whose condition width differs from the query's never match.
    pub fn matching<'a>(&'a self, query: &'a Rule) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rules_match(rule, query).unwrap_or(false))
    }

    /// Flattens the rule base into one allele sequence.
    #[must_use]
    pub fn encode(&self) -> Vec<Allele> {
        let mut sequence = Vec::with_capacity(self.rules.len() * self.layout.rule_length());
        for rule in &self.rules {
            sequence.extend_from_slice(&rule.condition);
            sequence.extend_from_slice(&rule.output);
        }
        sequence
    }

    /// Splits a flat allele sequence into rules of the given layout.
    pub fn decode(sequence: &[Allele], layout: RuleLayout) -> Result<Self, MalformedSequenceError> {
        let rule_length = layout.rule_length();
        if sequence.len() % rule_length != 0 {
            return Err(MalformedSequenceError {
                length: sequence.len(),
                rule_length,
            });
        }
        let rules = sequence
            .chunks_exact(rule_length)
            .map(|window| {
                let (condition, output) = window.split_at(layout.condition_length);
                Rule::new(condition.to_vec(), output.to_vec())
            })
            .collect();
        Ok(Self { layout, rules })
    }
}

impl<'a> IntoIterator for &'a RuleBase {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Failure to decode a flat sequence given raw widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DecodeRulesError {
    #[display("{_0}")]
    Layout(RuleLayoutError),
    #[display("{_0}")]
    Malformed(MalformedSequenceError),
}

/// Flattens `rule_base` into one allele sequence, rule by rule.
#[must_use]
pub fn encode(rule_base: &RuleBase) -> Vec<Allele> {
    rule_base.encode()
}

/// Splits `sequence` into rules of `rule_length` alleles, the first `condition_length`
/// of which form the condition.
///
/// ```
/// use holland_core::rule;
///
/// let rules = rule::decode(&[1, 0, 1, 0, 0, 0], 2, 3).unwrap();
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rule::encode(&rules), vec![1, 0, 1, 0, 0, 0]);
///
/// assert!(rule::decode(&[1, 0, 1, 0], 2, 3).is_err());
/// ```
pub fn decode(
    sequence: &[Allele],
    condition_length: usize,
    rule_length: usize,
) -> Result<RuleBase, DecodeRulesError> {
    let layout = RuleLayout::from_rule_length(condition_length, rule_length)
        .map_err(DecodeRulesError::Layout)?;
    RuleBase::decode(sequence, layout).map_err(DecodeRulesError::Malformed)
}

/// Tests whether two rules match.
///
/// Conditions are compared position by position; a [`WILDCARD`] on either side matches
/// anything. Outputs are compared literally. Both comparisons must succeed.
pub fn rules_match(rule1: &Rule, rule2: &Rule) -> Result<bool, LengthMismatchError> {
    if rule1.condition.len() != rule2.condition.len() {
        return Err(LengthMismatchError {
            left: rule1.condition.len(),
            right: rule2.condition.len(),
        });
    }
    let condition_matches = std::iter::zip(&rule1.condition, &rule2.condition)
        .all(|(&a, &b)| a == WILDCARD || b == WILDCARD || a == b);
    Ok(condition_matches && rule1.output == rule2.output)
}
