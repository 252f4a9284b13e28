//! Genomes and their alleles.
//!
//! A [`Genome`] is an ordered, fixed-length sequence of [`Allele`]s. Genomes are plain
//! values: cloning one deep-copies its sequence, and equality is by content. Operators
//! never edit a genome that another population slot may share; they build a new one.
//!
//! # Text form
//!
//! Alleles `0..=9` are written as decimal digits and [`WILDCARD`] as `#`, so a binary
//! genome reads `"1001"` and a classifier condition reads `"1#0"`. Larger alleles are
//! written in brackets (`"[12]"`); they format but do not parse back.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A single discrete symbol of a genome.
pub type Allele = u8;

/// The "off" allele of a binary encoding.
pub const OFF: Allele = 0;

/// The "on" allele of a binary encoding.
pub const ON: Allele = 1;

/// Reserved symbol that matches any allele at its position in a rule condition.
pub const WILDCARD: Allele = Allele::MAX;

/// A text sequence contained a character that is not an allele.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid allele {character:?} at index {index}")]
pub struct ParseAlleleError {
    pub character: char,
    pub index: usize,
}

/// Parses the compact text form of an allele sequence.
///
/// # Examples
///
/// ```
/// use holland_core::genome::{self, WILDCARD};
///
/// assert_eq!(genome::parse_alleles("1#0").unwrap(), vec![1, WILDCARD, 0]);
/// assert!(genome::parse_alleles("1x0").is_err());
/// ```
pub fn parse_alleles(s: &str) -> Result<Vec<Allele>, ParseAlleleError> {
    s.chars()
        .enumerate()
        .map(|(index, character)| match character {
            '#' => Ok(WILDCARD),
            // `to_digit(10)` is at most 9
            _ => character
                .to_digit(10)
                .and_then(|d| Allele::try_from(d).ok())
                .ok_or(ParseAlleleError { character, index }),
        })
        .collect()
}

/// Writes alleles in the compact text form.
pub fn write_alleles(f: &mut fmt::Formatter<'_>, alleles: &[Allele]) -> fmt::Result {
    for &allele in alleles {
        match allele {
            WILDCARD => f.write_str("#")?,
            0..=9 => write!(f, "{allele}")?,
            _ => write!(f, "[{allele}]")?,
        }
    }
    Ok(())
}

/// An ordered sequence of alleles representing one candidate solution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    alleles: Vec<Allele>,
}

impl Genome {
    #[must_use]
    pub fn new(alleles: Vec<Allele>) -> Self {
        Self { alleles }
    }

    #[must_use]
    pub fn alleles(&self) -> &[Allele] {
        &self.alleles
    }

    #[must_use]
    pub fn into_alleles(self) -> Vec<Allele> {
        self.alleles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.alleles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alleles.is_empty()
    }

    /// Counts the positions holding `allele`.
    ///
    /// `genome.count(ON)` is the score of the default fitness function.
    #[must_use]
    pub fn count(&self, allele: Allele) -> usize {
        self.alleles.iter().filter(|&&a| a == allele).count()
    }

    /// Builds a genome from the head of `self` and the tail of `other`, split at `point`.
    ///
    /// # Panics
    ///
    /// Panics if `point` exceeds the length of either genome.
    #[must_use]
    pub fn splice(&self, other: &Self, point: usize) -> Self {
        self.alleles[..point]
            .iter()
            .chain(&other.alleles[point..])
            .copied()
            .collect()
    }
}

impl From<Vec<Allele>> for Genome {
    fn from(alleles: Vec<Allele>) -> Self {
        Self::new(alleles)
    }
}

impl FromIterator<Allele> for Genome {
    fn from_iter<I: IntoIterator<Item = Allele>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl AsRef<[Allele]> for Genome {
    fn as_ref(&self) -> &[Allele] {
        &self.alleles
    }
}

impl FromStr for Genome {
    type Err = ParseAlleleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_alleles(s).map(Self::new)
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_alleles(f, &self.alleles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let genome: Genome = "10#01".parse().unwrap();
        assert_eq!(genome.alleles(), &[1, 0, WILDCARD, 0, 1]);
        assert_eq!(genome.to_string(), "10#01");
    }

    #[test]
    fn test_display_large_allele() {
        let genome = Genome::new(vec![1, 12, 0]);
        assert_eq!(genome.to_string(), "1[12]0");
    }

    #[test]
    fn test_parse_rejects_unknown_character() {
        let err = "01a".parse::<Genome>().unwrap_err();
        assert_eq!(
            err,
            ParseAlleleError {
                character: 'a',
                index: 2
            }
        );
    }

    #[test]
    fn test_count() {
        let genome: Genome = "1101".parse().unwrap();
        assert_eq!(genome.count(ON), 3);
        assert_eq!(genome.count(OFF), 1);
        assert_eq!(genome.count(WILDCARD), 0);
    }

    #[test]
    fn test_clone_does_not_alias() {
        let original: Genome = "0000".parse().unwrap();
        let mut alleles = original.clone().into_alleles();
        alleles[0] = ON;
        assert_eq!(original.to_string(), "0000");
        assert_eq!(Genome::from(alleles).to_string(), "1000");
    }

    #[test]
    fn test_splice() {
        let a: Genome = "1000".parse().unwrap();
        let b: Genome = "0001".parse().unwrap();
        assert_eq!(a.splice(&b, 3).to_string(), "1001");
        assert_eq!(b.splice(&a, 3).to_string(), "0000");
        assert_eq!(a.splice(&b, 0), b);
        assert_eq!(a.splice(&b, 4), a);
    }

    #[test]
    fn test_serde_is_transparent() {
        let genome: Genome = "101".parse().unwrap();
        let json = serde_json::to_string(&genome).unwrap();
        assert_eq!(json, "[1,0,1]");
        assert_eq!(serde_json::from_str::<Genome>(&json).unwrap(), genome);
    }
}
