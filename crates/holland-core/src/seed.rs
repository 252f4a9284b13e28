use std::{
    fmt::{self, Write as _},
    str::FromStr,
};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Seed for the random source owned by an evolution engine.
///
/// This is a 128-bit (16-byte) seed. Two engines built from the same seed and the same
/// operators produce the same sequence of populations, which makes runs reproducible
/// for debugging and testing.
///
/// Seeds serialize as a 32-character hex string.
///
/// # Example
///
/// ```
/// use holland_core::Seed;
/// use rand::Rng as _;
///
/// // Pick a fresh seed
/// let seed: Seed = rand::rng().random();
///
/// // Or derive one from an integer
/// let fixed = Seed::from(3);
/// assert_eq!(fixed.to_string(), "00000000000000000000000000000003");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed([u8; 16]);

impl Seed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Builds the generator this seed stands for.
    #[must_use]
    pub fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl From<u64> for Seed {
    fn from(value: u64) -> Self {
        Self(u128::from(value).to_be_bytes())
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl Serialize for Seed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{self}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

/// A seed string that is not exactly 32 hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseSeedError {
    #[display("invalid hex: expected 32 digits, got {length} characters")]
    Length { length: usize },
    #[display("invalid hex: {character:?} at index {index} is not a hex digit")]
    Digit { character: char, index: usize },
}

impl FromStr for Seed {
    type Err = ParseSeedError;

    /// Parses 32 hex digits, most significant byte first. Signs and prefixes are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let length = s.chars().count();
        if length != 32 {
            return Err(ParseSeedError::Length { length });
        }
        let mut bytes = [0; 16];
        for (index, character) in s.chars().enumerate() {
            let digit = character
                .to_digit(16)
                .and_then(|d| u8::try_from(d).ok())
                .ok_or(ParseSeedError::Digit { character, index })?;
            let byte = &mut bytes[index / 2];
            *byte = (*byte << 4) | digit;
        }
        Ok(Self(bytes))
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows drawing seeds with `rng.random()`.
impl Distribution<Seed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Seed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        Seed(seed)
    }
}
