use std::{fmt, str::FromStr};

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;
use sha2::{Digest as _, Sha256};

/// A 256-bit seed that makes shuffling reproducible.
///
/// Seeds are displayed and parsed as 64 lowercase hex digits.
///
/// # Examples
///
/// ```
/// use std::str::FromStr as _;
///
/// use jigcut_generator::ShuffleSeed;
///
/// let seed = ShuffleSeed::from_label("morning puzzle");
/// let parsed = ShuffleSeed::from_str(&seed.to_string()).unwrap();
/// assert_eq!(seed, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShuffleSeed([u8; 32]);

impl ShuffleSeed {
    /// Creates a seed from raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Draws a fresh seed from the thread-local generator.
    #[must_use]
    pub fn random() -> Self {
        let mut bytes = [0; 32];
        rand::rng().fill(&mut bytes);
        Self(bytes)
    }

    /// Derives a seed from an arbitrary label by hashing it with SHA-256.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let digest = Sha256::digest(label.as_bytes());
        let mut bytes = [0; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// The raw seed bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// A deterministic generator seeded with this seed.
    #[must_use]
    pub fn rng(self) -> Pcg64 {
        Pcg64::from_seed(self.0)
    }
}

impl fmt::Display for ShuffleSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Error returned when a seed string is not 64 hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseSeedError {
    /// Wrong number of characters.
    #[display("seed must be 64 hex digits, got {len} characters")]
    Length {
        /// Length of the rejected input.
        len: usize,
    },
    /// A character is not a hex digit.
    #[display("invalid hex digit at position {position}")]
    Digit {
        /// Character offset of the first invalid digit.
        position: usize,
    },
}

impl FromStr for ShuffleSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 {
            return Err(ParseSeedError::Length { len: s.len() });
        }
        let mut bytes = [0; 32];
        for (i, pair) in s.as_bytes().chunks_exact(2).enumerate() {
            let hi = hex_value(pair[0]).ok_or(ParseSeedError::Digit { position: i * 2 })?;
            let lo = hex_value(pair[1]).ok_or(ParseSeedError::Digit {
                position: i * 2 + 1,
            })?;
            bytes[i] = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
