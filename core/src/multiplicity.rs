//! Cardinality ranges.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors parsing a multiplicity from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultiplicityError {
    #[error("empty multiplicity")]
    Empty,

    #[error("invalid bound '{0}' in multiplicity")]
    InvalidBound(String),

    #[error("multiplicity lower bound {min} exceeds upper bound {max}")]
    Inverted { min: u32, max: u32 },
}

/// A closed or upper-unbounded interval of non-negative counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Multiplicity {
    min: u32,
    /// `None` means unbounded.
    max: Option<u32>,
}

impl Multiplicity {
    /// `0..*`, the default for node requirements.
    pub const ANY: Multiplicity = Multiplicity { min: 0, max: None };
    /// `1..1`, the default for edge and property requirements.
    pub const ONE: Multiplicity = Multiplicity {
        min: 1,
        max: Some(1),
    };
    /// `0..1`.
    pub const OPTIONAL: Multiplicity = Multiplicity {
        min: 0,
        max: Some(1),
    };

    /// Create a bounded range. Fails if `min > max`.
    pub fn new(min: u32, max: u32) -> Result<Self, MultiplicityError> {
        if min > max {
            return Err(MultiplicityError::Inverted { min, max });
        }
        Ok(Self {
            min,
            max: Some(max),
        })
    }

    /// Exactly `n`.
    pub fn exactly(n: u32) -> Self {
        Self { min: n, max: Some(n) }
    }

    /// `min..*`.
    pub fn at_least(min: u32) -> Self {
        Self { min, max: None }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    /// Upper bound, `None` if unbounded.
    pub fn max(&self) -> Option<u32> {
        self.max
    }

    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }

    /// `min <= n <= max`.
    pub fn in_range(&self, n: usize) -> bool {
        let n = n as u64;
        if n < u64::from(self.min) {
            return false;
        }
        match self.max {
            Some(max) => n <= u64::from(max),
            None => true,
        }
    }

    /// Whether zero occurrences are acceptable.
    pub fn allows_zero(&self) -> bool {
        self.min == 0
    }
}

impl Default for Multiplicity {
    fn default() -> Self {
        Self::ANY
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..*", self.min),
        }
    }
}

fn parse_bound(text: &str) -> Result<u32, MultiplicityError> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| MultiplicityError::InvalidBound(text.trim().to_string()))
}

impl FromStr for Multiplicity {
    type Err = MultiplicityError;

    /// Accepts `n`, `n..m`, `n..*` and `*`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MultiplicityError::Empty);
        }
        if s == "*" {
            return Ok(Self::ANY);
        }
        match s.split_once("..") {
            Some((lo, hi)) => {
                let min = parse_bound(lo)?;
                if hi.trim() == "*" {
                    Ok(Self::at_least(min))
                } else {
                    Self::new(min, parse_bound(hi)?)
                }
            }
            None => Ok(Self::exactly(parse_bound(s)?)),
        }
    }
}
