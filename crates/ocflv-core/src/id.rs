//! # Object Identifier
//!
//! Preserved objects are addressed by a decimal identifier (the NSS of the
//! object URN). The newtype keeps it from being confused with other numeric
//! values such as content lengths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Numeric identifier of a preserved object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl ObjectId {
    /// Wrap a raw identifier.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Access the raw identifier.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for ObjectId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}
