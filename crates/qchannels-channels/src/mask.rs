//! Relative-to-absolute qubit mapping.
//!
//! Channel circuits are written against relative qubits `0, 1, 2, …`. A
//! [`QubitMask`] places them on device qubits. Relative qubits without an
//! entry stay where they are.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ChannelError, ChannelResult};

/// Partial map from relative to absolute qubit indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QubitMask(BTreeMap<u32, u32>);

impl QubitMask {
    /// The identity mask.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `relative` onto `absolute`.
    pub fn with(mut self, relative: u32, absolute: u32) -> Self {
        self.0.insert(relative, absolute);
        self
    }

    /// Absolute qubit of a relative one.
    pub fn resolve(&self, relative: u32) -> u32 {
        self.0.get(&relative).copied().unwrap_or(relative)
    }

    /// Resolve a list of relative qubits, keeping order.
    pub fn resolve_all(&self, relative: &[u32]) -> Vec<u32> {
        relative.iter().map(|&q| self.resolve(q)).collect()
    }

    /// Fail if two of `relative` land on the same absolute qubit.
    pub fn check_injective(&self, relative: &[u32]) -> ChannelResult<()> {
        let mut seen: BTreeMap<u32, u32> = BTreeMap::new();
        for &rel in relative {
            let abs = self.resolve(rel);
            if let Some(&first) = seen.get(&abs) {
                if first != rel {
                    return Err(ChannelError::NonInjectiveMask {
                        first,
                        second: rel,
                        absolute: abs,
                    });
                }
            }
            seen.insert(abs, rel);
        }
        Ok(())
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().all(|(rel, abs)| rel == abs)
    }

    /// Explicit entries in relative order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.0.iter().map(|(&r, &a)| (r, a))
    }
}

impl FromIterator<(u32, u32)> for QubitMask {
    fn from_iter<I: IntoIterator<Item = (u32, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parses `rel:abs` pairs separated by commas, e.g. `0:3,3:4`.
impl FromStr for QubitMask {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ChannelError::InvalidMask {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let mut mask = QubitMask::new();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (rel, abs) = pair
                .split_once(':')
                .ok_or_else(|| invalid("expected rel:abs"))?;
            let rel: u32 = rel
                .trim()
                .parse()
                .map_err(|_| invalid("relative qubit is not an integer"))?;
            let abs: u32 = abs
                .trim()
                .parse()
                .map_err(|_| invalid("absolute qubit is not an integer"))?;
            if mask.0.insert(rel, abs).is_some() {
                return Err(invalid("relative qubit mapped twice"));
            }
        }
        Ok(mask)
    }
}

impl fmt::Display for QubitMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self.iter().map(|(r, a)| format!("{r}:{a}")).collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}
