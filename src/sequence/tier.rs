//! Tier
//!
//! The sum type owning exactly one backend, and the residency tag it exposes.

use std::fmt;

/// Which store currently holds a sequence's elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Residency {
    /// The fast, in-memory store
    Primary,
    /// The disk-resident store
    Secondary,
}

impl fmt::Display for Residency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Residency::Primary => write!(f, "primary"),
            Residency::Secondary => write!(f, "secondary"),
        }
    }
}

/// Exactly one live backend
pub(crate) enum Tier<P, S> {
    Primary(P),
    Secondary(S),
}

impl<P, S> Tier<P, S> {
    pub fn residency(&self) -> Residency {
        match self {
            Tier::Primary(_) => Residency::Primary,
            Tier::Secondary(_) => Residency::Secondary,
        }
    }
}

/// Run the same expression against whichever backend is live.
///
/// `on_tier!(tier, backend => backend.len())`
macro_rules! on_tier {
    ($tier:expr, $backend:ident => $body:expr) => {
        match $tier {
            $crate::sequence::tier::Tier::Primary($backend) => $body,
            $crate::sequence::tier::Tier::Secondary($backend) => $body,
        }
    };
}

pub(crate) use on_tier;
