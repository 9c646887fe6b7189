//! Node identity
//!
//! DTN nodes are addressed by their IPN node number. The routing engine
//! never needs anything richer, so [`NodeId`] is a plain newtype that is
//! cheap to copy and hash.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContactPlanError;

/// IPN node number
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Create a node identity from its IPN number
    pub const fn new(number: u64) -> Self {
        Self(number)
    }

    /// Get the underlying IPN number
    pub const fn number(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(number: u64) -> Self {
        Self(number)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ipn:{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = ContactPlanError;

    /// Accepts both `ipn:N` and a bare `N`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("ipn:").unwrap_or(s);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ContactPlanError::InvalidNode(s.to_string()))
    }
}
