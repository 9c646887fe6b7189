//! Collaborator traits for contact graph routing
//!
//! The routing engine owns none of the data it reasons about. These traits
//! are the synchronous, read-only queries it makes against the contact plan,
//! the queueing subsystem and the clock.
//!
//! ## Key Traits
//!
//! - [`ContactPlan`]: Contacts, ranges and neighbor structure
//! - [`BacklogSource`]: Bytes queued toward a neighbor ahead of a bundle
//! - [`Clock`]: Time abstraction for testability

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::contact::{Contact, Priority};
use crate::error::{BacklogError, ContactPlanError};
use crate::node::NodeId;
use crate::scalar::Scalar;

/// Abstraction over the contact plan
///
/// Implementations must already be consistent when queried; the engine
/// never waits on them.
pub trait ContactPlan: Send + Sync {
    /// Contacts from `from` to `to`, ordered by start time
    fn contacts_between(&self, from: NodeId, to: NodeId) -> Vec<&Contact>;

    /// One-way light time from `from` to `to` applicable at `at`
    fn applicable_range(&self, from: NodeId, to: NodeId, at: i64)
    -> Result<u32, ContactPlanError>;

    /// Distinct next-hop neighbors of the local node
    fn local_neighbors(&self, local: NodeId) -> Vec<NodeId>;

    /// Whether `node` is a neighbor through which `destination` may be reached
    fn is_destination_neighbor(&self, destination: NodeId, node: NodeId) -> bool;

    /// Number of distinct next-hop neighbors of the local node
    fn local_neighbors_count(&self, local: NodeId) -> usize {
        self.local_neighbors(local).len()
    }

    /// Whether `node` is one of the local node's neighbors
    fn is_local_neighbor(&self, local: NodeId, node: NodeId) -> bool {
        self.local_neighbors(local).contains(&node)
    }
}

/// Backlog queued toward a neighbor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Backlog {
    /// Bytes that will be transmitted before the bundle being routed
    pub applicable: Scalar,
    /// All bytes queued toward the neighbor
    pub total: Scalar,
}

/// Abstraction over the queueing subsystem
pub trait BacklogSource: Send + Sync {
    /// Backlog toward `neighbor` as seen by a bundle of the given priority and ordinal
    fn applicable_backlog(
        &self,
        neighbor: NodeId,
        priority: Priority,
        ordinal: u8,
    ) -> Result<Backlog, BacklogError>;
}

/// Time abstraction for testability
///
/// Times are whole seconds on the same scale as contact start and end times.
pub trait Clock: Send + Sync {
    /// Current time in seconds
    fn now(&self) -> i64;
}

/// Real clock using UTC wall time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Manually driven clock for tests and scripted scenarios
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock stopped at `now`
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move the clock forward
    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
