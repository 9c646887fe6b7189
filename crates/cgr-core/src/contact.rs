//! Contacts and ranges of the contact plan
//!
//! A [`Contact`] is a scheduled, unidirectional transmission opportunity
//! between two nodes. A [`Range`] gives the one-way light time between two
//! nodes over an interval. Both are owned by the contact plan; the routing
//! engine only reads them.

use serde::{Deserialize, Serialize};

use crate::error::ContactPlanError;
use crate::node::NodeId;

/// Number of bundle priority levels
pub const PRIORITY_LEVELS: usize = 3;

/// Bundle priority level
///
/// Indexes the per-priority residual volume vector of a [`Contact`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Lowest priority
    Bulk = 0,
    /// Default priority
    #[default]
    Normal = 1,
    /// Highest priority, further ordered by ordinal
    Expedited = 2,
}

impl Priority {
    /// All priorities, lowest first
    pub const ALL: [Priority; PRIORITY_LEVELS] =
        [Priority::Bulk, Priority::Normal, Priority::Expedited];

    /// Index into a per-priority vector
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A scheduled transmission opportunity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Sending node
    pub from_node: NodeId,
    /// Receiving node
    pub to_node: NodeId,
    /// Start of the contact (seconds)
    pub from_time: i64,
    /// End of the contact (seconds)
    pub to_time: i64,
    /// Transmission rate (bytes per second)
    pub xmit_rate: u64,
    /// Residual volume per priority level (bytes)
    pub mtv: [f64; PRIORITY_LEVELS],
    /// Confidence that the contact will occur, in [0, 1]
    pub confidence: f32,
}

impl Contact {
    /// Create a certain contact whose residual volume is its full capacity
    pub fn new(
        from_node: NodeId,
        to_node: NodeId,
        from_time: i64,
        to_time: i64,
        xmit_rate: u64,
    ) -> Self {
        let volume = ((to_time - from_time).max(0) as f64) * xmit_rate as f64;
        Self {
            from_node,
            to_node,
            from_time,
            to_time,
            xmit_rate,
            mtv: [volume; PRIORITY_LEVELS],
            confidence: 1.0,
        }
    }

    /// Set the confidence
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Set the residual volume for every priority
    pub fn with_mtv(mut self, mtv: [f64; PRIORITY_LEVELS]) -> Self {
        self.mtv = mtv;
        self
    }

    /// Residual volume available to the given priority
    pub fn residual_volume(&self, priority: Priority) -> f64 {
        self.mtv[priority.index()]
    }

    /// Full volume of the contact, ignoring prior reservations
    pub fn nominal_volume(&self) -> f64 {
        ((self.to_time - self.from_time) as f64) * self.xmit_rate as f64
    }

    /// Check the contact is well formed
    pub fn validate(&self) -> Result<(), ContactPlanError> {
        if self.to_time <= self.from_time {
            return Err(ContactPlanError::InvalidContact {
                from: self.from_node,
                to: self.to_node,
                from_time: self.from_time,
                to_time: self.to_time,
            });
        }
        Ok(())
    }
}

/// One-way light time between two nodes over an interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// Sending node
    pub from_node: NodeId,
    /// Receiving node
    pub to_node: NodeId,
    /// Start of the interval (seconds)
    pub from_time: i64,
    /// End of the interval (seconds, exclusive)
    pub to_time: i64,
    /// One-way light time (seconds)
    pub owlt: u32,
}

impl Range {
    /// Create a new range
    pub fn new(
        from_node: NodeId,
        to_node: NodeId,
        from_time: i64,
        to_time: i64,
        owlt: u32,
    ) -> Self {
        Self {
            from_node,
            to_node,
            from_time,
            to_time,
            owlt,
        }
    }

    /// Whether the range applies at the given instant
    pub fn applies_at(&self, at: i64) -> bool {
        self.from_time <= at && at < self.to_time
    }
}
