//! The bundle being routed
//!
//! Only the fields the routing engine reads are modelled here. Payload,
//! extension blocks and security processing belong to the bundle agent.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::contact::Priority;
use crate::node::NodeId;

/// A bundle awaiting a forwarding decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    /// Final destination
    pub terminus_node: NodeId,
    /// Priority level
    pub priority: Priority,
    /// Precedence within the expedited priority
    pub ordinal: u8,
    /// Estimated volume consumption (bytes, including convergence-layer overhead)
    pub evc: u64,
    /// Absolute expiration time (seconds)
    pub expiration_time: i64,
    /// Delivery confidence already achieved by earlier forwarding, in [0, 1]
    pub dlv_confidence: f32,
    /// Critical bundles are forwarded on every viable route
    pub critical: bool,
    /// Neighbors toward which forwarding of this bundle already failed
    #[serde(default)]
    pub failed_neighbors: HashSet<NodeId>,
    /// Nodes this bundle has visited or is committed to visiting
    #[serde(default)]
    pub geo_route: HashSet<NodeId>,
}

impl Bundle {
    /// Create a normal-priority bundle
    pub fn new(terminus_node: NodeId, evc: u64, expiration_time: i64) -> Self {
        Self {
            terminus_node,
            priority: Priority::Normal,
            ordinal: 0,
            evc,
            expiration_time,
            dlv_confidence: 0.0,
            critical: false,
            failed_neighbors: HashSet::new(),
            geo_route: HashSet::new(),
        }
    }

    /// Set priority and ordinal
    pub fn with_priority(mut self, priority: Priority, ordinal: u8) -> Self {
        self.priority = priority;
        self.ordinal = ordinal;
        self
    }

    /// Mark the bundle as critical
    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    /// Set the delivery confidence already achieved
    pub fn with_dlv_confidence(mut self, confidence: f32) -> Self {
        self.dlv_confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Record a neighbor toward which forwarding failed
    pub fn add_failed_neighbor(&mut self, neighbor: NodeId) {
        self.failed_neighbors.insert(neighbor);
    }

    /// Record a node on the bundle's trail
    pub fn add_visited(&mut self, node: NodeId) {
        self.geo_route.insert(node);
    }

    /// Whether the bundle has been at, or is committed to, the given node
    pub fn has_visited(&self, node: &NodeId) -> bool {
        self.geo_route.contains(node)
    }

    /// Whether forwarding toward the given neighbor already failed
    pub fn has_failed_toward(&self, neighbor: &NodeId) -> bool {
        self.failed_neighbors.contains(neighbor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_defaults() {
        let b = Bundle::new(NodeId(9), 500, 1000);
        assert_eq!(b.priority, Priority::Normal);
        assert!(!b.critical);
        assert!(b.failed_neighbors.is_empty());
    }

    #[test]
    fn test_loop_tracking() {
        let mut b = Bundle::new(NodeId(9), 500, 1000);
        b.add_visited(NodeId(3));
        b.add_failed_neighbor(NodeId(4));
        assert!(b.has_visited(&NodeId(3)));
        assert!(!b.has_visited(&NodeId(4)));
        assert!(b.has_failed_toward(&NodeId(4)));
    }

    #[test]
    fn test_deserialize_without_loop_fields() {
        let json = r#"{
            "terminus_node": 5,
            "priority": "expedited",
            "ordinal": 3,
            "evc": 100,
            "expiration_time": 60,
            "dlv_confidence": 0.0,
            "critical": false
        }"#;
        let b: Bundle = serde_json::from_str(json).unwrap();
        assert_eq!(b.priority, Priority::Expedited);
        assert!(b.geo_route.is_empty());
    }
}
