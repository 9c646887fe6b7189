//! Error types for contact graph routing collaborators

use thiserror::Error;

use crate::node::NodeId;

/// Top-level error type for the collaborator layer
#[derive(Debug, Error)]
pub enum CgrError {
    #[error("Contact plan error: {0}")]
    ContactPlan(#[from] ContactPlanError),

    #[error("Backlog error: {0}")]
    Backlog(#[from] BacklogError),
}

/// Errors raised by contact plan queries
#[derive(Debug, Error)]
pub enum ContactPlanError {
    #[error("No range from {from} to {to} applicable at t={at}")]
    RangeNotFound { from: NodeId, to: NodeId, at: i64 },

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Invalid node identifier: {0}")]
    InvalidNode(String),

    #[error("Route has no hops")]
    EmptyRoute,

    #[error("Invalid contact {from}->{to} [{from_time}, {to_time}]")]
    InvalidContact {
        from: NodeId,
        to: NodeId,
        from_time: i64,
        to_time: i64,
    },
}

/// Errors raised by the queueing subsystem
#[derive(Debug, Error)]
pub enum BacklogError {
    #[error("No egress plan toward {0}")]
    NoPlan(NodeId),

    #[error("Egress plan toward {0} is blocked")]
    Blocked(NodeId),
}

/// Result type for collaborator queries
pub type CgrResult<T> = Result<T, CgrError>;
