//! Routing error types
//!
//! Three layers of failure:
//!
//! - [`DeliveryError`]: why the delivery-time estimator gave up on a route
//! - [`RouteRejection`]: why the viability checker turned a route down
//! - [`PassError`]: fatal errors that abort a whole routing pass
//!
//! The first two are local to a single route and never abort a pass.

use thiserror::Error;

use cgr_core::{BacklogError, ContactPlanError, NodeId};

use crate::config::CgrConfig;

/// Reasons the delivery-time estimator declares a route not viable
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Backlog toward the neighbor could not be determined
    #[error("Backlog unavailable: {0}")]
    Backlog(#[from] BacklogError),

    /// No contact from the local node to the neighbor starts by the route's start
    #[error("No contact toward {neighbor} at or before t={from_time}")]
    NoPriorContact { neighbor: NodeId, from_time: i64 },

    /// A hop has a zero transmission rate
    #[error("Contact {from}->{to} has zero transmit rate")]
    ZeroTransmitRate { from: NodeId, to: NodeId },

    /// The bundle's last byte would be sent after the contact ends
    #[error("Last byte at t={last_byte_tx} misses contact ending at t={to_time}")]
    ContactMissed { last_byte_tx: i64, to_time: i64 },

    /// No range applies to a hop
    #[error("Range lookup failed: {0}")]
    Range(#[from] ContactPlanError),

    /// The contact has no residual volume at the bundle's priority
    #[error("Contact {from}->{to} has no residual volume")]
    NoResidualVolume { from: NodeId, to: NodeId },

    /// The effective stop time is not after the first byte
    #[error("Effective stop time {stop} is not after first byte at t={first_byte_tx}")]
    NoEffectiveDuration { stop: i64, first_byte_tx: i64 },

    /// The effective volume limit cannot carry the bundle
    #[error("Effective volume limit {limit} below bundle EVC {evc}")]
    VolumeLimitTooSmall { limit: f64, evc: u64 },

    /// The last byte would arrive after the bundle expires
    #[error("PBAT {pbat} is after expiration {expiration}")]
    ArrivesAfterExpiration { pbat: i64, expiration: i64 },

    /// A hop index past the end of the route
    #[error("Hop {index} out of range for a {hops}-hop route")]
    HopOutOfRange { index: usize, hops: usize },
}

/// Why a route is not a candidate
#[derive(Debug, Error)]
pub enum RouteRejection {
    /// Already evaluated in this pass
    #[error("Route already checked")]
    AlreadyChecked,

    /// The route's contacts have ended
    #[error("Route terminated")]
    Terminated,

    /// Best-case arrival is after the bundle's expiration
    #[error("Arrival after deadline")]
    Deadline,

    /// First contact is not certain
    #[error("First contact confidence below 1")]
    UncertainFirstContact,

    /// The route adds too little delivery confidence
    #[error("Delivery confidence improvement too low")]
    LowDeliveryConfidence,

    /// The neighbor is the local node but the bundle is not for it
    #[error("Route loops back to the local node")]
    SelfLoop,

    /// The neighbor is excluded by the caller
    #[error("Neighbor {0} is excluded")]
    ExcludedNeighbor(NodeId),

    /// The delivery-time estimate failed
    #[error("PBAT computation failed: {0}")]
    PbatFailed(#[from] DeliveryError),
}

impl RouteRejection {
    /// Stable numeric code
    pub fn code(&self) -> i32 {
        match self {
            RouteRejection::AlreadyChecked => -1,
            RouteRejection::Terminated => -3,
            RouteRejection::Deadline => -4,
            RouteRejection::UncertainFirstContact => -5,
            RouteRejection::LowDeliveryConfidence => -6,
            RouteRejection::SelfLoop => -7,
            RouteRejection::ExcludedNeighbor(_) => -8,
            RouteRejection::PbatFailed(_) => -9,
        }
    }

    /// Whether the route is still useful as a branch point for the enumerator
    pub fn is_recoverable(&self, config: &CgrConfig) -> bool {
        match self {
            RouteRejection::Terminated
            | RouteRejection::Deadline
            | RouteRejection::UncertainFirstContact
            | RouteRejection::LowDeliveryConfidence
            | RouteRejection::PbatFailed(_) => true,
            RouteRejection::ExcludedNeighbor(_) => config.max_routes_per_neighbor == 1,
            RouteRejection::AlreadyChecked | RouteRejection::SelfLoop => false,
        }
    }
}

/// Fatal errors that abort a routing pass
#[derive(Debug, Error)]
pub enum PassError {
    /// The caller passed inconsistent input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A route's first hop is not a known neighbor of the local node
    #[error("Unknown neighbor: {0}")]
    UnknownNeighbor(NodeId),

    /// The pass failed earlier and must be reset
    #[error("Pass already failed")]
    PassFailed,

    /// The pass already produced its candidate list
    #[error("Pass already concluded")]
    PassConcluded,
}

/// Result type for routing operations
pub type RoutingResult<T> = Result<T, PassError>;
