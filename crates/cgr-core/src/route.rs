//! Routes through the contact graph
//!
//! A [`Route`] is produced by the shortest-path enumerator with a handful
//! of pre-estimates (arrival time, arrival confidence, summed light time)
//! and is then annotated in place by the routing engine: ETO, PBAT, route
//! volume limit and the congestion bookkeeping scalars.
//!
//! The `committed` and `overbooked` scalars are only meaningful once the
//! delivery-time estimate has run; until then they hold zero.

use serde::{Deserialize, Serialize};

use crate::contact::Contact;
use crate::error::ContactPlanError;
use crate::node::NodeId;
use crate::scalar::Scalar;

/// How a route was classified by the viability checker
///
/// The ordering of the loop classifications is the preference order used by
/// route selection: a route that cannot loop beats one that might.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum CheckValue {
    /// Not yet evaluated in this pass
    #[default]
    Unchecked,
    /// Evaluated; loop avoidance did not run or the route was rejected
    Checked,
    /// Viable and free of known loops
    NoLoop,
    /// A node on the route was already visited by the bundle
    PossibleLoop,
    /// The route's next hop was already visited by the bundle
    ClosingLoop,
    /// Forwarding toward the route's neighbor already failed
    FailedNeighbor,
}

impl CheckValue {
    /// Whether the route has been evaluated
    pub fn is_checked(self) -> bool {
        self != CheckValue::Unchecked
    }

    /// Whether the route's neighbor must be treated as suppressed
    pub fn suppresses_neighbor(self) -> bool {
        matches!(self, CheckValue::ClosingLoop | CheckValue::FailedNeighbor)
    }

    /// Short label for reports
    pub fn label(self) -> &'static str {
        match self {
            CheckValue::Unchecked => "Unchecked",
            CheckValue::Checked => "",
            CheckValue::NoLoop => "No loop",
            CheckValue::PossibleLoop => "Possible loop",
            CheckValue::ClosingLoop => "Closing loop",
            CheckValue::FailedNeighbor => "Failed neighbor",
        }
    }
}

/// A path to the destination through a specific first-hop neighbor
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    /// Sequence number assigned by the enumerator (reports only)
    pub num: u32,
    /// Contacts in transmission order; never empty
    hops: Vec<Contact>,
    /// First hop's receiving node
    pub neighbor: NodeId,
    /// Start time of the first contact
    pub from_time: i64,
    /// Earliest end time across all hops
    pub to_time: i64,
    /// Best-case arrival time at the destination
    ///
    /// Supplied by the enumerator and checked against the bundle's
    /// expiration before any PBAT work. Refined by a successful PBAT.
    pub arrival_time: i64,
    /// Probability the route's contacts all occur
    pub arrival_confidence: f32,
    /// Summed one-way light time (seconds)
    pub owlt_sum: u32,
    /// Earliest transmission opportunity on the first hop
    pub eto: i64,
    /// Predicted arrival time of the bundle's last byte
    pub pbat: i64,
    /// Smallest effective volume limit across hops
    pub route_volume_limit: f64,
    /// Classification tag; non-zero once evaluated in this pass
    pub check_value: CheckValue,
    /// Backlog not reforwarded by overbooking management
    pub committed: Scalar,
    /// Volume that would have to be bumped to admit the bundle
    pub overbooked: Scalar,
    /// Whether the enumerator already branched alternate routes from this one
    pub spurs_computed: bool,
}

impl Route {
    /// Build a route from its hops
    ///
    /// Derives the neighbor and time bounds. Enumerators must supply the
    /// arrival pre-estimate with [`Route::with_arrival`]. Without it the
    /// estimate is the first contact's start with no light time, so the
    /// deadline check is optimistic and late routes fail the PBAT instead.
    pub fn new(hops: Vec<Contact>) -> Result<Self, ContactPlanError> {
        let first = hops.first().ok_or(ContactPlanError::EmptyRoute)?;
        let neighbor = first.to_node;
        let from_time = first.from_time;
        let to_time = hops.iter().map(|c| c.to_time).min().unwrap_or(first.to_time);
        let arrival_confidence = hops.iter().map(|c| c.confidence).product();

        Ok(Self {
            num: 0,
            neighbor,
            from_time,
            to_time,
            arrival_time: from_time,
            arrival_confidence,
            owlt_sum: 0,
            eto: 0,
            pbat: 0,
            route_volume_limit: 0.0,
            check_value: CheckValue::Unchecked,
            committed: Scalar::ZERO,
            overbooked: Scalar::ZERO,
            spurs_computed: false,
            hops,
        })
    }

    /// Set the enumerator's sequence number
    pub fn with_num(mut self, num: u32) -> Self {
        self.num = num;
        self
    }

    /// Set the enumerator's arrival pre-estimates
    ///
    /// `arrival_time` is the best-case arrival at the destination and
    /// `owlt_sum` the light time summed over every hop.
    pub fn with_arrival(mut self, arrival_time: i64, owlt_sum: u32) -> Self {
        self.arrival_time = arrival_time;
        self.owlt_sum = owlt_sum;
        self
    }

    /// Contacts of the route, in order
    pub fn hops(&self) -> &[Contact] {
        &self.hops
    }

    /// First contact of the route
    pub fn first_hop(&self) -> &Contact {
        &self.hops[0]
    }

    /// Last contact of the route
    pub fn last_hop(&self) -> &Contact {
        &self.hops[self.hops.len() - 1]
    }

    /// Node the route delivers to
    pub fn destination(&self) -> NodeId {
        self.last_hop().to_node
    }

    /// Number of hops
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// Routes are never empty; provided for API symmetry
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Clear the per-pass annotations so the route can be evaluated again
    pub fn reset_check(&mut self) {
        self.check_value = CheckValue::Unchecked;
        self.committed = Scalar::ZERO;
        self.overbooked = Scalar::ZERO;
    }
}
