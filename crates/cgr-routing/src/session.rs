//! Per-pass session state
//!
//! A [`PassSession`] holds everything the engine accumulates while routing
//! one bundle: the routes received from the enumerator, the candidate list,
//! the feedback subset, the suppressed neighbors and the per-neighbor flags.
//! The caller owns it and hands it to every entry-point call of the pass.
//!
//! ## Lifecycle
//!
//! ```text
//! new() ──► Accumulating ──► AwaitingMoreRoutes ◄──┐
//!               │                  │     └─────────┘
//!               ▼                  ▼
//!              Done              Failed
//! ```
//!
//! [`PassSession::reset`] returns to `Accumulating` from any state.
//! Routes are kept in an arena and referenced by [`RouteId`], so the
//! candidate list and the subset never alias each other's storage.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use cgr_core::{NodeId, Route};

/// Handle to a route held by a [`PassSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteId(pub(crate) usize);

impl RouteId {
    /// Position in the session's route arena
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Where a pass stands in the conversation with the enumerator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PassState {
    /// Fresh pass, no call made yet
    #[default]
    Accumulating,
    /// The engine asked the enumerator for more routes
    AwaitingMoreRoutes,
    /// The candidate list is final
    Done,
    /// A fatal error discarded the pass
    Failed,
}

/// Session-scoped flags of a local neighbor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeighborFlags {
    /// A candidate route through this neighbor was found in this pass
    pub candidate_found: bool,
    /// A route through this neighbor is queued in the feedback subset
    pub in_subset: bool,
    /// The candidate currently held for this neighbor
    pub(crate) candidate: Option<RouteId>,
}

/// Outcome of one entry-point call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateResult {
    /// The pass is over; the session holds `count` candidates
    Done { count: usize },
    /// Compute more routes, branching from `subset`, for `missing_neighbors` neighbors
    NeedMoreRoutes {
        subset: Vec<RouteId>,
        missing_neighbors: usize,
    },
}

impl CandidateResult {
    /// Whether the pass is over
    pub fn is_done(&self) -> bool {
        matches!(self, CandidateResult::Done { .. })
    }
}

/// Mutable state of one routing pass
#[derive(Debug, Default)]
pub struct PassSession {
    /// Every route received in this pass
    pub(crate) routes: Vec<Route>,
    /// Viable routes, in insertion order
    pub(crate) candidates: Vec<RouteId>,
    /// Non-viable routes the enumerator may branch from
    pub(crate) subset: Vec<RouteId>,
    /// Neighbors that count toward termination without being found
    pub(crate) suppressed: HashSet<NodeId>,
    /// Flags of every known local neighbor
    pub(crate) neighbors: HashMap<NodeId, NeighborFlags>,
    /// Neighbors with at least one candidate
    pub(crate) neighbors_found: usize,
    /// Neighbor count seen by the previous call
    pub(crate) last_max_neighbors: usize,
    pub(crate) state: PassState,
}

impl PassSession {
    /// Start a new pass
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all state and start over
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Current state
    pub fn state(&self) -> PassState {
        self.state
    }

    /// A route received in this pass
    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(id.0)
    }

    /// Candidate routes, in the order they were accepted
    pub fn candidates(&self) -> impl Iterator<Item = &Route> {
        self.candidates.iter().map(|id| &self.routes[id.0])
    }

    /// Number of candidate routes
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Routes queued in the feedback subset, in insertion order
    pub fn subset(&self) -> impl Iterator<Item = &Route> {
        self.subset.iter().map(|id| &self.routes[id.0])
    }

    /// Mutable access to the subset routes, for the enumerator to branch from
    pub fn subset_routes_mut(&mut self) -> Vec<&mut Route> {
        let mut slots: Vec<Option<&mut Route>> = self.routes.iter_mut().map(Some).collect();
        self.subset
            .iter()
            .filter_map(|id| slots.get_mut(id.0).and_then(Option::take))
            .collect()
    }

    /// Neighbors with at least one candidate
    pub fn neighbors_found(&self) -> usize {
        self.neighbors_found
    }

    /// Number of suppressed neighbors
    pub fn suppressed_count(&self) -> usize {
        self.suppressed.len()
    }

    /// Whether a neighbor is suppressed
    pub fn is_suppressed(&self, neighbor: &NodeId) -> bool {
        self.suppressed.contains(neighbor)
    }

    /// Flags of a known neighbor
    pub fn neighbor_flags(&self, neighbor: &NodeId) -> Option<&NeighborFlags> {
        self.neighbors.get(neighbor)
    }

    /// Conclude the pass and take its candidates
    pub fn into_candidates(mut self) -> Vec<Route> {
        let mut slots: Vec<Option<Route>> = self.routes.drain(..).map(Some).collect();
        self.candidates
            .iter()
            .filter_map(|id| slots.get_mut(id.0).and_then(Option::take))
            .collect()
    }

    /// Make sure every current local neighbor has flags
    pub(crate) fn register_neighbors(&mut self, neighbors: &[NodeId]) {
        for neighbor in neighbors {
            self.neighbors.entry(*neighbor).or_default();
        }
    }

    /// Take ownership of a route for the rest of the pass
    pub(crate) fn adopt(&mut self, route: Route) -> RouteId {
        self.routes.push(route);
        RouteId(self.routes.len() - 1)
    }

    pub(crate) fn route_mut(&mut self, id: RouteId) -> &mut Route {
        &mut self.routes[id.0]
    }

    /// Empty the feedback subset left by the previous call
    pub(crate) fn clear_subset(&mut self) {
        self.subset.clear();
        for flags in self.neighbors.values_mut() {
            flags.in_subset = false;
        }
    }

    /// Discard partial results after a fatal error
    pub(crate) fn fail(&mut self) {
        self.candidates.clear();
        self.subset.clear();
        self.state = PassState::Failed;
    }
}
