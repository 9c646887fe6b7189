//! Neighbor bookkeeping and enumerator feedback
//!
//! Tracks which local neighbors already have a candidate route, which are
//! suppressed, and which non-viable routes are worth handing back to the
//! enumerator as branch points. The pass ends once every neighbor we want
//! is accounted for.

use std::collections::HashSet;

use tracing::trace;

use cgr_core::NodeId;

use crate::error::{PassError, RoutingResult};
use crate::session::{PassSession, RouteId};

/// How the viability checker judged a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteFlag {
    /// Viable, accepted as a candidate
    Candidate,
    /// Not viable, but the enumerator may branch from it
    Discarded,
}

/// Whether the pass can stop asking for routes
///
/// True once `limit` neighbors have a candidate, or once every one of the
/// `max_neighbors` neighbors is either found or suppressed.
pub fn reached_neighbors_limit(
    found: usize,
    suppressed: usize,
    limit: usize,
    max_neighbors: usize,
) -> bool {
    found >= limit || max_neighbors <= found + suppressed
}

impl PassSession {
    /// Whether this session has reached the neighbor limit
    pub fn limit_reached(&self, limit: usize, max_neighbors: usize) -> bool {
        reached_neighbors_limit(self.neighbors_found, self.suppressed.len(), limit, max_neighbors)
    }

    /// Update neighbor bookkeeping for a route the checker just judged
    ///
    /// Does nothing once the neighbor limit is reached. A route whose
    /// neighbor is not a known local neighbor is a fatal error.
    pub(crate) fn manage_conversation(
        &mut self,
        flag: RouteFlag,
        id: RouteId,
        limit: usize,
        max_neighbors: usize,
    ) -> RoutingResult<()> {
        if self.limit_reached(limit, max_neighbors) {
            return Ok(());
        }

        let neighbor = self.routes[id.0].neighbor;
        let flags = *self
            .neighbors
            .get(&neighbor)
            .ok_or(PassError::UnknownNeighbor(neighbor))?;

        match flag {
            RouteFlag::Candidate => {
                if flags.in_subset {
                    self.remove_neighbor_from_subset(neighbor);
                }
                self.update_neighbors_counter(id)
            }
            RouteFlag::Discarded => {
                if !flags.candidate_found {
                    self.insert_route_in_subset(id)?;
                }
                Ok(())
            }
        }
    }

    /// Count a newly accepted candidate toward its neighbor
    ///
    /// Failed-neighbor and closing-loop candidates suppress their neighbor
    /// instead, unless it already had a candidate.
    pub(crate) fn update_neighbors_counter(&mut self, id: RouteId) -> RoutingResult<()> {
        let route = &self.routes[id.0];
        let neighbor = route.neighbor;
        let check = route.check_value;
        let flags = self
            .neighbors
            .get_mut(&neighbor)
            .ok_or(PassError::UnknownNeighbor(neighbor))?;

        if check.suppresses_neighbor() {
            if !flags.candidate_found {
                self.suppressed.insert(neighbor);
                trace!(%neighbor, ?check, "Neighbor suppressed");
            }
        } else if !flags.candidate_found {
            self.neighbors_found += 1;
        }
        flags.candidate_found = true;
        Ok(())
    }

    /// Queue a non-viable route as a branch point
    ///
    /// Skipped when the enumerator already branched from the route, when
    /// its neighbor already has a candidate, or when another route through
    /// the same neighbor is already queued.
    pub(crate) fn insert_route_in_subset(&mut self, id: RouteId) -> RoutingResult<bool> {
        let route = &self.routes[id.0];
        if route.spurs_computed {
            return Ok(false);
        }
        let neighbor = route.neighbor;
        let flags = self
            .neighbors
            .get_mut(&neighbor)
            .ok_or(PassError::UnknownNeighbor(neighbor))?;
        if flags.candidate_found || flags.in_subset {
            return Ok(false);
        }

        flags.in_subset = true;
        self.subset.push(id);
        trace!(route = id.0, %neighbor, "Route queued in subset");
        Ok(true)
    }

    /// Drop every subset route through `neighbor`
    pub(crate) fn remove_neighbor_from_subset(&mut self, neighbor: NodeId) {
        let routes = &self.routes;
        self.subset.retain(|id| routes[id.0].neighbor != neighbor);
        if let Some(flags) = self.neighbors.get_mut(&neighbor) {
            flags.in_subset = false;
        }
    }

    /// Recompute which excluded neighbors count as suppressed
    ///
    /// Every excluded neighbor is first removed from the suppressed set,
    /// then re-added if `reaches_destination` holds for it.
    pub(crate) fn suppress_destination_excluded_neighbors(
        &mut self,
        excluded: &HashSet<NodeId>,
        reaches_destination: impl Fn(NodeId) -> bool,
    ) {
        for neighbor in excluded {
            self.suppressed.remove(neighbor);
        }
        for neighbor in excluded {
            if reaches_destination(*neighbor) {
                self.suppressed.insert(*neighbor);
            }
        }
    }

    /// Append a viable route to the candidate list
    pub(crate) fn push_candidate(&mut self, id: RouteId) {
        let neighbor = self.routes[id.0].neighbor;
        if let Some(flags) = self.neighbors.get_mut(&neighbor) {
            flags.candidate = Some(id);
        }
        self.candidates.push(id);
    }

    /// Candidate currently held for a neighbor
    pub(crate) fn candidate_for(&self, neighbor: &NodeId) -> Option<RouteId> {
        self.neighbors.get(neighbor).and_then(|flags| flags.candidate)
    }

    /// Put `replacement` in the candidate list where `current` was
    pub(crate) fn replace_candidate(&mut self, current: RouteId, replacement: RouteId) {
        if let Some(slot) = self.candidates.iter_mut().find(|id| **id == current) {
            *slot = replacement;
        }
        let neighbor = self.routes[replacement.0].neighbor;
        if let Some(flags) = self.neighbors.get_mut(&neighbor) {
            flags.candidate = Some(replacement);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgr_core::{CheckValue, Contact, Route};

    fn route(neighbor: u64, check: CheckValue) -> Route {
        let mut r = Route::new(vec![Contact::new(NodeId(1), NodeId(neighbor), 0, 10, 1)]).unwrap();
        r.check_value = check;
        r
    }

    fn session(neighbors: &[u64]) -> PassSession {
        let mut s = PassSession::new();
        let ids: Vec<NodeId> = neighbors.iter().map(|n| NodeId(*n)).collect();
        s.register_neighbors(&ids);
        s
    }

    #[test]
    fn test_reached_neighbors_limit() {
        assert!(reached_neighbors_limit(3, 0, 3, 5));
        // Every neighbor found or suppressed
        assert!(reached_neighbors_limit(2, 1, 3, 3));
        assert!(!reached_neighbors_limit(1, 1, 3, 3));
        assert!(reached_neighbors_limit(0, 0, 0, 0));
    }

    #[test]
    fn test_first_candidate_counts_once() {
        let mut s = session(&[2]);
        let a = s.adopt(route(2, CheckValue::NoLoop));
        let b = s.adopt(route(2, CheckValue::PossibleLoop));
        s.update_neighbors_counter(a).unwrap();
        s.update_neighbors_counter(b).unwrap();
        assert_eq!(s.neighbors_found(), 1);
        assert!(s.neighbor_flags(&NodeId(2)).unwrap().candidate_found);
    }

    #[test]
    fn test_closing_loop_suppresses() {
        let mut s = session(&[2]);
        let id = s.adopt(route(2, CheckValue::ClosingLoop));
        s.update_neighbors_counter(id).unwrap();
        assert_eq!(s.neighbors_found(), 0);
        assert!(s.is_suppressed(&NodeId(2)));
    }

    #[test]
    fn test_closing_loop_after_found_does_not_suppress() {
        let mut s = session(&[2]);
        let good = s.adopt(route(2, CheckValue::NoLoop));
        let bad = s.adopt(route(2, CheckValue::FailedNeighbor));
        s.update_neighbors_counter(good).unwrap();
        s.update_neighbors_counter(bad).unwrap();
        assert_eq!(s.neighbors_found(), 1);
        assert!(!s.is_suppressed(&NodeId(2)));
    }

    #[test]
    fn test_unknown_neighbor_is_fatal() {
        let mut s = session(&[2]);
        let id = s.adopt(route(7, CheckValue::NoLoop));
        let err = s.manage_conversation(RouteFlag::Candidate, id, 2, 2).unwrap_err();
        assert!(matches!(err, PassError::UnknownNeighbor(NodeId(7))));
    }

    #[test]
    fn test_subset_one_route_per_neighbor() {
        let mut s = session(&[2, 3]);
        let a = s.adopt(route(2, CheckValue::Checked));
        let b = s.adopt(route(2, CheckValue::Checked));
        let c = s.adopt(route(3, CheckValue::Checked));
        assert!(s.insert_route_in_subset(a).unwrap());
        assert!(!s.insert_route_in_subset(b).unwrap());
        assert!(s.insert_route_in_subset(c).unwrap());
        assert_eq!(s.subset().count(), 2);
    }

    #[test]
    fn test_subset_skips_branched_routes() {
        let mut s = session(&[2]);
        let mut r = route(2, CheckValue::Checked);
        r.spurs_computed = true;
        let id = s.adopt(r);
        assert!(!s.insert_route_in_subset(id).unwrap());
    }

    #[test]
    fn test_candidate_purges_subset() {
        let mut s = session(&[2, 3]);
        let discarded = s.adopt(route(2, CheckValue::Checked));
        let other = s.adopt(route(3, CheckValue::Checked));
        s.manage_conversation(RouteFlag::Discarded, discarded, 2, 2).unwrap();
        s.manage_conversation(RouteFlag::Discarded, other, 2, 2).unwrap();
        assert_eq!(s.subset().count(), 2);

        let viable = s.adopt(route(2, CheckValue::NoLoop));
        s.manage_conversation(RouteFlag::Candidate, viable, 2, 2).unwrap();
        let remaining: Vec<NodeId> = s.subset().map(|r| r.neighbor).collect();
        assert_eq!(remaining, vec![NodeId(3)]);
        assert!(!s.neighbor_flags(&NodeId(2)).unwrap().in_subset);

        // Neighbor 2 has a candidate now: no more subset entries for it
        let late = s.adopt(route(2, CheckValue::Checked));
        s.manage_conversation(RouteFlag::Discarded, late, 2, 2).unwrap();
        assert_eq!(s.subset().count(), 1);
    }

    #[test]
    fn test_nothing_managed_after_limit() {
        let mut s = session(&[2, 3]);
        let a = s.adopt(route(2, CheckValue::NoLoop));
        s.manage_conversation(RouteFlag::Candidate, a, 1, 2).unwrap();
        assert_eq!(s.neighbors_found(), 1);

        let b = s.adopt(route(3, CheckValue::NoLoop));
        s.manage_conversation(RouteFlag::Candidate, b, 1, 2).unwrap();
        assert_eq!(s.neighbors_found(), 1);
    }

    #[test]
    fn test_excluded_suppression_is_recomputed() {
        let mut s = session(&[2, 3]);
        let excluded = HashSet::from([NodeId(2), NodeId(3)]);
        s.suppress_destination_excluded_neighbors(&excluded, |n| n == NodeId(2));
        assert!(s.is_suppressed(&NodeId(2)));
        assert!(!s.is_suppressed(&NodeId(3)));

        s.suppress_destination_excluded_neighbors(&excluded, |n| n == NodeId(3));
        assert!(!s.is_suppressed(&NodeId(2)));
        assert!(s.is_suppressed(&NodeId(3)));
    }

    #[test]
    fn test_replace_candidate_keeps_position() {
        let mut s = session(&[2, 3]);
        let a = s.adopt(route(2, CheckValue::ClosingLoop));
        let b = s.adopt(route(3, CheckValue::NoLoop));
        s.push_candidate(a);
        s.push_candidate(b);
        let better = s.adopt(route(2, CheckValue::NoLoop));
        s.replace_candidate(a, better);

        assert_eq!(s.candidate_for(&NodeId(2)), Some(better));
        let checks: Vec<CheckValue> = s.candidates().map(|r| r.check_value).collect();
        assert_eq!(checks, vec![CheckValue::NoLoop, CheckValue::NoLoop]);
    }
}
