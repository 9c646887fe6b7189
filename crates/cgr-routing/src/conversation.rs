//! Conversation with the route enumerator
//!
//! The enumerator computes routes through the contact graph; the engine
//! judges them. When too few neighbors are covered the engine hands back
//! a subset of non-viable routes and the enumerator branches new routes
//! from them. [`run_conversation`] drives that exchange to completion.

use std::collections::HashSet;

use tracing::debug;

use cgr_core::{BacklogSource, Bundle, Clock, ContactPlan, NodeId, Route};

use crate::engine::CandidateEngine;
use crate::error::RoutingResult;
use crate::session::{CandidateResult, PassSession};

/// Source of computed routes
///
/// Implementations set `spurs_computed` on every subset route they branch
/// from, so the engine does not offer it again.
pub trait RouteEnumerator {
    /// Compute new routes toward `destination`
    ///
    /// `subset` holds routes to branch from and `missing_neighbors` the
    /// number of neighbors still lacking a candidate. An empty result ends
    /// the conversation.
    fn compute_routes(
        &mut self,
        destination: NodeId,
        subset: &mut [&mut Route],
        missing_neighbors: usize,
    ) -> Vec<Route>;
}

/// Run a full routing pass and return its candidate routes
///
/// Stops when the engine reports the pass done, when no neighbor is
/// missing, or when the enumerator has nothing more to offer. A local node
/// without neighbors yields no candidates without consulting either side.
pub fn run_conversation<P, B, C, E>(
    engine: &CandidateEngine<P, B, C>,
    session: &mut PassSession,
    enumerator: &mut E,
    destination: NodeId,
    bundle: &Bundle,
    excluded: &HashSet<NodeId>,
) -> RoutingResult<Vec<Route>>
where
    P: ContactPlan,
    B: BacklogSource,
    C: Clock,
    E: RouteEnumerator + ?Sized,
{
    if engine.local_neighbors_count() == 0 {
        debug!(%destination, "Local node has no neighbors");
        return Ok(Vec::new());
    }

    let mut computed = Vec::new();
    let mut rounds = 0usize;
    loop {
        rounds += 1;
        let result =
            engine.get_candidate_routes(session, destination, bundle, excluded, computed)?;
        match result {
            CandidateResult::Done { .. } => break,
            CandidateResult::NeedMoreRoutes {
                missing_neighbors: 0,
                ..
            } => break,
            CandidateResult::NeedMoreRoutes {
                missing_neighbors, ..
            } => {
                let mut subset = session.subset_routes_mut();
                computed = enumerator.compute_routes(destination, &mut subset, missing_neighbors);
                if computed.is_empty() {
                    debug!(rounds, "Enumerator has no more routes");
                    break;
                }
            }
        }
    }

    debug!(rounds, candidates = session.candidate_count(), "Conversation finished");
    Ok(session.candidates().cloned().collect())
}
