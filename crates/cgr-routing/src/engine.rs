//! Candidate-route engine
//!
//! The [`CandidateEngine`] is the entry point of the viability stage. It
//! owns handles to the contact plan, the queueing subsystem and the clock,
//! and drives a caller-owned [`PassSession`] through one or more calls of
//! [`CandidateEngine::get_candidate_routes`].
//!
//! ## Pass Flow
//!
//! 1. Clear the previous feedback subset
//! 2. Count local neighbors; cap the wanted count for non-critical bundles
//!    when routes per neighbor are limited
//! 3. Refresh excluded-neighbor suppression if the neighbor count changed
//! 4. Check every new route; viable routes become candidates, recoverable
//!    failures may become branch points
//! 5. Stop if the neighbor limit is reached, otherwise ask for more routes

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, debug_span, trace, warn};

use cgr_core::{BacklogSource, Bundle, CheckValue, Clock, ContactPlan, NodeId, Route};

use crate::config::CgrConfig;
use crate::delivery::DeliveryEstimator;
use crate::error::{PassError, RouteRejection, RoutingResult};
use crate::neighbors::RouteFlag;
use crate::session::{CandidateResult, PassSession, PassState, RouteId};
use crate::viability::ViabilityChecker;

/// Candidate-route engine for one local node
pub struct CandidateEngine<P, B, C> {
    /// Node routes start from
    local: NodeId,
    /// Contact plan queries
    plan: Arc<P>,
    /// Queueing subsystem queries
    backlog: Arc<B>,
    /// Time source
    clock: Arc<C>,
    /// Behavioral switches
    config: CgrConfig,
}

impl<P, B, C> CandidateEngine<P, B, C>
where
    P: ContactPlan,
    B: BacklogSource,
    C: Clock,
{
    /// Create an engine with the default configuration
    ///
    /// # Arguments
    /// * `local` - The node this engine routes from
    /// * `plan` - Contact plan queries
    /// * `backlog` - Queueing subsystem queries
    /// * `clock` - Time source
    pub fn new(local: NodeId, plan: Arc<P>, backlog: Arc<B>, clock: Arc<C>) -> Self {
        Self::with_config(local, plan, backlog, clock, CgrConfig::default())
    }

    /// Create an engine with a custom configuration
    pub fn with_config(
        local: NodeId,
        plan: Arc<P>,
        backlog: Arc<B>,
        clock: Arc<C>,
        config: CgrConfig,
    ) -> Self {
        for warning in config.validate() {
            warn!(%warning, "Questionable routing configuration");
        }
        Self {
            local,
            plan,
            backlog,
            clock,
            config,
        }
    }

    /// The local node
    pub fn local_node(&self) -> NodeId {
        self.local
    }

    /// The configuration
    pub fn config(&self) -> &CgrConfig {
        &self.config
    }

    /// The contact plan
    pub fn plan(&self) -> &P {
        self.plan.as_ref()
    }

    /// The queueing subsystem
    pub fn backlog(&self) -> &B {
        self.backlog.as_ref()
    }

    /// The clock
    pub fn clock(&self) -> &C {
        self.clock.as_ref()
    }

    /// Number of distinct next-hop neighbors of the local node
    pub fn local_neighbors_count(&self) -> usize {
        self.plan.local_neighbors_count(self.local)
    }

    /// A viability checker evaluating at `now`
    pub fn checker(&self, now: i64) -> ViabilityChecker<'_, P, B> {
        ViabilityChecker::new(DeliveryEstimator::new(
            self.plan.as_ref(),
            self.backlog.as_ref(),
            &self.config,
            now,
            self.local,
        ))
    }

    /// Check a single route at the current time
    ///
    /// For diagnostics. The route must belong to the caller's own pass.
    pub fn check_route(
        &self,
        bundle: &Bundle,
        excluded: &HashSet<NodeId>,
        route: &mut Route,
    ) -> Result<CheckValue, RouteRejection> {
        self.checker(self.clock.now()).check_route(bundle, excluded, route)
    }

    /// Evaluate newly computed routes and decide whether the pass is over
    ///
    /// Takes ownership of `computed`; the routes stay in `session` for the
    /// rest of the pass. Returns [`CandidateResult::Done`] when enough
    /// neighbors are covered, or [`CandidateResult::NeedMoreRoutes`] with
    /// the routes the enumerator should branch from next.
    ///
    /// A fatal error leaves the session in [`PassState::Failed`] with its
    /// partial results discarded.
    pub fn get_candidate_routes(
        &self,
        session: &mut PassSession,
        destination: NodeId,
        bundle: &Bundle,
        excluded: &HashSet<NodeId>,
        computed: Vec<Route>,
    ) -> RoutingResult<CandidateResult> {
        match session.state() {
            PassState::Failed => return Err(PassError::PassFailed),
            PassState::Done => return Err(PassError::PassConcluded),
            PassState::Accumulating | PassState::AwaitingMoreRoutes => {}
        }
        self.validate_routes(destination, &computed)?;

        let span = debug_span!(
            "candidate_routes",
            %destination,
            priority = ?bundle.priority,
            routes = computed.len()
        );
        let _enter = span.enter();

        match self.sweep(session, destination, bundle, excluded, computed) {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(error = %e, "Routing pass aborted");
                session.fail();
                Err(e)
            }
        }
    }

    fn validate_routes(&self, destination: NodeId, computed: &[Route]) -> RoutingResult<()> {
        for route in computed {
            let origin = route.first_hop().from_node;
            if origin != self.local {
                return Err(PassError::InvalidArgument(format!(
                    "route {} starts at {origin}, not at local node {}",
                    route.num, self.local
                )));
            }
            if route.destination() != destination {
                return Err(PassError::InvalidArgument(format!(
                    "route {} ends at {}, not at {destination}",
                    route.num,
                    route.destination()
                )));
            }
        }
        Ok(())
    }

    fn sweep(
        &self,
        session: &mut PassSession,
        destination: NodeId,
        bundle: &Bundle,
        excluded: &HashSet<NodeId>,
        computed: Vec<Route>,
    ) -> RoutingResult<CandidateResult> {
        session.clear_subset();

        let neighbors = self.plan.local_neighbors(self.local);
        session.register_neighbors(&neighbors);
        let max_neighbors = neighbors.len();
        let cap = self.config.max_routes_per_neighbor;
        let limit = if !bundle.critical && cap > 0 {
            max_neighbors.min(cap)
        } else {
            max_neighbors
        };

        if max_neighbors != session.last_max_neighbors {
            debug!(
                last = session.last_max_neighbors,
                current = max_neighbors,
                "Refreshing excluded neighbor suppression"
            );
            session.suppress_destination_excluded_neighbors(excluded, |node| {
                self.plan.is_local_neighbor(self.local, node)
                    && self.plan.is_destination_neighbor(destination, node)
            });
            session.last_max_neighbors = max_neighbors;
        }

        let checker = self.checker(self.clock.now());
        let mut accepted = 0usize;

        for route in computed {
            let neighbor = route.neighbor;
            let id = session.adopt(route);
            match checker.check_route(bundle, excluded, session.route_mut(id)) {
                Ok(check) => {
                    if self.config.one_candidate_per_neighbor {
                        if let Some(current) = session.candidate_for(&neighbor) {
                            self.resolve_duplicate(session, current, id, check);
                            continue;
                        }
                    }
                    session.manage_conversation(RouteFlag::Candidate, id, limit, max_neighbors)?;
                    session.push_candidate(id);
                    accepted += 1;
                }
                Err(rejection) if rejection.is_recoverable(&self.config) => {
                    trace!(
                        route = id.index(),
                        code = rejection.code(),
                        reason = %rejection,
                        "Route discarded"
                    );
                    session.manage_conversation(RouteFlag::Discarded, id, limit, max_neighbors)?;
                }
                Err(rejection) => {
                    trace!(
                        route = id.index(),
                        code = rejection.code(),
                        reason = %rejection,
                        "Route rejected"
                    );
                }
            }
        }
        debug!(accepted, "New candidate routes");

        let result = if session.limit_reached(limit, max_neighbors) {
            session.state = PassState::Done;
            CandidateResult::Done {
                count: session.candidate_count(),
            }
        } else {
            session.state = PassState::AwaitingMoreRoutes;
            CandidateResult::NeedMoreRoutes {
                subset: session.subset.clone(),
                missing_neighbors: limit.saturating_sub(session.neighbors_found),
            }
        };

        let missing = match &result {
            CandidateResult::Done { .. } => 0,
            CandidateResult::NeedMoreRoutes {
                missing_neighbors, ..
            } => *missing_neighbors,
        };
        debug!(
            found = session.neighbors_found,
            missing,
            suppressed = session.suppressed_count(),
            "Pass summary"
        );
        Ok(result)
    }

    /// Keep the better of two viable routes through the same neighbor
    fn resolve_duplicate(
        &self,
        session: &mut PassSession,
        current: RouteId,
        candidate: RouteId,
        check: CheckValue,
    ) {
        let current_check = session
            .route(current)
            .map(|r| r.check_value)
            .unwrap_or(CheckValue::Checked);
        if check < current_check {
            trace!(
                replaced = current.index(),
                by = candidate.index(),
                "Better candidate for neighbor"
            );
            session.replace_candidate(current, candidate);
        } else {
            trace!(route = candidate.index(), "Neighbor already has a candidate");
        }
    }
}
