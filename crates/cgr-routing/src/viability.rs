//! Per-route feasibility gate
//!
//! [`ViabilityChecker::check_route`] runs a route through a fixed sequence
//! of short-circuiting checks and leaves the route tagged as checked either
//! way, so a route is evaluated at most once per pass.

use std::collections::HashSet;

use tracing::trace;

use cgr_core::{BacklogSource, Bundle, CheckValue, ContactPlan, NodeId, Route};

use crate::delivery::DeliveryEstimator;
use crate::error::RouteRejection;
use crate::loop_guard;

/// Viability checker bound to one evaluation instant
pub struct ViabilityChecker<'a, P: ?Sized, B: ?Sized> {
    estimator: DeliveryEstimator<'a, P, B>,
}

impl<'a, P, B> ViabilityChecker<'a, P, B>
where
    P: ContactPlan + ?Sized,
    B: BacklogSource + ?Sized,
{
    /// Create a checker around a delivery-time estimator
    pub fn new(estimator: DeliveryEstimator<'a, P, B>) -> Self {
        Self { estimator }
    }

    /// The underlying estimator
    pub fn estimator(&self) -> &DeliveryEstimator<'a, P, B> {
        &self.estimator
    }

    /// Decide whether `route` can carry `bundle`
    ///
    /// Gates, in order: terminated, deadline, confidence (unless
    /// neglected), self-loop, excluded neighbor, PBAT. A viable route is
    /// then classified by the loop guard when loop avoidance is on.
    ///
    /// Returns the route's classification on success.
    pub fn check_route(
        &self,
        bundle: &Bundle,
        excluded: &HashSet<NodeId>,
        route: &mut Route,
    ) -> Result<CheckValue, RouteRejection> {
        if route.check_value.is_checked() {
            return Err(RouteRejection::AlreadyChecked);
        }
        route.check_value = CheckValue::Checked;

        let config = self.estimator.config();
        let now = self.estimator.now();
        let local = self.estimator.local_node();

        if route.to_time <= now {
            return Err(RouteRejection::Terminated);
        }
        if route.arrival_time > bundle.expiration_time {
            return Err(RouteRejection::Deadline);
        }
        if !config.neglect_confidence {
            if route.first_hop().confidence < 1.0 {
                return Err(RouteRejection::UncertainFirstContact);
            }
            if low_delivery_confidence(
                bundle.dlv_confidence,
                route.arrival_confidence,
                config.min_confidence_improvement,
            ) {
                return Err(RouteRejection::LowDeliveryConfidence);
            }
        }
        if route.neighbor == local && bundle.terminus_node != local {
            return Err(RouteRejection::SelfLoop);
        }
        if excluded.contains(&route.neighbor) {
            return Err(RouteRejection::ExcludedNeighbor(route.neighbor));
        }

        self.estimator.compute_pbat(route, bundle)?;

        if config.loop_avoidance.is_enabled() {
            route.check_value = loop_guard::classify(route, bundle, config.loop_avoidance);
        }
        trace!(
            route = route.num,
            neighbor = %route.neighbor,
            pbat = route.pbat,
            check = ?route.check_value,
            "Route viable"
        );
        Ok(route.check_value)
    }
}

/// Whether a route adds too little to the bundle's delivery confidence
///
/// Only applies once some confidence has been achieved and before it is
/// certain.
pub fn low_delivery_confidence(bundle_confidence: f32, route_confidence: f32, minimum: f32) -> bool {
    if bundle_confidence <= 0.0 || bundle_confidence >= 1.0 {
        return false;
    }
    let failure = (1.0 - bundle_confidence) * (1.0 - route_confidence);
    let improvement = (1.0 - failure) / bundle_confidence - 1.0;
    improvement < minimum
}
