//! Loop detection for viable routes
//!
//! Two independent mechanisms, both driven by what the bundle carries:
//!
//! - **Reactive**: forwarding toward the route's neighbor already failed
//! - **Proactive**: the route passes through a node on the bundle's trail
//!
//! Classification never changes whether a route is viable. It only tells
//! the neighbor bookkeeping whether the neighbor counts as found or as
//! suppressed, and gives route selection a preference order.

use cgr_core::{Bundle, CheckValue, Route};

use crate::config::LoopAvoidance;

/// Classify a viable route
///
/// Returns [`CheckValue::NoLoop`] when neither mechanism fires. The
/// reactive check wins over the proactive one. The last hop's receiving
/// node is the destination and is never treated as a loop.
pub fn classify(route: &Route, bundle: &Bundle, mode: LoopAvoidance) -> CheckValue {
    if mode.reactive && bundle.has_failed_toward(&route.neighbor) {
        return CheckValue::FailedNeighbor;
    }

    if mode.proactive {
        let intermediate = &route.hops()[..route.len() - 1];
        if let Some(position) = intermediate
            .iter()
            .position(|c| bundle.has_visited(&c.to_node))
        {
            return if position == 0 {
                CheckValue::ClosingLoop
            } else {
                CheckValue::PossibleLoop
            };
        }
    }

    CheckValue::NoLoop
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgr_core::{Contact, NodeId};

    fn route(path: &[u64]) -> Route {
        let hops = path
            .windows(2)
            .map(|w| Contact::new(NodeId(w[0]), NodeId(w[1]), 0, 100, 10))
            .collect();
        Route::new(hops).unwrap()
    }

    fn bundle() -> Bundle {
        Bundle::new(NodeId(9), 10, 1000)
    }

    #[test]
    fn test_no_loop() {
        let r = route(&[1, 2, 3, 9]);
        assert_eq!(classify(&r, &bundle(), LoopAvoidance::enabled()), CheckValue::NoLoop);
    }

    #[test]
    fn test_failed_neighbor() {
        let mut b = bundle();
        b.add_failed_neighbor(NodeId(2));
        let r = route(&[1, 2, 9]);
        assert_eq!(classify(&r, &b, LoopAvoidance::enabled()), CheckValue::FailedNeighbor);

        let proactive_only = LoopAvoidance {
            reactive: false,
            proactive: true,
        };
        assert_eq!(classify(&r, &b, proactive_only), CheckValue::NoLoop);
    }

    #[test]
    fn test_closing_loop_on_next_hop() {
        let mut b = bundle();
        b.add_visited(NodeId(2));
        let r = route(&[1, 2, 3, 9]);
        assert_eq!(classify(&r, &b, LoopAvoidance::enabled()), CheckValue::ClosingLoop);
    }

    #[test]
    fn test_possible_loop_further_down() {
        let mut b = bundle();
        b.add_visited(NodeId(3));
        let r = route(&[1, 2, 3, 9]);
        assert_eq!(classify(&r, &b, LoopAvoidance::enabled()), CheckValue::PossibleLoop);
    }

    #[test]
    fn test_destination_never_a_loop() {
        let mut b = bundle();
        b.add_visited(NodeId(9));
        let r = route(&[1, 2, 9]);
        assert_eq!(classify(&r, &b, LoopAvoidance::enabled()), CheckValue::NoLoop);

        // Single hop route: the only node is the destination
        let direct = route(&[1, 9]);
        assert_eq!(classify(&direct, &b, LoopAvoidance::enabled()), CheckValue::NoLoop);
    }

    #[test]
    fn test_disabled_reports_no_loop() {
        let mut b = bundle();
        b.add_visited(NodeId(2));
        b.add_failed_neighbor(NodeId(2));
        let r = route(&[1, 2, 9]);
        assert_eq!(classify(&r, &b, LoopAvoidance::disabled()), CheckValue::NoLoop);
    }
}
