//! Delivery-time estimation
//!
//! Implements the SABR delivery-time bound for a single route: how long the
//! bundle waits behind the backlog already queued toward the neighbor, when
//! its first and last bytes leave, and when the last byte reaches the end
//! of the route.
//!
//! ## Algorithm
//!
//! 1. **Applicable backlog**: ask the queueing subsystem what is queued
//!    ahead of the bundle; the total becomes the route's committed volume
//! 2. **Residual backlog**: contacts to the neighbor that end before the
//!    route's first contact drain part of that backlog
//! 3. **ETO**: the first byte leaves once the residual backlog is drained
//! 4. **Per-hop propagation**: each hop adds light time plus a relative
//!    motion margin, and must carry the whole bundle within its effective
//!    volume limit
//!
//! Volume arithmetic uses [`Scalar`]; an underflow clamps to zero.

use tracing::trace;

use cgr_core::{BacklogSource, Bundle, Contact, ContactPlan, NodeId, Priority, Route, Scalar};

use crate::config::CgrConfig;
use crate::error::DeliveryError;

/// Backlog left ahead of the bundle at the start of the route's first contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResidualBacklog {
    /// Backlog still queued when the route's first contact starts
    pub residual: Scalar,
    /// Committed volume absorbed by the last contact examined
    pub allotment: Scalar,
    /// Applicable volume of the last contact examined
    pub volume: Scalar,
}

/// Per-hop results of a successful estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryEstimate {
    /// First byte transmission time on the first hop
    pub eto: i64,
    /// Arrival time of the last byte at the end of the route
    pub last_byte_arrival: i64,
    /// Refined best-case arrival time
    pub arrival_time: i64,
    /// Summed light time including margins
    pub owlt_sum: u32,
    /// Smallest effective volume limit across hops
    pub route_volume_limit: f64,
}

/// Delivery-time estimator bound to one evaluation instant
pub struct DeliveryEstimator<'a, P: ?Sized, B: ?Sized> {
    plan: &'a P,
    backlog: &'a B,
    config: &'a CgrConfig,
    now: i64,
    local: NodeId,
}

impl<'a, P, B> DeliveryEstimator<'a, P, B>
where
    P: ContactPlan + ?Sized,
    B: BacklogSource + ?Sized,
{
    /// Create an estimator evaluating routes at `now` from `local`
    pub fn new(plan: &'a P, backlog: &'a B, config: &'a CgrConfig, now: i64, local: NodeId) -> Self {
        Self {
            plan,
            backlog,
            config,
            now,
            local,
        }
    }

    /// Evaluation instant
    pub fn now(&self) -> i64 {
        self.now
    }

    /// Node the routes start from
    pub fn local_node(&self) -> NodeId {
        self.local
    }

    /// Engine configuration
    pub fn config(&self) -> &CgrConfig {
        self.config
    }

    /// Compute the PBAT of a route and annotate it
    ///
    /// On success the route's `committed`, `overbooked`, `eto`, `pbat`,
    /// `route_volume_limit`, `arrival_time` and `owlt_sum` are filled.
    /// `committed` and `overbooked` are written even when a later step fails.
    pub fn compute_pbat(&self, route: &mut Route, bundle: &Bundle) -> Result<(), DeliveryError> {
        let backlog = self
            .backlog
            .applicable_backlog(route.neighbor, bundle.priority, bundle.ordinal)?;
        route.committed = backlog.total;

        let residual = self.compute_residual_backlog(route, backlog.applicable)?;

        let mut overbooked = residual.allotment;
        overbooked.add(&Scalar::from(bundle.evc));
        overbooked.subtract(&residual.volume);
        overbooked.clamp_to_zero();
        route.overbooked = overbooked;

        let pbat = self.compute_expected_delivery_time(route, bundle, &residual.residual)?;
        if pbat > bundle.expiration_time {
            return Err(DeliveryError::ArrivesAfterExpiration {
                pbat,
                expiration: bundle.expiration_time,
            });
        }
        route.pbat = pbat;
        Ok(())
    }

    /// Project the applicable backlog forward to the route's first contact
    ///
    /// Walks the contacts from the local node to the route's neighbor in
    /// start-time order, up to and including the route's first contact.
    /// Reduces `route.committed` by each contact's volume.
    pub fn compute_residual_backlog(
        &self,
        route: &mut Route,
        applicable: Scalar,
    ) -> Result<ResidualBacklog, DeliveryError> {
        let mut allotment = Scalar::ZERO;
        let mut volume = Scalar::ZERO;
        let mut relief = Scalar::ZERO;
        let mut found = false;

        for contact in self.plan.contacts_between(self.local, route.neighbor) {
            if contact.from_time > route.from_time {
                break;
            }
            found = true;

            let start = self.now.max(contact.from_time);
            volume = Scalar::new(contact.to_time.saturating_sub(start).max(0));
            volume.multiply(rate_as_i64(contact.xmit_rate));

            // Overbooking: the contact absorbs at most its own volume
            let mut remainder = volume;
            remainder.subtract(&route.committed);
            allotment = if remainder.is_valid() {
                route.committed
            } else {
                volume
            };
            route.committed.saturating_subtract(&volume);

            if contact.from_time >= route.from_time {
                break;
            }
            relief.add(&volume);
        }

        if !found {
            return Err(DeliveryError::NoPriorContact {
                neighbor: route.neighbor,
                from_time: route.from_time,
            });
        }

        let mut residual = applicable;
        residual.saturating_subtract(&relief);
        Ok(ResidualBacklog {
            residual,
            allotment,
            volume,
        })
    }

    /// Compute the last-byte arrival time along the route
    ///
    /// Updates the route's `eto`, `route_volume_limit`, `arrival_time` and
    /// `owlt_sum` on success.
    pub fn compute_expected_delivery_time(
        &self,
        route: &mut Route,
        bundle: &Bundle,
        residual_backlog: &Scalar,
    ) -> Result<i64, DeliveryError> {
        let estimate = self.estimate(route.hops(), bundle, residual_backlog)?;

        route.eto = estimate.eto;
        route.route_volume_limit = estimate.route_volume_limit;
        route.arrival_time = estimate.arrival_time;
        route.owlt_sum = estimate.owlt_sum;
        Ok(estimate.last_byte_arrival)
    }

    fn estimate(
        &self,
        hops: &[Contact],
        bundle: &Bundle,
        residual_backlog: &Scalar,
    ) -> Result<DeliveryEstimate, DeliveryError> {
        let priority = bundle.priority;
        let evc = Scalar::from(bundle.evc);
        let first = &hops[0];
        let rate = nonzero_rate(first)?;

        let start = self.now.max(first.from_time);
        let eto = start.saturating_add(radiation_latency(residual_backlog, rate));

        let mut arrival_time = start;
        let mut owlt_sum: u32 = 0;
        let mut first_byte_tx = eto;
        let mut last_byte_tx = first_byte_tx.saturating_add(radiation_latency(&evc, rate));
        let mut last_byte_arrival = 0;
        let mut route_volume_limit = f64::MAX;

        // Times saturate at i64::MAX, which no contact outlasts
        for (index, contact) in hops.iter().enumerate() {
            // Fragmentation is not modeled
            if last_byte_tx > contact.to_time {
                return Err(DeliveryError::ContactMissed {
                    last_byte_tx,
                    to_time: contact.to_time,
                });
            }

            let owlt = self
                .plan
                .applicable_range(contact.from_node, contact.to_node, first_byte_tx)?;
            let margin = self.config.owlt_margin(owlt);
            let latency = i64::from(owlt) + i64::from(margin);

            last_byte_arrival = last_byte_tx.saturating_add(latency);
            owlt_sum = owlt_sum.saturating_add(owlt.saturating_add(margin));
            arrival_time = if arrival_time > contact.from_time {
                arrival_time.saturating_add(latency)
            } else {
                contact.from_time.saturating_add(latency)
            };

            if contact.residual_volume(priority) <= 0.0 {
                return Err(DeliveryError::NoResidualVolume {
                    from: contact.from_node,
                    to: contact.to_node,
                });
            }

            let limit = compute_effective_volume_limit(hops, index, priority, first_byte_tx)?;
            if limit < bundle.evc as f64 {
                return Err(DeliveryError::VolumeLimitTooSmall {
                    limit,
                    evc: bundle.evc,
                });
            }
            route_volume_limit = route_volume_limit.min(limit);

            if let Some(next) = hops.get(index + 1) {
                let rate = nonzero_rate(next)?;
                let earliest = if self.config.queue_delay {
                    next.from_time.saturating_add(queue_delay(next, priority))
                } else {
                    next.from_time
                };
                first_byte_tx = last_byte_arrival.max(earliest);
                last_byte_tx = first_byte_tx.saturating_add(radiation_latency(&evc, rate));
            }
        }

        trace!(eto, last_byte_arrival, owlt_sum, "Delivery estimate");
        Ok(DeliveryEstimate {
            eto,
            last_byte_arrival,
            arrival_time,
            owlt_sum,
            route_volume_limit,
        })
    }
}

/// Effective volume limit of the hop at `index`
///
/// The lesser of the contact's residual volume at `priority` and what it
/// can transmit between `first_byte_tx` and the earliest end time of this
/// and all later hops. Fails with [`DeliveryError::HopOutOfRange`] when
/// `index` is past the last hop.
pub fn compute_effective_volume_limit(
    hops: &[Contact],
    index: usize,
    priority: Priority,
    first_byte_tx: i64,
) -> Result<f64, DeliveryError> {
    let later = hops.get(index..).unwrap_or_default();
    let contact = later.first().ok_or(DeliveryError::HopOutOfRange {
        index,
        hops: hops.len(),
    })?;
    let stop = later
        .iter()
        .map(|c| c.to_time)
        .min()
        .unwrap_or(contact.to_time);

    let duration = stop.saturating_sub(first_byte_tx);
    if duration <= 0 {
        return Err(DeliveryError::NoEffectiveDuration {
            stop,
            first_byte_tx,
        });
    }

    let limit = duration as f64 * contact.xmit_rate as f64;
    Ok(limit.min(contact.residual_volume(priority)))
}

/// Seconds spent queued on a contact, from its reserved volume
fn queue_delay(contact: &Contact, priority: Priority) -> i64 {
    let reserved = contact.nominal_volume() - contact.residual_volume(priority);
    (reserved / contact.xmit_rate as f64) as i64
}

/// Seconds needed to transmit `volume` at `rate`
fn radiation_latency(volume: &Scalar, rate: i64) -> i64 {
    let mut latency = *volume;
    latency.divide(rate);
    latency.as_i64()
}

fn nonzero_rate(contact: &Contact) -> Result<i64, DeliveryError> {
    if contact.xmit_rate == 0 {
        return Err(DeliveryError::ZeroTransmitRate {
            from: contact.from_node,
            to: contact.to_node,
        });
    }
    Ok(rate_as_i64(contact.xmit_rate))
}

fn rate_as_i64(rate: u64) -> i64 {
    i64::try_from(rate).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgr_core::{ContactPlanError, MemoryBacklog, MemoryContactPlan, Range};

    const LOCAL: NodeId = NodeId(1);
    const NEIGHBOR: NodeId = NodeId(2);
    const DEST: NodeId = NodeId(3);

    fn plan_with(contacts: &[Contact]) -> MemoryContactPlan {
        let mut plan = MemoryContactPlan::new();
        for c in contacts {
            plan.add_contact(c.clone()).unwrap();
            plan.add_range(Range::new(c.from_node, c.to_node, 0, 10_000, 1));
        }
        plan
    }

    fn backlog_with(bytes: u64) -> MemoryBacklog {
        let backlog = MemoryBacklog::new();
        backlog.open_plan(NEIGHBOR);
        if bytes > 0 {
            backlog.enqueue(NEIGHBOR, Priority::Normal, 0, bytes);
        }
        backlog
    }

    #[test]
    fn test_single_hop_no_backlog() {
        let c = Contact::new(LOCAL, NEIGHBOR, 0, 100, 1000);
        let plan = plan_with(&[c.clone()]);
        let backlog = backlog_with(0);
        let config = CgrConfig::default();
        let estimator = DeliveryEstimator::new(&plan, &backlog, &config, 0, LOCAL);

        let mut route = Route::new(vec![c]).unwrap();
        let bundle = Bundle::new(NEIGHBOR, 500, 1000);
        estimator.compute_pbat(&mut route, &bundle).unwrap();

        assert_eq!(route.eto, 0);
        assert_eq!(route.pbat, 1);
        assert_eq!(route.arrival_time, 1);
        assert_eq!(route.owlt_sum, 1);
        assert_eq!(route.route_volume_limit, 100_000.0);
        assert!(route.committed.is_zero());
        assert!(route.overbooked.is_zero());
    }

    #[test]
    fn test_backlog_delays_eto() {
        let c = Contact::new(LOCAL, NEIGHBOR, 0, 100, 1000);
        let plan = plan_with(&[c.clone()]);
        let backlog = backlog_with(2000);
        let config = CgrConfig::default();
        let estimator = DeliveryEstimator::new(&plan, &backlog, &config, 0, LOCAL);

        let mut route = Route::new(vec![c]).unwrap();
        estimator
            .compute_pbat(&mut route, &Bundle::new(NEIGHBOR, 500, 1000))
            .unwrap();
        assert_eq!(route.eto, 2);
        assert_eq!(route.pbat, 3);
    }

    #[test]
    fn test_earlier_contact_relieves_backlog() {
        let early = Contact::new(LOCAL, NEIGHBOR, 0, 10, 100);
        let first = Contact::new(LOCAL, NEIGHBOR, 20, 100, 1000);
        let plan = plan_with(&[early, first.clone()]);
        let backlog = backlog_with(3000);
        let config = CgrConfig::default();
        let estimator = DeliveryEstimator::new(&plan, &backlog, &config, 0, LOCAL);

        let mut route = Route::new(vec![first]).unwrap();
        route.committed = Scalar::new(3000);
        let residual = estimator
            .compute_residual_backlog(&mut route, Scalar::new(3000))
            .unwrap();

        assert_eq!(residual.residual.as_i64(), 2000);
        assert_eq!(residual.volume.as_i64(), 80_000);
        assert_eq!(residual.allotment.as_i64(), 2000);
        assert!(route.committed.is_zero());
    }

    #[test]
    fn test_no_prior_contact() {
        let plan = MemoryContactPlan::new();
        let backlog = backlog_with(0);
        let config = CgrConfig::default();
        let estimator = DeliveryEstimator::new(&plan, &backlog, &config, 0, LOCAL);

        let mut route = Route::new(vec![Contact::new(LOCAL, NEIGHBOR, 0, 100, 1000)]).unwrap();
        let err = estimator
            .compute_residual_backlog(&mut route, Scalar::ZERO)
            .unwrap_err();
        assert!(matches!(err, DeliveryError::NoPriorContact { .. }));
    }

    #[test]
    fn test_overbooking_conserves_volume() {
        let c = Contact::new(LOCAL, NEIGHBOR, 0, 10, 100);
        let plan = plan_with(&[c.clone()]);
        let backlog = backlog_with(900);
        let config = CgrConfig::default();
        let estimator = DeliveryEstimator::new(&plan, &backlog, &config, 0, LOCAL);

        let mut route = Route::new(vec![c]).unwrap();
        let bundle = Bundle::new(NEIGHBOR, 500, 1000);
        let err = estimator.compute_pbat(&mut route, &bundle).unwrap_err();

        assert!(matches!(err, DeliveryError::ContactMissed { .. }));
        assert_eq!(route.overbooked.as_i64(), 400);
        assert!(route.committed.as_i64() + route.overbooked.as_i64() <= 900 + 500);
    }

    #[test]
    fn test_missing_backlog_plan() {
        let c = Contact::new(LOCAL, NEIGHBOR, 0, 100, 1000);
        let plan = plan_with(&[c.clone()]);
        let backlog = MemoryBacklog::new();
        let config = CgrConfig::default();
        let estimator = DeliveryEstimator::new(&plan, &backlog, &config, 0, LOCAL);

        let mut route = Route::new(vec![c]).unwrap();
        let err = estimator
            .compute_pbat(&mut route, &Bundle::new(NEIGHBOR, 500, 1000))
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Backlog(_)));
    }

    #[test]
    fn test_two_hops_with_queue_delay() {
        let first = Contact::new(LOCAL, NEIGHBOR, 0, 100, 1000);
        // 5000 bytes already reserved on the second hop: 5 s of queueing
        let second = Contact::new(NEIGHBOR, DEST, 10, 100, 1000).with_mtv([85_000.0; 3]);
        let plan = plan_with(&[first.clone(), second.clone()]);
        let backlog = backlog_with(0);
        let bundle = Bundle::new(DEST, 500, 1000);

        let config = CgrConfig::default();
        let estimator = DeliveryEstimator::new(&plan, &backlog, &config, 0, LOCAL);
        let mut route = Route::new(vec![first.clone(), second.clone()]).unwrap();
        estimator.compute_pbat(&mut route, &bundle).unwrap();
        // First byte leaves the second hop at 10 + 5, arrives 1 s later
        assert_eq!(route.pbat, 16);
        assert_eq!(route.owlt_sum, 2);
        assert_eq!(route.arrival_time, 11);

        let config = CgrConfig {
            queue_delay: false,
            ..CgrConfig::default()
        };
        let estimator = DeliveryEstimator::new(&plan, &backlog, &config, 0, LOCAL);
        let mut route = Route::new(vec![first, second]).unwrap();
        estimator.compute_pbat(&mut route, &bundle).unwrap();
        assert_eq!(route.pbat, 11);
    }

    #[test]
    fn test_pbat_after_expiration() {
        let c = Contact::new(LOCAL, NEIGHBOR, 50, 100, 1000);
        let plan = plan_with(&[c.clone()]);
        let backlog = backlog_with(0);
        let config = CgrConfig::default();
        let estimator = DeliveryEstimator::new(&plan, &backlog, &config, 0, LOCAL);

        let mut route = Route::new(vec![c]).unwrap();
        let err = estimator
            .compute_pbat(&mut route, &Bundle::new(NEIGHBOR, 500, 40))
            .unwrap_err();
        assert!(matches!(err, DeliveryError::ArrivesAfterExpiration { pbat: 51, .. }));
    }

    #[test]
    fn test_effective_volume_limit() {
        let hops = vec![
            Contact::new(LOCAL, NEIGHBOR, 0, 100, 10),
            Contact::new(NEIGHBOR, DEST, 0, 40, 10),
        ];
        // Bounded by the second hop's end
        let limit = compute_effective_volume_limit(&hops, 0, Priority::Normal, 20).unwrap();
        assert_eq!(limit, 200.0);

        let err = compute_effective_volume_limit(&hops, 0, Priority::Normal, 40).unwrap_err();
        assert!(matches!(err, DeliveryError::NoEffectiveDuration { .. }));
    }

    #[test]
    fn test_effective_volume_limit_bounded_by_residual() {
        let hops = vec![Contact::new(LOCAL, NEIGHBOR, 0, 100, 10).with_mtv([50.0, 60.0, 70.0])];
        let limit = compute_effective_volume_limit(&hops, 0, Priority::Normal, 0).unwrap();
        assert_eq!(limit, 60.0);
    }

    #[test]
    fn test_zero_rate_rejected() {
        let c = Contact::new(LOCAL, NEIGHBOR, 0, 100, 0);
        let plan = plan_with(&[c.clone()]);
        let backlog = backlog_with(0);
        let config = CgrConfig::default();
        let estimator = DeliveryEstimator::new(&plan, &backlog, &config, 0, LOCAL);

        let mut route = Route::new(vec![c]).unwrap();
        let err = estimator
            .compute_pbat(&mut route, &Bundle::new(NEIGHBOR, 500, 1000))
            .unwrap_err();
        assert!(matches!(err, DeliveryError::ZeroTransmitRate { .. }));
    }

    #[test]
    fn test_oversized_bundle_misses_contact() {
        let c = Contact::new(LOCAL, NEIGHBOR, 10, 100, 1);
        let plan = plan_with(&[c.clone()]);
        let backlog = backlog_with(0);
        let config = CgrConfig::default();
        let estimator = DeliveryEstimator::new(&plan, &backlog, &config, 0, LOCAL);

        let mut route = Route::new(vec![c]).unwrap();
        let err = estimator
            .compute_pbat(&mut route, &Bundle::new(NEIGHBOR, u64::MAX, 1000))
            .unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::ContactMissed {
                last_byte_tx: i64::MAX,
                to_time: 100
            }
        ));
    }

    #[test]
    fn test_later_hop_missed() {
        let first = Contact::new(LOCAL, NEIGHBOR, 0, 100, 1000);
        let second = Contact::new(NEIGHBOR, DEST, 0, 3, 1000);
        let mut plan = MemoryContactPlan::new();
        plan.add_contact(first.clone()).unwrap();
        plan.add_contact(second.clone()).unwrap();
        plan.add_range(Range::new(LOCAL, NEIGHBOR, 0, 10_000, 5));
        plan.add_range(Range::new(NEIGHBOR, DEST, 0, 10_000, 1));
        let backlog = backlog_with(0);
        let config = CgrConfig::default();
        let estimator = DeliveryEstimator::new(&plan, &backlog, &config, 0, LOCAL);

        // The first byte reaches the neighbor at t=5, after the second hop ends
        let mut route = Route::new(vec![first, second]).unwrap();
        let err = estimator
            .compute_pbat(&mut route, &Bundle::new(DEST, 500, 1000))
            .unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::ContactMissed {
                last_byte_tx: 5,
                to_time: 3
            }
        ));
    }

    #[test]
    fn test_missing_range_on_later_hop() {
        let first = Contact::new(LOCAL, NEIGHBOR, 0, 100, 1000);
        let second = Contact::new(NEIGHBOR, DEST, 0, 100, 1000);
        let mut plan = plan_with(&[first.clone()]);
        plan.add_contact(second.clone()).unwrap();
        let backlog = backlog_with(0);
        let config = CgrConfig::default();
        let estimator = DeliveryEstimator::new(&plan, &backlog, &config, 0, LOCAL);

        let mut route = Route::new(vec![first, second]).unwrap();
        let err = estimator
            .compute_pbat(&mut route, &Bundle::new(DEST, 500, 1000))
            .unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::Range(ContactPlanError::RangeNotFound { from: NEIGHBOR, to: DEST, .. })
        ));
    }

    #[test]
    fn test_exhausted_hop_rejected() {
        let first = Contact::new(LOCAL, NEIGHBOR, 0, 100, 1000);
        let second = Contact::new(NEIGHBOR, DEST, 0, 100, 1000).with_mtv([0.0; 3]);
        let plan = plan_with(&[first.clone(), second.clone()]);
        let backlog = backlog_with(0);
        let config = CgrConfig {
            queue_delay: false,
            ..CgrConfig::default()
        };
        let estimator = DeliveryEstimator::new(&plan, &backlog, &config, 0, LOCAL);

        let mut route = Route::new(vec![first, second]).unwrap();
        let err = estimator
            .compute_pbat(&mut route, &Bundle::new(DEST, 500, 1000))
            .unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::NoResidualVolume {
                from: NEIGHBOR,
                to: DEST
            }
        ));
    }

    #[test]
    fn test_hop_too_small_for_bundle() {
        let first = Contact::new(LOCAL, NEIGHBOR, 0, 100, 1000);
        let second = Contact::new(NEIGHBOR, DEST, 0, 100, 1000).with_mtv([100.0; 3]);
        let plan = plan_with(&[first.clone(), second.clone()]);
        let backlog = backlog_with(0);
        let config = CgrConfig {
            queue_delay: false,
            ..CgrConfig::default()
        };
        let estimator = DeliveryEstimator::new(&plan, &backlog, &config, 0, LOCAL);

        let mut route = Route::new(vec![first, second]).unwrap();
        let err = estimator
            .compute_pbat(&mut route, &Bundle::new(DEST, 500, 1000))
            .unwrap_err();
        match err {
            DeliveryError::VolumeLimitTooSmall { limit, evc } => {
                assert_eq!(limit, 100.0);
                assert_eq!(evc, 500);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_effective_volume_limit_index_past_route() {
        let hops = vec![Contact::new(LOCAL, NEIGHBOR, 0, 100, 10)];
        let err = compute_effective_volume_limit(&hops, 1, Priority::Normal, 0).unwrap_err();
        assert!(matches!(err, DeliveryError::HopOutOfRange { index: 1, hops: 1 }));

        let err = compute_effective_volume_limit(&[], 0, Priority::Normal, 0).unwrap_err();
        assert!(matches!(err, DeliveryError::HopOutOfRange { index: 0, hops: 0 }));
    }
}
