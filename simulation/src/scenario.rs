//! Scenario files for the simulator
//!
//! A scenario is a JSON description of one routing decision: the contact
//! plan as seen from the local node, the outbound queues, the bundle, and
//! the routes Phase One would compute, one round per enumerator request.

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use cgr_core::{
    Bundle, Contact, ManualClock, MemoryBacklog, MemoryContactPlan, NodeId, PRIORITY_LEVELS,
    Priority, Range, Route,
};
use cgr_routing::{
    CandidateEngine, CandidateReport, CgrConfig, PassSession, PassState, RouteEnumerator,
    run_conversation,
};

/// A scheduled contact as written in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSpec {
    pub from: NodeId,
    pub to: NodeId,
    pub start: i64,
    pub end: i64,
    /// Bytes per second
    pub rate: u64,
    #[serde(default)]
    pub confidence: Option<f32>,
    /// Residual volume per priority; defaults to the full contact volume
    #[serde(default)]
    pub mtv: Option<[f64; PRIORITY_LEVELS]>,
}

impl ContactSpec {
    fn to_contact(&self) -> Contact {
        let mut contact = Contact::new(self.from, self.to, self.start, self.end, self.rate);
        if let Some(confidence) = self.confidence {
            contact = contact.with_confidence(confidence);
        }
        if let Some(mtv) = self.mtv {
            contact = contact.with_mtv(mtv);
        }
        contact
    }
}

/// A range as written in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSpec {
    pub from: NodeId,
    pub to: NodeId,
    pub start: i64,
    pub end: i64,
    /// One-way light time (seconds)
    pub owlt: u32,
    /// Also applies in the reverse direction
    #[serde(default)]
    pub symmetric: bool,
}

/// Bytes queued toward a neighbor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacklogEntry {
    pub neighbor: NodeId,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub ordinal: u8,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub blocked: bool,
}

/// The bundle as written in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleSpec {
    pub destination: NodeId,
    /// Estimated volume consumption (bytes)
    pub size: u64,
    pub expiration: i64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub ordinal: u8,
    #[serde(default)]
    pub critical: bool,
    #[serde(default)]
    pub dlv_confidence: f32,
    #[serde(default)]
    pub failed_neighbors: Vec<NodeId>,
    #[serde(default)]
    pub visited: Vec<NodeId>,
}

impl BundleSpec {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new(self.destination, self.size, self.expiration)
            .with_priority(self.priority, self.ordinal)
            .with_dlv_confidence(self.dlv_confidence);
        if self.critical {
            bundle = bundle.critical();
        }
        for neighbor in &self.failed_neighbors {
            bundle.add_failed_neighbor(*neighbor);
        }
        for node in &self.visited {
            bundle.add_visited(*node);
        }
        bundle
    }
}

/// A Phase-One route: contact indices plus its arrival pre-estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSpec {
    pub hops: Vec<usize>,
    #[serde(default)]
    pub arrival_time: Option<i64>,
    #[serde(default)]
    pub owlt_sum: u32,
}

/// A complete routing scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    pub local_node: NodeId,
    #[serde(default)]
    pub now: i64,
    pub contacts: Vec<ContactSpec>,
    #[serde(default)]
    pub ranges: Vec<RangeSpec>,
    #[serde(default)]
    pub backlog: Vec<BacklogEntry>,
    pub bundle: BundleSpec,
    #[serde(default)]
    pub excluded_neighbors: Vec<NodeId>,
    /// Engine configuration; the `suggested` preset when absent
    #[serde(default)]
    pub config: Option<CgrConfig>,
    /// Routes handed out per enumerator request
    #[serde(default)]
    pub rounds: Vec<Vec<RouteSpec>>,
}

/// Result of running a scenario
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub scenario: String,
    pub state: String,
    pub requests: usize,
    pub neighbors_found: usize,
    pub suppressed: usize,
    pub report: CandidateReport,
}

impl Scenario {
    /// Load a scenario from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let mut scenario = Self::from_json(&text)
            .with_context(|| format!("parsing scenario {}", path.display()))?;
        if scenario.name.is_empty() {
            scenario.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(scenario)
    }

    /// Parse a scenario from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Check the scenario is internally consistent
    pub fn validate(&self) -> Result<()> {
        for (index, spec) in self.contacts.iter().enumerate() {
            spec.to_contact()
                .validate()
                .with_context(|| format!("contact {index}"))?;
        }

        for (round, routes) in self.rounds.iter().enumerate() {
            for (position, spec) in routes.iter().enumerate() {
                self.check_route(spec)
                    .with_context(|| format!("round {round}, route {position}"))?;
            }
        }

        if let Some(config) = &self.config {
            for warning in config.validate() {
                info!(%warning, "Scenario configuration warning");
            }
        }
        Ok(())
    }

    fn check_route(&self, spec: &RouteSpec) -> Result<()> {
        ensure!(!spec.hops.is_empty(), "route has no hops");
        let mut at = self.local_node;
        for &index in &spec.hops {
            let Some(contact) = self.contacts.get(index) else {
                bail!("contact index {index} out of range");
            };
            ensure!(
                contact.from == at,
                "contact {index} starts at {} but the route is at {at}",
                contact.from
            );
            at = contact.to;
        }
        ensure!(
            at == self.bundle.destination,
            "route ends at {at}, not at {}",
            self.bundle.destination
        );
        Ok(())
    }

    /// The contact plan described by the scenario
    pub fn contact_plan(&self) -> Result<MemoryContactPlan> {
        let mut plan = MemoryContactPlan::new();
        for spec in &self.contacts {
            plan.add_contact(spec.to_contact())?;
        }
        for spec in &self.ranges {
            let range = Range::new(spec.from, spec.to, spec.start, spec.end, spec.owlt);
            if spec.symmetric {
                plan.add_symmetric_range(range);
            } else {
                plan.add_range(range);
            }
        }
        Ok(plan)
    }

    /// The outbound queues described by the scenario
    ///
    /// Every neighbor of the local node gets an open plan, queued bytes or not.
    pub fn backlog(&self) -> MemoryBacklog {
        let backlog = MemoryBacklog::new();
        for spec in self.contacts.iter().filter(|c| c.from == self.local_node) {
            backlog.open_plan(spec.to);
        }
        for entry in &self.backlog {
            backlog.open_plan(entry.neighbor);
            backlog.enqueue(entry.neighbor, entry.priority, entry.ordinal, entry.bytes);
            if entry.blocked {
                backlog.set_blocked(entry.neighbor, true);
            }
        }
        backlog
    }

    /// An enumerator replaying the scenario's rounds
    pub fn enumerator(&self) -> Result<ScriptedEnumerator> {
        let mut rounds = VecDeque::new();
        let mut num = 0u32;
        for routes in &self.rounds {
            let mut round = Vec::with_capacity(routes.len());
            for spec in routes {
                self.check_route(spec)?;
                let hops = spec
                    .hops
                    .iter()
                    .map(|&i| self.contacts[i].to_contact())
                    .collect();
                num += 1;
                let mut route = Route::new(hops)?.with_num(num);
                if let Some(arrival) = spec.arrival_time {
                    route = route.with_arrival(arrival, spec.owlt_sum);
                }
                round.push(route);
            }
            rounds.push_back(round);
        }
        Ok(ScriptedEnumerator::new(rounds))
    }

    /// Run a full routing pass
    ///
    /// `config` overrides the scenario's own configuration.
    pub fn run(&self, config: Option<CgrConfig>) -> Result<Outcome> {
        self.validate()?;
        let config = config
            .or_else(|| self.config.clone())
            .unwrap_or_else(CgrConfig::suggested);
        let show_type = config.loop_avoidance.is_enabled();

        let engine = CandidateEngine::with_config(
            self.local_node,
            Arc::new(self.contact_plan()?),
            Arc::new(self.backlog()),
            Arc::new(ManualClock::new(self.now)),
            config,
        );
        let bundle = self.bundle.to_bundle();
        let excluded: HashSet<NodeId> = self.excluded_neighbors.iter().copied().collect();
        let mut enumerator = self.enumerator()?;
        let mut session = PassSession::new();

        let candidates = run_conversation(
            &engine,
            &mut session,
            &mut enumerator,
            self.bundle.destination,
            &bundle,
            &excluded,
        )?;
        debug!(
            scenario = %self.name,
            candidates = candidates.len(),
            requests = enumerator.requests(),
            "Scenario finished"
        );

        Ok(Outcome {
            scenario: self.name.clone(),
            state: state_label(session.state()).to_string(),
            requests: enumerator.requests(),
            neighbors_found: session.neighbors_found(),
            suppressed: session.suppressed_count(),
            report: CandidateReport::new(&candidates, show_type),
        })
    }
}

fn state_label(state: PassState) -> &'static str {
    match state {
        PassState::Accumulating => "accumulating",
        PassState::AwaitingMoreRoutes => "awaiting more routes",
        PassState::Done => "done",
        PassState::Failed => "failed",
    }
}

/// Phase One stand-in that hands out prepared rounds of routes
#[derive(Debug, Default)]
pub struct ScriptedEnumerator {
    rounds: VecDeque<Vec<Route>>,
    requests: usize,
}

impl ScriptedEnumerator {
    /// Create an enumerator from prepared rounds
    pub fn new(rounds: VecDeque<Vec<Route>>) -> Self {
        Self {
            rounds,
            requests: 0,
        }
    }

    /// Number of requests served so far
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// Rounds not yet handed out
    pub fn remaining(&self) -> usize {
        self.rounds.len()
    }
}

impl RouteEnumerator for ScriptedEnumerator {
    fn compute_routes(
        &mut self,
        destination: NodeId,
        subset: &mut [&mut Route],
        missing_neighbors: usize,
    ) -> Vec<Route> {
        self.requests += 1;
        for route in subset.iter_mut() {
            route.spurs_computed = true;
        }
        let routes = self.rounds.pop_front().unwrap_or_default();
        debug!(
            %destination,
            subset = subset.len(),
            missing_neighbors,
            routes = routes.len(),
            "Enumerator round"
        );
        routes
    }
}
