//! # CGR Routing
//!
//! Candidate-route viability engine for contact graph routing.
//!
//! Given routes already computed through the contact plan, this crate
//! decides which of them can carry a specific bundle right now, estimates
//! when the bundle's last byte would arrive over each, flags routes that
//! may loop, and tells the route enumerator when more routes are needed.
//!
//! ## Core Components
//!
//! - [`CandidateEngine`]: Entry point driving a routing pass
//! - [`PassSession`]: Caller-owned state of one pass
//! - [`ViabilityChecker`]: Per-route feasibility gate
//! - [`DeliveryEstimator`]: Backlog, overbooking and delivery-time bound
//! - [`RouteEnumerator`] / [`run_conversation`]: Feedback loop with the enumerator
//! - [`CandidateReport`]: Human-readable dump of the candidates
//!
//! ## Pass Protocol
//!
//! 1. The caller creates a [`PassSession`] for the bundle
//! 2. [`CandidateEngine::get_candidate_routes`] judges the computed routes
//! 3. On [`CandidateResult::NeedMoreRoutes`] the enumerator branches from
//!    the returned subset and the engine is called again
//! 4. On [`CandidateResult::Done`] the session holds the candidates
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::collections::HashSet;
//! use std::sync::Arc;
//! use cgr_core::{Bundle, ManualClock, MemoryBacklog, MemoryContactPlan, NodeId};
//! use cgr_routing::{run_conversation, CandidateEngine, PassSession};
//!
//! let engine = CandidateEngine::new(NodeId(1), Arc::new(plan), Arc::new(backlog), Arc::new(clock));
//! let mut session = PassSession::new();
//! let candidates = run_conversation(
//!     &engine,
//!     &mut session,
//!     &mut enumerator,
//!     NodeId(9),
//!     &bundle,
//!     &HashSet::new(),
//! )?;
//! ```

pub mod config;
pub mod conversation;
pub mod delivery;
pub mod engine;
pub mod error;
pub mod loop_guard;
pub mod neighbors;
pub mod report;
pub mod session;
pub mod viability;

// Re-export main types
pub use config::{CgrConfig, ConfigWarning, LoopAvoidance};
pub use conversation::{RouteEnumerator, run_conversation};
pub use delivery::{DeliveryEstimate, DeliveryEstimator, ResidualBacklog};
pub use engine::CandidateEngine;
pub use error::{DeliveryError, PassError, RouteRejection, RoutingResult};
pub use neighbors::{RouteFlag, reached_neighbors_limit};
pub use report::{CandidateReport, ReportRow};
pub use session::{CandidateResult, NeighborFlags, PassSession, PassState, RouteId};
pub use viability::{ViabilityChecker, low_delivery_confidence};

// Re-export core types for convenience
pub use cgr_core::{Bundle, CheckValue, NodeId, Route};
