//! Scenario runner for the candidate-route engine
//!
//! Loads JSON scenarios describing a contact plan, outbound queues, a
//! bundle and scripted Phase-One routes, then runs a complete routing
//! pass against the in-memory collaborators of `cgr-core`.

pub mod scenario;

pub use scenario::{
    BacklogEntry, BundleSpec, ContactSpec, Outcome, RangeSpec, RouteSpec, Scenario,
    ScriptedEnumerator,
};
