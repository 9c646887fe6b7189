//! # CGR Core
//!
//! Core types, collaborator traits, and errors for the contact graph routing stack.
//!
//! This crate holds everything the routing engine reads but does not own:
//! the contact plan, the queueing subsystem and the clock are all reached
//! through traits so the same engine runs against a live bundle agent or
//! against the in-memory implementations used by tests and the simulator.
//!
//! ## Key Traits
//!
//! - [`ContactPlan`]: Contact and range queries over the scheduled topology
//! - [`BacklogSource`]: Bytes already queued toward a neighbor
//! - [`Clock`]: Time abstraction for testability
//!
//! ## Key Types
//!
//! - [`NodeId`]: IPN node number
//! - [`Scalar`]: Overflow-safe volume arithmetic
//! - [`Contact`] / [`Range`]: Scheduled transmission opportunities and light times
//! - [`Bundle`]: The message being routed
//! - [`Route`]: A path through the contact graph, annotated by the routing engine

pub mod bundle;
pub mod contact;
pub mod error;
pub mod memory;
pub mod node;
pub mod route;
pub mod scalar;
pub mod traits;

// Re-export main types
pub use bundle::*;
pub use contact::*;
pub use error::*;
pub use memory::*;
pub use node::*;
pub use route::*;
pub use scalar::*;
pub use traits::*;
