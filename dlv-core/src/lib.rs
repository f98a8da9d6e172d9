#![warn(missing_docs)]
//! Models and ports for a delivery-task auction agent.
//!
//! The agent competes in sequential sealed-bid auctions for pickup-and-delivery
//! tasks. For every task it wins it must produce a capacity- and
//! precedence-feasible multi-vehicle plan. This crate holds the vocabulary
//! shared by the optimizer, the valuation engine and the session controller.

/// Core domain models for the delivery agent.
///
/// This module contains the fundamental data structures: identifiers, tasks,
/// vehicles, routes, solutions and the bounded solution pool, together with the
/// plain configuration record and the concrete topology/distribution tables.
///
/// The models carry the feasibility rules (capacity at every prefix, pickup
/// before delivery) so that every component enforces them identically.
pub mod models;

/// Interface traits for the delivery agent.
///
/// This module contains the "ports" in the hexagonal architecture pattern:
/// the read-only topology and task-distribution collaborators, the optional
/// learned valuation table, the configuration source, the optimizer, and the
/// callback surface the auction host drives.
pub mod ports;
