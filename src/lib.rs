//! Polymarket Opportunity Scanner
//!
//! Ranks prediction-market listings by how interesting they are to trade, and
//! gates trades through a persistent safety policy.
//!
//! ## Architecture
//!
//! ```text
//! Gamma API (client) → raw JSON → scanner (normalize → filter → categorize → score) → ranked list
//!
//! proposed trade + SafetyState + SafetyConfig → safety::SafetyGate → Decision
//!                                                     ↓ (allowed)
//!                                       commit → StateStore (JSON file)
//! ```
//!
//! The scanner and the gate do no I/O; the client and state stores do.

pub mod client;
pub mod config;
pub mod error;
pub mod safety;
pub mod scanner;
pub mod types;

#[cfg(test)]
mod types_tests;
#[cfg(test)]
mod config_tests;
