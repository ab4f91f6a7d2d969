//! Trazar — declarative cloud stack composition.
//!
//! Declares a deployment topology (compute built from source, a managed
//! table dependency, an HTTP entry point with routing and throttling, and
//! the permission grants wiring them together) as a typed resource graph.
//! A separate synthesis engine diffs the composed graph against live
//! infrastructure and converges.

pub mod cli;
pub mod core;
pub mod synth;
