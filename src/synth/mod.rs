//! Synthesis surface — canonical emission and graph fingerprints.

pub mod emit;
pub mod fingerprint;
