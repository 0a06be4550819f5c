//! LaceNode - local tooling around the LaceMesh routing core
//!
//! Loads node configuration, mints identities and computes next-hop tables
//! from topology snapshot files.

pub mod config;
pub mod logging;
pub mod topology;
