//! LaceMesh Peer Topology and Routing
//!
//! This crate holds the local view of the mesh and turns it into forwarding
//! decisions:
//! - Peer records and their connection maps
//! - Usable-edge selection (optionally established and symmetric only)
//! - Deterministic breadth-first next-hop computation
//! - Registry-side reference counts and topology snapshots
//!
//! Nothing here takes a lock around a traversal. Callers hold whatever read
//! consistency guarantee their peer registry provides while routes are being
//! computed.

pub mod connection;
pub mod error;
pub mod peer;
pub mod refcount;
pub mod routes;
pub mod snapshot;

pub use connection::Connection;
pub use error::{Result, RoutingError};
pub use peer::Peer;
pub use refcount::PeerRefCounts;
pub use routes::{RouteTable, UnicastRoutes};
pub use snapshot::{
    LinkDescription, PeerDescription, SnapshotConnection, TopologyDescription, TopologySnapshot,
};
