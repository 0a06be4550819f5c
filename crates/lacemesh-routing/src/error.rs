//! Routing error types

use lacemesh_protocol::PeerName;
use thiserror::Error;

/// Routing-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    #[error("Peer {0} cannot be connected to itself")]
    SelfConnection(PeerName),

    #[error("Unknown peer: {0}")]
    UnknownPeer(PeerName),

    #[error("Duplicate peer: {0}")]
    DuplicatePeer(PeerName),

    #[error("Peer name {0} is reserved")]
    ReservedName(PeerName),
}

/// Result type for routing operations
pub type Result<T> = std::result::Result<T, RoutingError>;
