//! LaceMesh Protocol Module
//!
//! Identifier and summary types shared by every part of the mesh:
//! - Peer names (totally ordered, used as routing keys)
//! - Peer UIDs and short IDs, plus their random generation
//! - Peer summaries as carried by the gossip layer

pub mod error;
pub mod identity;
pub mod types;

pub use error::{ProtocolError, Result};
pub use identity::{parse_peer_uid, random_peer_short_id, random_peer_uid};
pub use types::{PeerName, PeerShortId, PeerSummary, PeerUid};

/// Width of an encoded peer name in bytes
pub const PEER_NAME_SIZE: usize = 6;

/// Usable bit width of a peer short ID
pub const PEER_SHORT_ID_BITS: u32 = 12;
