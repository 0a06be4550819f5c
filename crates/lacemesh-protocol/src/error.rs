//! Error types for protocol operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Invalid peer UID: {0}")]
    InvalidPeerUid(String),

    #[error("Invalid peer name: {0}")]
    InvalidPeerName(String),

    #[error("Short ID out of range: {0} (max: {})", crate::PeerShortId::MAX)]
    ShortIdOutOfRange(u16),
}
