//! Random peer identity generation
//!
//! UIDs and short IDs come straight from the operating system's CSPRNG. A
//! host that cannot supply entropy cannot mint a safe identifier, so a read
//! failure is fatal rather than reported.

use crate::error::{ProtocolError, Result};
use crate::types::{PeerShortId, PeerUid};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::error;

/// Fill an `N`-byte buffer from the OS entropy source
///
/// # Panics
/// Panics if the entropy source cannot be read.
fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    if let Err(e) = OsRng.try_fill_bytes(&mut buf) {
        error!(error = %e, "failed to read from system entropy source");
        panic!("system entropy source unavailable: {}", e);
    }
    buf
}

/// Mint a fresh, non-zero peer UID
///
/// # Panics
/// Panics if the entropy source cannot be read.
pub fn random_peer_uid() -> PeerUid {
    loop {
        let uid = u64::from_le_bytes(random_bytes::<8>());
        // 0 is reserved for placeholders
        if uid != 0 {
            return PeerUid::from_u64(uid);
        }
    }
}

/// Mint a random 12-bit short ID
///
/// # Panics
/// Panics if the entropy source cannot be read.
pub fn random_peer_short_id() -> PeerShortId {
    PeerShortId::from_masked(u16::from_le_bytes(random_bytes::<2>()))
}

/// Parse a decimal peer UID
pub fn parse_peer_uid(s: &str) -> Result<PeerUid> {
    s.parse::<u64>()
        .map(PeerUid::from_u64)
        .map_err(|e| ProtocolError::InvalidPeerUid(format!("{:?}: {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_uid_never_zero() {
        for _ in 0..10_000 {
            assert!(!random_peer_uid().is_placeholder());
        }
    }

    #[test]
    fn test_random_uids_differ() {
        let uids: HashSet<_> = (0..1_000).map(|_| random_peer_uid()).collect();
        assert_eq!(uids.len(), 1_000);
    }

    #[test]
    fn test_random_short_id_in_range() {
        for _ in 0..10_000 {
            assert!(random_peer_short_id().as_u16() <= PeerShortId::MAX);
        }
    }

    #[test]
    fn test_parse_peer_uid() {
        assert_eq!(parse_peer_uid("0").unwrap(), PeerUid::PLACEHOLDER);
        assert_eq!(parse_peer_uid("12345").unwrap().as_u64(), 12345);
        assert_eq!(
            parse_peer_uid("18446744073709551615").unwrap().as_u64(),
            u64::MAX
        );
    }

    #[test]
    fn test_parse_peer_uid_rejects_malformed() {
        for input in ["", "abc", "-1", "12 34", "0x10", "18446744073709551616"] {
            assert!(
                matches!(parse_peer_uid(input), Err(ProtocolError::InvalidPeerUid(_))),
                "{:?} should not parse",
                input
            );
        }
    }

    #[test]
    fn test_peer_uid_from_str() {
        let uid: PeerUid = "77".parse().unwrap();
        assert_eq!(uid.as_u64(), 77);
        assert!("seventy-seven".parse::<PeerUid>().is_err());
    }
}
