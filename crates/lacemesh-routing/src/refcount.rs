//! Registry-owned peer reference counts
//!
//! Peer records do not manage their own lifetime. The registry counts how
//! many local references it holds to each peer here and reclaims the record
//! once its count drops to zero.

use crate::error::{Result, RoutingError};
use lacemesh_protocol::PeerName;
use std::collections::HashMap;

/// Side table of local reference counts, keyed by peer name
#[derive(Debug, Clone, Default)]
pub struct PeerRefCounts {
    counts: HashMap<PeerName, u64>,
}

impl PeerRefCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reference, returning the new count
    pub fn increment(&mut self, name: PeerName) -> u64 {
        let count = self.counts.entry(name).or_insert(0);
        *count += 1;
        *count
    }

    /// Drop a reference
    ///
    /// Returns `true` when this was the last reference; the entry is removed
    /// and the peer may be reclaimed.
    pub fn decrement(&mut self, name: &PeerName) -> Result<bool> {
        let count = self
            .counts
            .get_mut(name)
            .ok_or(RoutingError::UnknownPeer(*name))?;

        *count -= 1;
        if *count == 0 {
            self.counts.remove(name);
            return Ok(true);
        }
        Ok(false)
    }

    /// Current count for `name` (0 if untracked)
    pub fn get(&self, name: &PeerName) -> u64 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Number of peers with at least one reference
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(last: u8) -> PeerName {
        PeerName::from_bin(&[0, 0, 0, 0, 0, last])
    }

    #[test]
    fn test_increment_decrement() {
        let mut counts = PeerRefCounts::new();
        assert_eq!(counts.increment(name(1)), 1);
        assert_eq!(counts.increment(name(1)), 2);
        assert_eq!(counts.increment(name(2)), 1);
        assert_eq!(counts.len(), 2);

        assert!(!counts.decrement(&name(1)).unwrap());
        assert_eq!(counts.get(&name(1)), 1);
        assert!(counts.decrement(&name(1)).unwrap());
        assert_eq!(counts.get(&name(1)), 0);
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_decrement_untracked() {
        let mut counts = PeerRefCounts::new();
        assert_eq!(
            counts.decrement(&name(3)),
            Err(RoutingError::UnknownPeer(name(3)))
        );
        assert!(counts.is_empty());
    }
}
