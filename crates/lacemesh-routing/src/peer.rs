//! Peer records
//!
//! A `Peer` is the local representation of one node in the mesh: its
//! identifying summary plus the connections it is known to have to other
//! peers. The local peer is just another `Peer` whose connections happen to
//! be ours.

use crate::connection::Connection;
use crate::error::{Result, RoutingError};
use lacemesh_protocol::{PeerName, PeerShortId, PeerSummary, PeerUid};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

/// Connections of a peer, keyed by the remote peer's name
pub(crate) type ConnectionMap = HashMap<PeerName, Arc<dyn Connection>>;

/// A peer and its known connections
///
/// Lifetime is owned by the peer registry: reference counts live in a
/// registry side table (see `PeerRefCounts`), never on the record.
pub struct Peer {
    /// Name decoded once from `summary.name_bytes`
    name: PeerName,

    summary: PeerSummary,

    /// Never contains an entry under `name`
    connections: RwLock<ConnectionMap>,
}

impl Peer {
    /// Create a peer with no connections from a summary
    pub fn from_summary(summary: PeerSummary) -> Self {
        Peer {
            name: summary.name(),
            summary,
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Create a peer with no connections from its composite parts
    pub fn new(
        name: PeerName,
        nickname: impl Into<String>,
        uid: PeerUid,
        version: u64,
        short_id: PeerShortId,
    ) -> Self {
        Self::from_summary(PeerSummary {
            name_bytes: name.to_bin().to_vec(),
            nickname: nickname.into(),
            uid,
            version,
            short_id,
            has_short_id: true,
        })
    }

    /// Create a partial peer carrying only a name
    ///
    /// Used when an update mentions a peer we know nothing else about.
    pub fn placeholder(name: PeerName) -> Self {
        Self::from_summary(PeerSummary {
            name_bytes: name.to_bin().to_vec(),
            ..PeerSummary::default()
        })
    }

    /// Create a disconnected copy of `peer` with the same identity
    pub fn copy_of(peer: &Peer) -> Self {
        Self::from_summary(peer.summary.clone())
    }

    pub fn name(&self) -> PeerName {
        self.name
    }

    pub fn summary(&self) -> &PeerSummary {
        &self.summary
    }

    pub fn nickname(&self) -> &str {
        &self.summary.nickname
    }

    pub fn uid(&self) -> PeerUid {
        self.summary.uid
    }

    pub fn version(&self) -> u64 {
        self.summary.version
    }

    pub fn has_short_id(&self) -> bool {
        self.summary.has_short_id
    }

    /// Short ID, if this peer currently has a valid one
    pub fn short_id(&self) -> Option<PeerShortId> {
        self.summary.has_short_id.then_some(self.summary.short_id)
    }

    /// Whether this record is a name-only placeholder
    pub fn is_placeholder(&self) -> bool {
        self.summary.uid.is_placeholder()
    }

    pub(crate) fn connections(&self) -> RwLockReadGuard<'_, ConnectionMap> {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn connections_mut(&self) -> RwLockWriteGuard<'_, ConnectionMap> {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a connection to the connection's remote peer
    ///
    /// Replaces and returns any existing connection to the same remote name.
    /// A connection whose remote end is this peer is rejected.
    pub fn add_connection(
        &self,
        conn: Arc<dyn Connection>,
    ) -> Result<Option<Arc<dyn Connection>>> {
        let remote_name = conn.remote().name();
        if remote_name == self.name {
            warn!(peer = %self, "rejecting connection to self");
            return Err(RoutingError::SelfConnection(remote_name));
        }

        Ok(self.connections_mut().insert(remote_name, conn))
    }

    /// Forget the connection to `remote`, returning it if present
    pub fn remove_connection(&self, remote: &PeerName) -> Option<Arc<dyn Connection>> {
        self.connections_mut().remove(remote)
    }

    /// Connection to `remote`, if one is known
    pub fn connection(&self, remote: &PeerName) -> Option<Arc<dyn Connection>> {
        self.connections().get(remote).cloned()
    }

    pub fn connection_count(&self) -> usize {
        self.connections().len()
    }

    /// Names of all remotes this peer has a connection to, ascending
    pub fn connected_names(&self) -> Vec<PeerName> {
        let mut names: Vec<PeerName> = self.connections().keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Drop every connection
    ///
    /// Connections hold their remote peer, so a registry reclaiming peers
    /// clears them to break reference cycles.
    pub fn clear_connections(&self) {
        self.connections_mut().clear();
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.summary.nickname)
    }
}

impl fmt::Debug for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Peer")
            .field("name", &self.name)
            .field("nickname", &self.summary.nickname)
            .field("uid", &self.summary.uid)
            .field("version", &self.summary.version)
            .field("short_id", &self.short_id())
            .field("connections", &self.connected_names())
            .finish()
    }
}
