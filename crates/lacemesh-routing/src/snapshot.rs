//! Topology snapshots
//!
//! A snapshot is a self-contained set of linked peers built from a plain
//! description, as read from a file or assembled by hand. It owns its peers
//! and the connections between them, which makes it a safe thing to compute
//! routes over without touching the live registry.

use crate::connection::Connection;
use crate::error::{Result, RoutingError};
use crate::peer::Peer;
use crate::routes::RouteTable;
use lacemesh_protocol::{PeerName, PeerShortId, PeerSummary, PeerUid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Description of one peer in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerDescription {
    pub name: PeerName,
    #[serde(default)]
    pub nickname: String,
    /// 0 describes a placeholder
    #[serde(default)]
    pub uid: PeerUid,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub short_id: Option<PeerShortId>,
}

impl PeerDescription {
    fn to_summary(&self) -> PeerSummary {
        PeerSummary {
            name_bytes: self.name.to_bin().to_vec(),
            nickname: self.nickname.clone(),
            uid: self.uid,
            version: self.version,
            short_id: self.short_id.unwrap_or_default(),
            has_short_id: self.short_id.is_some(),
        }
    }
}

/// Description of a connection between two peers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDescription {
    pub from: PeerName,
    pub to: PeerName,
    #[serde(default = "default_established")]
    pub established: bool,
    /// Also add the reverse connection `to -> from`
    #[serde(default)]
    pub bidirectional: bool,
}

fn default_established() -> bool {
    true
}

/// Peers and directed links making up a topology
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyDescription {
    pub peers: Vec<PeerDescription>,
    #[serde(default)]
    pub links: Vec<LinkDescription>,
}

/// Connection between two snapshot peers
#[derive(Debug)]
pub struct SnapshotConnection {
    remote: Arc<Peer>,
    established: AtomicBool,
}

impl SnapshotConnection {
    pub fn new(remote: &Arc<Peer>, established: bool) -> Arc<Self> {
        Arc::new(SnapshotConnection {
            remote: Arc::clone(remote),
            established: AtomicBool::new(established),
        })
    }

    pub fn set_established(&self, established: bool) {
        self.established.store(established, Ordering::Release);
    }
}

impl Connection for SnapshotConnection {
    fn established(&self) -> bool {
        self.established.load(Ordering::Acquire)
    }

    fn remote(&self) -> Arc<Peer> {
        Arc::clone(&self.remote)
    }
}

/// A linked set of peers
///
/// Connections hold their remote peers, so the peers form reference cycles;
/// dropping the snapshot clears every connection map to release them.
#[derive(Debug, Default)]
pub struct TopologySnapshot {
    peers: BTreeMap<PeerName, Arc<Peer>>,
}

impl TopologySnapshot {
    /// Build linked peers from a description
    pub fn build(description: &TopologyDescription) -> Result<Self> {
        let mut snapshot = TopologySnapshot::default();

        for desc in &description.peers {
            // UNKNOWN is the "self" next hop and cannot name a real peer
            if desc.name.is_unknown() {
                return Err(RoutingError::ReservedName(desc.name));
            }
            if snapshot.peers.contains_key(&desc.name) {
                return Err(RoutingError::DuplicatePeer(desc.name));
            }
            snapshot
                .peers
                .insert(desc.name, Arc::new(Peer::from_summary(desc.to_summary())));
        }

        for link in &description.links {
            snapshot.connect(&link.from, &link.to, link.established)?;
            if link.bidirectional {
                snapshot.connect(&link.to, &link.from, link.established)?;
            }
        }

        debug!(
            peers = snapshot.peers.len(),
            links = description.links.len(),
            "built topology snapshot"
        );
        Ok(snapshot)
    }

    /// Add or replace the connection `from -> to`
    pub fn connect(&self, from: &PeerName, to: &PeerName, established: bool) -> Result<()> {
        let from_peer = self.require(from)?;
        let to_peer = self.require(to)?;

        if from_peer
            .add_connection(SnapshotConnection::new(to_peer, established))?
            .is_some()
        {
            warn!(from = %from_peer, to = %to_peer, "replaced existing connection");
        }
        Ok(())
    }

    /// Remove the connection `from -> to`, returning whether it existed
    pub fn disconnect(&self, from: &PeerName, to: &PeerName) -> Result<bool> {
        Ok(self.require(from)?.remove_connection(to).is_some())
    }

    pub fn peer(&self, name: &PeerName) -> Option<&Arc<Peer>> {
        self.peers.get(name)
    }

    /// All peers in name order
    pub fn peers(&self) -> impl Iterator<Item = &Arc<Peer>> {
        self.peers.values()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Compute routes from `root`, optionally stopping at `stop_at`
    pub fn routes_from(
        &self,
        root: &PeerName,
        stop_at: Option<&PeerName>,
        require_established_symmetric: bool,
    ) -> Result<RouteTable> {
        let root = self.require(root)?;
        let stop_at = stop_at.map(|name| self.require(name)).transpose()?;

        Ok(root.routes(stop_at.map(|peer| peer.as_ref()), require_established_symmetric))
    }

    fn require(&self, name: &PeerName) -> Result<&Arc<Peer>> {
        self.peers.get(name).ok_or(RoutingError::UnknownPeer(*name))
    }
}

impl Drop for TopologySnapshot {
    fn drop(&mut self) {
        for peer in self.peers.values() {
            peer.clear_connections();
        }
    }
}
