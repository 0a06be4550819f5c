//! Next-hop route computation
//!
//! Connections carry no weights, so minimum-hop routes come from a plain
//! breadth-first widening rather than a shortest-path algorithm. Every peer
//! runs this over its own copy of the topology; two peers with equal views
//! must produce equal tables or messages can loop or vanish. Each level of
//! the widening is therefore processed in `PeerName` order, whatever order
//! the connection maps happen to iterate in.

use crate::peer::Peer;
use lacemesh_protocol::PeerName;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Destination name -> name of the neighbour to forward to
///
/// The local peer maps to `PeerName::UNKNOWN`.
pub type UnicastRoutes = BTreeMap<PeerName, PeerName>;

/// Result of a route computation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteTable {
    /// Whether the widening stopped at the requested peer
    pub stopped: bool,

    pub next_hops: UnicastRoutes,
}

impl RouteTable {
    /// Neighbour to forward to for `destination`
    ///
    /// `Some(PeerName::UNKNOWN)` means the destination is the root itself.
    pub fn next_hop(&self, destination: &PeerName) -> Option<PeerName> {
        self.next_hops.get(destination).copied()
    }

    pub fn contains(&self, destination: &PeerName) -> bool {
        self.next_hops.contains_key(destination)
    }

    /// Number of destinations, the root included
    pub fn len(&self) -> usize {
        self.next_hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next_hops.is_empty()
    }
}

impl Peer {
    /// Calculate next hops from this peer to every peer reachable from it
    ///
    /// The returned table says "to reach X, send to neighbour Y". When
    /// `require_established_symmetric` is set, only established connections
    /// confirmed from both ends are followed.
    ///
    /// When `stop_at` is given the widening ends as soon as that peer is
    /// reached; it is matched by identity, not by name. The table then holds
    /// only what was discovered before it, and `stopped` is set.
    ///
    /// Callers should hold a read lock over the peer registry and the local
    /// peer while this runs.
    pub fn routes(
        self: &Arc<Self>,
        stop_at: Option<&Peer>,
        require_established_symmetric: bool,
    ) -> RouteTable {
        let mut next_hops = UnicastRoutes::new();
        next_hops.insert(self.name(), PeerName::UNKNOWN);

        let mut next_frontier: Vec<Arc<Peer>> = vec![Arc::clone(self)];
        let mut level = 0usize;

        while !next_frontier.is_empty() {
            let mut frontier = std::mem::take(&mut next_frontier);
            frontier.sort_by_key(|peer| peer.name());
            trace!(root = %self, level, peers = frontier.len(), "widening");

            for current in &frontier {
                if stop_at.map_or(false, |stop| std::ptr::eq(Arc::as_ptr(current), stop)) {
                    debug!(
                        root = %self,
                        stop_at = %current,
                        reachable = next_hops.len(),
                        "route computation stopped"
                    );
                    return RouteTable {
                        stopped: true,
                        next_hops,
                    };
                }

                let first_hop = if Arc::ptr_eq(current, self) {
                    None
                } else {
                    next_hops.get(&current.name()).copied()
                };

                for remote in current.connected_peers(require_established_symmetric, &next_hops) {
                    let remote_name = remote.name();
                    // Direct neighbours of the root are their own first hop;
                    // everything behind `current` goes the way `current` does.
                    next_hops.insert(remote_name, first_hop.unwrap_or(remote_name));
                    next_frontier.push(remote);
                }
            }

            level += 1;
        }

        debug!(
            root = %self,
            reachable = next_hops.len(),
            levels = level,
            "route computation complete"
        );
        RouteTable {
            stopped: false,
            next_hops,
        }
    }
}
