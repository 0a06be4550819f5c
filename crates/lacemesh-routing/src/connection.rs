//! Connection capability and usable-edge selection
//!
//! The mesh gossips every connection a peer reports, including half-formed
//! ones still in their handshake. Routing must not send traffic over those,
//! so edges are filtered here before the route computation ever sees them.

use crate::peer::Peer;
use crate::routes::UnicastRoutes;
use std::sync::Arc;

/// A link from one peer to another, as seen by the connection layer
///
/// The routing core only queries connections; it never creates them or
/// stores state in them.
pub trait Connection: Send + Sync {
    /// Whether the handshake has completed and the link is usable
    fn established(&self) -> bool;

    /// Peer at the far end of this link
    fn remote(&self) -> Arc<Peer>;
}

impl Peer {
    /// Apply `visit` to every peer reachable over one selected edge
    ///
    /// When `require_established_symmetric` is set, an edge is selected only
    /// if it is established and the remote peer reports an established
    /// connection back to this peer. Otherwise every known edge is selected.
    /// Remotes whose names are keys of `exclude` are skipped.
    pub fn for_each_connected_peer<F>(
        &self,
        require_established_symmetric: bool,
        exclude: &UnicastRoutes,
        mut visit: F,
    ) where
        F: FnMut(&Arc<Peer>),
    {
        for remote in self.connected_peers(require_established_symmetric, exclude) {
            visit(&remote);
        }
    }

    /// Collect the remotes selected by `for_each_connected_peer`
    ///
    /// The connection map lock is released before this returns, so callers
    /// may update `exclude` or the visited peers afterwards.
    pub(crate) fn connected_peers(
        &self,
        require_established_symmetric: bool,
        exclude: &UnicastRoutes,
    ) -> Vec<Arc<Peer>> {
        let connections = self.connections();
        let mut selected = Vec::with_capacity(connections.len());

        for (remote_name, conn) in connections.iter() {
            if require_established_symmetric && !conn.established() {
                continue;
            }
            if exclude.contains_key(remote_name) {
                continue;
            }

            let remote = conn.remote();
            if !require_established_symmetric || remote.has_established_connection_to(self) {
                selected.push(remote);
            }
        }

        selected
    }

    fn has_established_connection_to(&self, other: &Peer) -> bool {
        self.connections()
            .get(&other.name())
            .map_or(false, |conn| conn.established())
    }
}
