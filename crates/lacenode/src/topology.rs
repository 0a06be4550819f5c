//! Topology snapshot files and route table rendering

use anyhow::{Context, Result};
use lacemesh_protocol::PeerName;
use lacemesh_routing::{RouteTable, TopologyDescription, TopologySnapshot};
use std::fmt::Write;
use std::fs;
use std::path::Path;
use tracing::info;

/// Read a YAML topology description and link it into a snapshot
pub fn load_topology(path: &Path) -> Result<TopologySnapshot> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read topology file {}", path.display()))?;

    let description: TopologyDescription =
        serde_yaml::from_str(&contents).context("Failed to parse topology file")?;

    let snapshot = TopologySnapshot::build(&description).context("Invalid topology")?;
    info!(
        path = %path.display(),
        peers = snapshot.len(),
        "loaded topology snapshot"
    );

    Ok(snapshot)
}

/// Render a route table as aligned text, one destination per line
pub fn render_text(table: &RouteTable, snapshot: &TopologySnapshot) -> String {
    let label = |name: &PeerName| match snapshot.peer(name) {
        Some(peer) if !peer.nickname().is_empty() => peer.to_string(),
        _ => name.to_string(),
    };

    let mut out = String::new();
    for (destination, hop) in &table.next_hops {
        let via = if hop.is_unknown() {
            "self".to_string()
        } else {
            label(hop)
        };
        // Writing to a String cannot fail
        let _ = writeln!(out, "{:<32} -> {}", label(destination), via);
    }
    if table.stopped {
        out.push_str("(stopped early)\n");
    }
    out
}

/// Render a route table as pretty-printed JSON
pub fn render_json(table: &RouteTable) -> Result<String> {
    serde_json::to_string_pretty(table).context("Failed to serialize route table")
}
