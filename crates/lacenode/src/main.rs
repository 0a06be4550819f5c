use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lacemesh_protocol::PeerName;
use lacenode::config::{Config, NodeConfig};
use lacenode::{logging, topology};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "lacenode")]
#[command(about = "LaceMesh peer identity and route inspection")]
struct Args {
    /// Configuration file
    #[arg(short, long, env = "LACENODE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a new configuration with a freshly minted identity
    Init,

    /// Print a freshly minted peer identity
    Identity,

    /// Compute the next-hop table for a topology snapshot
    Routes {
        /// YAML topology snapshot
        #[arg(short, long)]
        topology: PathBuf,

        /// Peer to compute routes from (defaults to the configured node)
        #[arg(short, long)]
        root: Option<PeerName>,

        /// Stop widening once this peer is reached
        #[arg(long)]
        stop_at: Option<PeerName>,

        /// Only follow established, symmetric connections
        #[arg(long, conflicts_with = "any")]
        symmetric: bool,

        /// Follow every known connection
        #[arg(long)]
        any: bool,

        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Init and identity must work without a configuration file
    let config = match args.command {
        Command::Routes { root: None, .. } => Some(Config::load(args.config.clone())?),
        Command::Routes { .. } => Config::load_if_exists(args.config.clone())?,
        _ => None,
    };

    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|| "info".to_string());
    logging::init(&level, args.debug, args.log_json);

    match args.command {
        Command::Init => {
            let config = Config::create_default(args.config)?;
            info!(path = %config.config_path().display(), "configuration written");
            println!("name:     {}", config.node.name);
            println!("nickname: {}", config.node.nickname);
            println!("uid:      {}", config.node.uid);
            println!("short id: {}", config.node.short_id);
        }
        Command::Identity => {
            let node = NodeConfig::generate("");
            println!("name:     {}", node.name);
            println!("uid:      {}", node.uid);
            println!("short id: {}", node.short_id);
        }
        Command::Routes {
            topology: path,
            root,
            stop_at,
            symmetric,
            any,
            json,
        } => {
            let root = match (root, &config) {
                (Some(root), _) => root,
                (None, Some(config)) => config.node.name,
                (None, None) => anyhow::bail!("No --root given and no configuration loaded"),
            };
            let require_established_symmetric = if symmetric {
                true
            } else if any {
                false
            } else {
                config
                    .as_ref()
                    .map_or(true, |c| c.routing.require_established_symmetric)
            };
            debug!(%root, require_established_symmetric, "computing routes");

            let snapshot = topology::load_topology(&path)?;
            let table = snapshot
                .routes_from(&root, stop_at.as_ref(), require_established_symmetric)
                .context("Failed to compute routes")?;

            if json {
                println!("{}", topology::render_json(&table)?);
            } else {
                print!("{}", topology::render_text(&table, &snapshot));
            }
        }
    }

    Ok(())
}
