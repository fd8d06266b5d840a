//! CLI entry point for the HARM construction engine.
//!
//! Designed for pipeline invocation from the dataset tooling: reads a
//! topology snapshot as JSON from stdin and writes results to stdout.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use harm_core::types::{Privilege, Topology};
use harm_engine::types::HarmRequest;
use harm_engine::{AttackGraph, Harm};

#[derive(Parser)]
#[command(name = "harm-engine")]
#[command(about = "Two-layer attack graph / attack tree construction engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Privilege ceiling for lower-layer trees (None, User, or Root).
    #[arg(long, global = true)]
    ceiling: Option<String>,

    /// Config file prefix (default: harm).
    #[arg(short, long, default_value = "harm", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Build the upper-layer attack graph and dump its structure.
    Graph,
    /// Build the full HARM and dump every enumerated attack path.
    Paths,
    /// Build the full HARM and print the analysis result as JSON.
    Analyze,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut request = load_request(&cli.config);
    if let Some(raw) = &cli.ceiling {
        request.privilege_ceiling = Some(
            Privilege::parse_postcondition(raw)
                .ok_or_else(|| anyhow::anyhow!("unknown privilege ceiling: {raw}"))?,
        );
    }

    let input = std::io::read_to_string(std::io::stdin())?;
    let topology: Topology = serde_json::from_str(&input)?;

    match cli.command {
        Command::Graph => {
            let graph = AttackGraph::build(&topology, request.graph_value, None)?;
            print!("{}", graph.render());
        }
        Command::Paths => {
            let harm = Harm::construct(&topology, &request)?;
            let set = harm.graph.enumerate_paths();
            print!("{}", harm.graph.render_paths(&set));
        }
        Command::Analyze => {
            let harm = Harm::construct(&topology, &request)?;
            println!("{}", serde_json::to_string(&harm.analyze())?);
        }
    }

    Ok(())
}

/// Load request defaults from `harm.toml` / `HARM__` environment variables,
/// falling back to the built-in defaults.
fn load_request(file_prefix: &str) -> HarmRequest {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("HARM")
                .separator("__")
                .try_parsing(true),
        )
        .build();

    match cfg {
        Ok(c) => HarmRequest {
            graph_value: c.get_int("engine.graph_value").unwrap_or(1),
            tree_value: c.get_int("engine.tree_value").unwrap_or(1),
            privilege_ceiling: c
                .get_string("engine.privilege_ceiling")
                .ok()
                .as_deref()
                .and_then(Privilege::parse_postcondition),
        },
        Err(_) => HarmRequest::default(),
    }
}
