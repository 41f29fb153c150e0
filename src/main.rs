//! # Butterfly-path CLI
//!
//! Command-line interface for the butterfly-path library.
//! Serves the graph API, finds routes over live OpenStreetMap data and runs
//! shortest-path queries over adjacency files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use butterfly_path::server::{run_server, AppState};
use butterfly_path::{
    shortest_path, Adjacency, Coordinate, GraphStore, OverpassClient, OverpassConfig, RoutePlanner,
    ServeConfig, DEFAULT_OVERPASS_URL,
};
use clap::{Parser, Subcommand};
use log::{error, info};

mod cli;

/// Command-line interface for butterfly-path
#[derive(Parser)]
#[command(name = "butterfly-path")]
#[command(about = "Geographic graph store and shortest-path router")]
#[command(long_about = "Geographic graph store and shortest-path router:
  butterfly-path serve --port 3000                          # Run the HTTP API
  butterfly-path route --from 40.4168,-3.7038 --to 40.42,-3.70   # Route over OSM highways
  butterfly-path path graph.json --start A --end C          # Dijkstra over a JSON adjacency file")]
#[command(version = env!("BUTTERFLY_VERSION"))]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API over an empty in-memory graph
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "BUTTERFLY_PORT", default_value_t = 3000)]
        port: u16,

        /// Overpass interpreter endpoint used by /api/route
        #[arg(long, env = "BUTTERFLY_OVERPASS_URL", default_value = DEFAULT_OVERPASS_URL)]
        overpass_url: String,

        /// Overpass request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },

    /// Fetch highways around the start point and route between two coordinates
    Route {
        /// Start coordinate as "lat,lng"
        #[arg(long, allow_hyphen_values = true, value_parser = parse_coordinate)]
        from: Coordinate,

        /// Destination coordinate as "lat,lng"
        #[arg(long, allow_hyphen_values = true, value_parser = parse_coordinate)]
        to: Coordinate,

        /// Search radius around the start point, in meters
        #[arg(short, long)]
        radius: Option<f64>,

        /// Overpass interpreter endpoint
        #[arg(long, env = "BUTTERFLY_OVERPASS_URL", default_value = DEFAULT_OVERPASS_URL)]
        overpass_url: String,
    },

    /// Run Dijkstra over an adjacency JSON file
    Path {
        /// JSON object of node id -> { neighbor id -> weight }
        graph: PathBuf,

        /// Start node id
        #[arg(long)]
        start: String,

        /// End node id
        #[arg(long)]
        end: String,
    },
}

/// Parse a "lat,lng" pair
fn parse_coordinate(value: &str) -> Result<Coordinate, String> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lng\", got \"{value}\""))?;
    let lat: f64 = lat.trim().parse().map_err(|_| format!("invalid latitude \"{lat}\""))?;
    let lng: f64 = lng.trim().parse().map_err(|_| format!("invalid longitude \"{lng}\""))?;
    Coordinate::checked(lat, lng).map_err(|e| e.to_string())
}

/// Load an adjacency table from a JSON file
fn load_adjacency(path: &Path) -> anyhow::Result<Adjacency> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let adjacency = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not an adjacency table", path.display()))?;
    Ok(adjacency)
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("❌ Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    if cli.verbose {
        eprintln!("🦋 Butterfly-path v{} starting...", env!("BUTTERFLY_VERSION"));
    }

    match cli.command {
        Command::Serve {
            host,
            port,
            overpass_url,
            timeout,
        } => {
            let overpass = OverpassConfig {
                endpoint: overpass_url,
                timeout: Duration::from_secs(timeout),
                ..Default::default()
            };
            info!("🗺️  Map data from {}", overpass.endpoint);

            let planner = RoutePlanner::new(OverpassClient::new(overpass)?);
            let state = AppState::new(GraphStore::new().into_shared(), planner);
            run_server(state, &ServeConfig { host, port }).await?;
        }
        Command::Route {
            from,
            to,
            radius,
            overpass_url,
        } => {
            route(from, to, radius, overpass_url).await?;
        }
        Command::Path { graph, start, end } => {
            let adjacency = load_adjacency(&graph)?;
            let result = shortest_path(&adjacency, &start, &end)?;
            match result.total_distance() {
                Some(distance) => {
                    println!("{}", result.path.join(" -> "));
                    println!("distance: {distance}");
                }
                None => println!("no path from {start} to {end}"),
            }
        }
    }

    Ok(())
}

/// Fetch map data with a spinner and print the route
async fn route(from: Coordinate, to: Coordinate, radius: Option<f64>, overpass_url: String) -> anyhow::Result<()> {
    let config = OverpassConfig {
        endpoint: overpass_url,
        ..Default::default()
    };
    let planner = RoutePlanner::new(OverpassClient::new(config)?);

    let spinner = cli::FetchSpinner::new("🌐 Fetching highways from Overpass");
    let plan = match planner.find_route(from, to, radius).await {
        Ok(plan) => {
            spinner.finish("✅ Map data received");
            plan
        }
        Err(e) => {
            spinner.fail();
            return Err(e.into());
        }
    };

    eprintln!("📍 Snapped to nodes {} -> {}", plan.start_node, plan.end_node);
    match plan.distance_meters {
        Some(meters) => {
            for [lat, lng] in &plan.path_coords {
                println!("{lat},{lng}");
            }
            eprintln!("📏 {} nodes, {meters:.0} m", plan.path.len());
        }
        None => eprintln!("🚫 No route between {} and {}", plan.start_node, plan.end_node),
    }

    Ok(())
}
