//! # Butterfly-path Library
//!
//! An in-memory geographic graph store with shortest-path search, plus an
//! on-demand route finder that builds a road graph from OpenStreetMap data.
//!
//! ## Features
//!
//! - **Graph store**: nodes with coordinates, undirected weighted edges,
//!   rename with edge rewiring, cascade delete, connectivity check
//! - **Shortest paths**: Dijkstra over any adjacency table, deterministic
//!   tie-breaks on node id
//! - **Route finding**: fetch highways from an Overpass endpoint, snap both
//!   endpoints to the nearest road node and route between them
//! - **HTTP API**: axum router exposing all of the above as JSON
//!
//! ## Basic Usage
//!
//! ```rust
//! use butterfly_path::{shortest_path, GraphStore};
//!
//! let mut graph = GraphStore::new();
//! graph.add_node("A", 40.4168, -3.7038).unwrap();
//! graph.add_node("B", 40.4170, -3.7030).unwrap();
//! graph.add_node("C", 40.4175, -3.7021).unwrap();
//! graph.add_or_update_edge("A", "B", Some(10.0)).unwrap();
//! graph.add_or_update_edge("B", "C", Some(5.0)).unwrap();
//!
//! let result = shortest_path(graph.adjacency(), "A", "C").unwrap();
//! assert_eq!(result.path, vec!["A", "B", "C"]);
//! assert_eq!(result.total_distance(), Some(15.0));
//! ```
//!
//! ## Route Finding
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let from = butterfly_path::Coordinate::new(40.4168, -3.7038);
//!     let to = butterfly_path::Coordinate::new(40.4200, -3.7000);
//!
//!     let plan = butterfly_path::find_route(from, to, Some(800.0)).await?;
//!     println!("{} nodes, {:?} meters", plan.path.len(), plan.distance_meters);
//!
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod server;

pub use crate::core::builder::{build_from_segments, nearest_node, MapData};
pub use crate::core::config::{OverpassConfig, ServeConfig, DEFAULT_OVERPASS_URL};
pub use crate::core::dijkstra::{shortest_path, PathResult};
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::geo::{haversine_distance, Coordinate};
pub use crate::core::graph::{Adjacency, Edge, GraphSnapshot, GraphStore, Node, SharedGraph};
pub use crate::core::overpass::OverpassClient;
pub use crate::core::route::{plan_route, RoutePlan, RoutePlanner};

/// Find a route between two coordinates using the public Overpass endpoint
///
/// # Arguments
/// * `from` - Start coordinate; map data is fetched around this point
/// * `to` - Destination coordinate
/// * `radius_m` - Search radius in meters, defaults to 1000
pub async fn find_route(from: Coordinate, to: Coordinate, radius_m: Option<f64>) -> Result<RoutePlan> {
    let client = OverpassClient::new(OverpassConfig::default())?;
    RoutePlanner::new(client).find_route(from, to, radius_m).await
}

/// Get library version
pub fn version() -> &'static str {
    env!("BUTTERFLY_VERSION")
}
