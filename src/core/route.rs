//! Point-to-point route finding over fetched map data
//!
//! Fetch the highways around the start point, build a disposable route
//! graph, snap both endpoints to their nearest routable node and run the
//! path engine. Nothing here touches the editable graph store.

use std::collections::BTreeMap;

use log::info;
use serde::Serialize;

use crate::core::builder::{nearest_node, MapData};
use crate::core::dijkstra::shortest_path;
use crate::core::error::Result;
use crate::core::geo::Coordinate;
use crate::core::overpass::OverpassClient;

/// Route between two coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    pub start_node: String,
    pub end_node: String,
    pub path: Vec<String>,
    /// `[lat, lng]` for every node of `path`
    pub path_coords: Vec<[f64; 2]>,
    /// `None` when the two endpoints are not connected
    pub distance_meters: Option<f64>,
}

impl RoutePlan {
    pub fn is_found(&self) -> bool {
        !self.path.is_empty()
    }
}

/// Route over already-fetched map data
///
/// Endpoints only snap to nodes that belong to at least one usable segment,
/// so a stray node without ways never becomes a dead start.
pub fn plan_route(map_data: &MapData, from: Coordinate, to: Coordinate) -> Result<RoutePlan> {
    let adjacency = map_data.to_adjacency();
    let routable: BTreeMap<String, Coordinate> = map_data
        .nodes
        .iter()
        .filter(|(id, _)| adjacency.contains_key(id.as_str()))
        .map(|(id, coord)| (id.clone(), *coord))
        .collect();

    let start_node = nearest_node(from, &routable)?;
    let end_node = nearest_node(to, &routable)?;

    let result = shortest_path(&adjacency, &start_node, &end_node)?;
    let path_coords = result
        .path
        .iter()
        .filter_map(|id| routable.get(id))
        .map(|c| [c.lat, c.lng])
        .collect();

    Ok(RoutePlan {
        distance_meters: result.total_distance(),
        path: result.path,
        path_coords,
        start_node,
        end_node,
    })
}

/// Route finder backed by a map-data client
#[derive(Debug, Clone)]
pub struct RoutePlanner {
    client: OverpassClient,
}

impl RoutePlanner {
    pub fn new(client: OverpassClient) -> Self {
        Self { client }
    }

    /// Fetch map data around `from` and route to `to`
    ///
    /// `radius_m` defaults to the client's configured radius.
    pub async fn find_route(&self, from: Coordinate, to: Coordinate, radius_m: Option<f64>) -> Result<RoutePlan> {
        let from = Coordinate::checked(from.lat, from.lng)?;
        let to = Coordinate::checked(to.lat, to.lng)?;
        let radius = radius_m.unwrap_or(self.client.config().default_radius_m);

        let map_data = self.client.fetch_highways(from, radius).await?;
        let plan = plan_route(&map_data, from, to)?;

        match plan.distance_meters {
            Some(d) => info!(
                "route {} -> {}: {} nodes, {:.0}m",
                plan.start_node,
                plan.end_node,
                plan.path.len(),
                d
            ),
            None => info!("no route between {} and {}", plan.start_node, plan.end_node),
        }
        Ok(plan)
    }
}
