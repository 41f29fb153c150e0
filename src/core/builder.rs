//! Route graph construction from fetched map data

use std::collections::BTreeMap;

use log::debug;

use crate::core::error::{Error, Result};
use crate::core::geo::Coordinate;
use crate::core::graph::Adjacency;

/// Node coordinates and way segments as delivered by the map-data service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapData {
    pub nodes: BTreeMap<String, Coordinate>,
    /// Each way is an ordered sequence of node ids
    pub ways: Vec<Vec<String>>,
}

impl MapData {
    pub fn to_adjacency(&self) -> Adjacency {
        build_from_segments(&self.nodes, &self.ways)
    }
}

/// Linear search for the node closest to `target`
///
/// Ties go to the smallest id. Fails with `NoNearbyNode` when there are no
/// candidates at all.
pub fn nearest_node(target: Coordinate, nodes: &BTreeMap<String, Coordinate>) -> Result<String> {
    let mut best: Option<(&String, f64)> = None;
    for (id, coord) in nodes {
        let d = target.distance_to(coord);
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((id, d));
        }
    }

    best.map(|(id, _)| id.clone()).ok_or(Error::NoNearbyNode {
        lat: target.lat,
        lng: target.lng,
    })
}

/// Build a symmetric adjacency table from way segments
///
/// Every consecutive pair in a segment becomes an undirected edge weighted by
/// great-circle distance. Pairs repeated across segments keep the last
/// computed weight. Pairs referencing a node without coordinates are skipped.
pub fn build_from_segments(nodes: &BTreeMap<String, Coordinate>, segments: &[Vec<String>]) -> Adjacency {
    let mut adjacency = Adjacency::new();
    let mut skipped = 0usize;

    for segment in segments {
        for pair in segment.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let (Some(coord_a), Some(coord_b)) = (nodes.get(a), nodes.get(b)) else {
                skipped += 1;
                continue;
            };

            let distance = coord_a.distance_to(coord_b);
            adjacency
                .entry(a.clone())
                .or_default()
                .insert(b.clone(), distance);
            adjacency
                .entry(b.clone())
                .or_default()
                .insert(a.clone(), distance);
        }
    }

    if skipped > 0 {
        debug!("skipped {skipped} segment pairs with missing coordinates");
    }
    debug!(
        "built route graph: {} nodes from {} segments",
        adjacency.len(),
        segments.len()
    );

    adjacency
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::haversine_distance;

    fn coords(list: &[(&str, f64, f64)]) -> BTreeMap<String, Coordinate> {
        list.iter()
            .map(|(id, lat, lng)| (id.to_string(), Coordinate::new(*lat, *lng)))
            .collect()
    }

    fn segment(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_nearest_node() {
        let nodes = coords(&[("1", 0.0, 0.0), ("2", 0.0, 0.01), ("3", 0.0, 0.02)]);
        assert_eq!(nearest_node(Coordinate::new(0.0, 0.011), &nodes).unwrap(), "2");
        assert_eq!(nearest_node(Coordinate::new(5.0, 5.0), &nodes).unwrap(), "3");
    }

    #[test]
    fn test_nearest_node_tie_goes_to_smallest_id() {
        let nodes = coords(&[("b", 0.0, 0.01), ("a", 0.0, -0.01)]);
        assert_eq!(nearest_node(Coordinate::new(0.0, 0.0), &nodes).unwrap(), "a");
    }

    #[test]
    fn test_nearest_node_empty() {
        let err = nearest_node(Coordinate::new(0.0, 0.0), &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, Error::NoNearbyNode { .. }));
    }

    #[test]
    fn test_build_from_segments_is_symmetric() {
        let nodes = coords(&[("1", 0.0, 0.0), ("2", 0.0, 0.001), ("3", 0.001, 0.001)]);
        let adj = build_from_segments(&nodes, &[segment(&["1", "2", "3"])]);

        let w12 = haversine_distance(0.0, 0.0, 0.0, 0.001);
        assert_eq!(adj["1"]["2"], w12);
        assert_eq!(adj["2"]["1"], w12);
        assert_eq!(adj["2"]["3"], adj["3"]["2"]);
        assert!(!adj["1"].contains_key("3"));
        assert_eq!(adj.len(), 3);
    }

    #[test]
    fn test_shared_nodes_join_segments() {
        let nodes = coords(&[("1", 0.0, 0.0), ("2", 0.0, 0.001), ("3", 0.0, 0.002), ("4", 0.001, 0.001)]);
        let adj = build_from_segments(
            &nodes,
            &[segment(&["1", "2", "3"]), segment(&["4", "2"]), segment(&["2", "1"])],
        );
        assert_eq!(adj["2"].len(), 3);
        assert_eq!(adj["1"].len(), 1);
    }

    #[test]
    fn test_missing_coordinates_are_skipped() {
        let nodes = coords(&[("1", 0.0, 0.0), ("2", 0.0, 0.001)]);
        let adj = build_from_segments(&nodes, &[segment(&["1", "2", "9"]), segment(&["7"])]);
        assert_eq!(adj.len(), 2);
        assert!(!adj.contains_key("9"));
    }

    #[test]
    fn test_map_data_to_adjacency() {
        let data = MapData {
            nodes: coords(&[("1", 0.0, 0.0), ("2", 0.0, 0.001)]),
            ways: vec![segment(&["1", "2"])],
        };
        let adj = data.to_adjacency();
        assert_eq!(adj["1"]["2"], adj["2"]["1"]);
    }
}
