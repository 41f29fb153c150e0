//! Dijkstra shortest path over an adjacency table
//!
//! The engine never mutates its input and works on any [`Adjacency`], so it
//! runs equally on a [`GraphStore`](crate::core::graph::GraphStore) snapshot
//! or on a disposable table built from fetched map data.
//!
//! Settling order is (tentative distance, node id): among equally close
//! candidates the smallest id is settled first, so results are deterministic
//! even when several optimal paths exist. The search stops as soon as `end`
//! is settled; distances of nodes settled later are not final.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap};

use serde::{Serialize, Serializer};

use crate::core::error::{Error, Result};
use crate::core::graph::Adjacency;

/// Distances from the start plus the reconstructed path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    /// Tentative distance per node; `f64::INFINITY` when never reached
    #[serde(serialize_with = "serialize_distances")]
    pub distances: BTreeMap<String, f64>,

    /// Node ids from start to end, empty when no path exists
    pub path: Vec<String>,
}

impl PathResult {
    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    /// Finite distance to a node, `None` when unreachable or unknown
    pub fn distance(&self, id: &str) -> Option<f64> {
        self.distances.get(id).copied().filter(|d| d.is_finite())
    }

    /// Weight of the reconstructed path
    pub fn total_distance(&self) -> Option<f64> {
        self.path.last().and_then(|end| self.distance(end))
    }
}

/// JSON has no infinity; unreachable nodes are written as `null`
fn serialize_distances<S>(distances: &BTreeMap<String, f64>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(
        distances
            .iter()
            .map(|(id, d)| (id, if d.is_finite() { Some(*d) } else { None })),
    )
}

// Heap entry, reversed so the max-heap pops the smallest (cost, id) first
#[derive(Debug, Clone, Copy)]
struct State<'a> {
    cost: f64,
    node: &'a str,
}

impl PartialEq for State<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State<'_> {}

impl PartialOrd for State<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(self.node))
    }
}

fn validate_weights(adjacency: &Adjacency) -> Result<()> {
    for (from, neighbors) in adjacency {
        for (to, weight) in neighbors {
            if weight.is_nan() || *weight < 0.0 {
                return Err(Error::invalid_input(format!(
                    "edge {from} -> {to} has invalid weight {weight}; weights must be non-negative"
                )));
            }
        }
    }
    Ok(())
}

/// Shortest path from `start` to `end`
///
/// Fails with `InvalidInput` on negative or NaN weights. A `start` or `end`
/// that is not a key of `adjacency` gets an infinite distance and yields an
/// empty path. Neighbors that are not keys themselves are ignored.
pub fn shortest_path(adjacency: &Adjacency, start: &str, end: &str) -> Result<PathResult> {
    validate_weights(adjacency)?;

    let mut distances: BTreeMap<String, f64> = adjacency
        .keys()
        .map(|id| (id.clone(), f64::INFINITY))
        .collect();

    if !adjacency.contains_key(start) {
        distances.entry(start.to_string()).or_insert(f64::INFINITY);
        distances.entry(end.to_string()).or_insert(f64::INFINITY);
        return Ok(PathResult {
            distances,
            path: Vec::new(),
        });
    }

    let mut settled: BTreeSet<&str> = BTreeSet::new();
    let mut previous: HashMap<&str, &str> = HashMap::new();
    let mut heap = BinaryHeap::new();

    distances.insert(start.to_string(), 0.0);
    heap.push(State { cost: 0.0, node: start });

    while let Some(State { cost, node }) = heap.pop() {
        if !settled.insert(node) {
            continue;
        }
        if node == end {
            break;
        }

        let Some(neighbors) = adjacency.get(node) else {
            continue;
        };
        for (neighbor, weight) in neighbors {
            if settled.contains(neighbor.as_str()) {
                continue;
            }
            let Some(current) = distances.get_mut(neighbor) else {
                continue;
            };
            let alt = cost + weight;
            if alt < *current {
                *current = alt;
                previous.insert(neighbor.as_str(), node);
                heap.push(State {
                    cost: alt,
                    node: neighbor.as_str(),
                });
            }
        }
    }

    let path = if adjacency.contains_key(end) {
        reconstruct_path(&previous, start, end)
    } else {
        distances.entry(end.to_string()).or_insert(f64::INFINITY);
        Vec::new()
    };

    Ok(PathResult { distances, path })
}

/// Walk predecessors back from `end`; empty unless the walk reaches `start`
fn reconstruct_path(previous: &HashMap<&str, &str>, start: &str, end: &str) -> Vec<String> {
    let mut path = vec![end.to_string()];
    let mut current = end;
    while let Some(&prev) = previous.get(current) {
        path.push(prev.to_string());
        current = prev;
    }
    path.reverse();

    if path.first().map(String::as_str) == Some(start) {
        path
    } else {
        Vec::new()
    }
}
