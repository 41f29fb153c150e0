//! In-memory graph store
//!
//! Nodes and the adjacency/weight table live in two maps keyed by node id.
//! Every undirected edge is written as two mirrored directed entries with the
//! same weight, so `edges[u][v] == edges[v][u]` holds for every stored pair.
//! Ordered maps keep iteration (and therefore snapshots, connectivity checks
//! and shortest-path tie-breaks) deterministic.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::core::error::{suggest_node_id, Error, Result};
use crate::core::geo::Coordinate;

/// Adjacency table: node id -> (neighbor id -> weight in meters)
pub type Adjacency = BTreeMap<String, BTreeMap<String, f64>>;

/// A graph store behind the single lock that serializes every mutation
pub type SharedGraph = Arc<RwLock<GraphStore>>;

/// A node as reported back to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
}

/// An undirected weighted edge as reported back to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub weight: f64,
}

/// Point-in-time copy of the whole store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: BTreeMap<String, Coordinate>,
    pub edges: Adjacency,
}

/// Mutable graph of geographic nodes
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: BTreeMap<String, Coordinate>,
    edges: Adjacency,
}

fn check_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::invalid_input("node id must not be empty"));
    }
    Ok(())
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the store in the lock shared with request handlers
    pub fn into_shared(self) -> SharedGraph {
        Arc::new(RwLock::new(self))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<Node> {
        self.nodes.get(id).map(|c| Node {
            id: id.to_string(),
            lat: c.lat,
            lng: c.lng,
        })
    }

    pub fn adjacency(&self) -> &Adjacency {
        &self.edges
    }

    /// Weight of the edge between two nodes, if any
    pub fn weight(&self, from: &str, to: &str) -> Option<f64> {
        self.edges.get(from).and_then(|n| n.get(to)).copied()
    }

    /// Every undirected edge once, with `from <= to`
    pub fn edges(&self) -> Vec<Edge> {
        self.edges
            .iter()
            .flat_map(|(from, neighbors)| {
                neighbors
                    .iter()
                    .filter(move |(to, _)| from.as_str() <= to.as_str())
                    .map(move |(to, weight)| Edge {
                        from: from.clone(),
                        to: to.clone(),
                        weight: *weight,
                    })
            })
            .collect()
    }

    /// Closest existing id to an unknown one, for error messages
    pub fn suggest_node(&self, id: &str) -> Option<String> {
        suggest_node_id(id, self.nodes.keys())
    }

    /// Insert a new node with no edges
    pub fn add_node(&mut self, id: &str, lat: f64, lng: f64) -> Result<Node> {
        check_id(id)?;
        let coord = Coordinate::checked(lat, lng)?;
        if self.nodes.contains_key(id) {
            return Err(Error::Conflict(id.to_string()));
        }

        self.nodes.insert(id.to_string(), coord);
        self.edges.insert(id.to_string(), BTreeMap::new());
        debug!("added node {id} at ({lat}, {lng})");

        Ok(Node {
            id: id.to_string(),
            lat,
            lng,
        })
    }

    /// Remove a node together with every edge touching it
    pub fn delete_node(&mut self, id: &str) -> Result<()> {
        if self.nodes.remove(id).is_none() {
            return Err(Error::NodeNotFound(id.to_string()));
        }

        let neighbors = self.edges.remove(id).unwrap_or_default();
        for neighbor in neighbors.keys() {
            if let Some(back) = self.edges.get_mut(neighbor) {
                back.remove(id);
            }
        }
        debug!("deleted node {id} and {} incident edges", neighbors.len());

        Ok(())
    }

    /// Rename and/or move a node
    ///
    /// When the id changes, the adjacency entry moves to the new key and
    /// every neighbor's back-reference is rewritten, keeping weights intact.
    /// Coordinates are always overwritten.
    pub fn update_node(&mut self, old_id: &str, new_id: &str, lat: f64, lng: f64) -> Result<Node> {
        if !self.nodes.contains_key(old_id) {
            return Err(Error::NodeNotFound(old_id.to_string()));
        }
        check_id(new_id)?;
        let coord = Coordinate::checked(lat, lng)?;
        if new_id != old_id && self.nodes.contains_key(new_id) {
            return Err(Error::Conflict(new_id.to_string()));
        }

        if new_id != old_id {
            self.nodes.remove(old_id);
            let mut neighbors = self.edges.remove(old_id).unwrap_or_default();

            for neighbor in neighbors.keys() {
                if neighbor == old_id {
                    continue;
                }
                if let Some(back) = self.edges.get_mut(neighbor) {
                    if let Some(weight) = back.remove(old_id) {
                        back.insert(new_id.to_string(), weight);
                    }
                }
            }
            // Self-loop follows the rename
            if let Some(weight) = neighbors.remove(old_id) {
                neighbors.insert(new_id.to_string(), weight);
            }

            self.edges.insert(new_id.to_string(), neighbors);
            debug!("renamed node {old_id} -> {new_id}");
        }

        self.nodes.insert(new_id.to_string(), coord);

        Ok(Node {
            id: new_id.to_string(),
            lat,
            lng,
        })
    }

    /// Create or re-weight the edge between two nodes
    ///
    /// Without an explicit weight the great-circle distance between the two
    /// nodes is used.
    pub fn add_or_update_edge(&mut self, from: &str, to: &str, weight: Option<f64>) -> Result<Edge> {
        let from_coord = *self
            .nodes
            .get(from)
            .ok_or_else(|| Error::NodeNotFound(from.to_string()))?;
        let to_coord = *self
            .nodes
            .get(to)
            .ok_or_else(|| Error::NodeNotFound(to.to_string()))?;

        let weight = match weight {
            Some(w) if !w.is_finite() || w < 0.0 => {
                return Err(Error::invalid_input(format!(
                    "edge weight must be a finite non-negative number, got {w}"
                )));
            }
            Some(w) => w,
            None => from_coord.distance_to(&to_coord),
        };

        self.edges
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string(), weight);
        self.edges
            .entry(to.to_string())
            .or_default()
            .insert(from.to_string(), weight);
        debug!("edge {from} <-> {to} = {weight}");

        Ok(Edge {
            from: from.to_string(),
            to: to.to_string(),
            weight,
        })
    }

    /// Remove both directions of an existing edge
    pub fn delete_edge(&mut self, from: &str, to: &str) -> Result<()> {
        for id in [from, to] {
            if !self.nodes.contains_key(id) {
                return Err(Error::NodeNotFound(id.to_string()));
            }
        }

        let removed = self
            .edges
            .get_mut(from)
            .and_then(|neighbors| neighbors.remove(to));
        if removed.is_none() {
            return Err(Error::EdgeNotFound {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if let Some(back) = self.edges.get_mut(to) {
            back.remove(from);
        }
        debug!("deleted edge {from} <-> {to}");

        Ok(())
    }

    /// Whether every node is reachable from the first one, ignoring weights
    pub fn is_connected(&self) -> bool {
        let Some(first) = self.nodes.keys().next() else {
            return true;
        };

        let mut visited: BTreeSet<&str> = BTreeSet::new();
        let mut stack = vec![first.as_str()];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(neighbors) = self.edges.get(current) {
                stack.extend(
                    neighbors
                        .keys()
                        .map(String::as_str)
                        .filter(|n| !visited.contains(n)),
                );
            }
        }

        visited.len() == self.nodes.len()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }
}
