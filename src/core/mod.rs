//! Core library modules for butterfly-path
//!
//! Graph store, path engine, route graph construction and the map-data
//! client they are fed from.

pub mod builder;
pub mod config;
pub mod dijkstra;
pub mod error;
pub mod geo;
pub mod graph;
pub mod overpass;
pub mod route;

// Re-export main types for internal use
pub use error::{Error, ErrorKind, Result};
pub use graph::{Adjacency, GraphStore, SharedGraph};
