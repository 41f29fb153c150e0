//! CLI-specific utilities for butterfly-path
//!
//! Terminal feedback and argument parsing helpers that the library itself
//! never needs.

pub mod progress;

pub use progress::FetchSpinner;
