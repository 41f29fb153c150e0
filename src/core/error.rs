//! Error types for butterfly-path
//!
//! Every failure the graph store, path engine and route planner can report,
//! plus the fuzzy "did you mean" helper used when a node id is unknown.

use strsim::{jaro_winkler, normalized_levenshtein};
use thiserror::Error;

/// Main error type for butterfly-path operations
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed, missing or non-finite input field
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Reference to a node that does not exist
    #[error("Node '{0}' not found")]
    NodeNotFound(String),

    /// Reference to an edge that does not exist
    #[error("Edge '{from}' <-> '{to}' not found")]
    EdgeNotFound { from: String, to: String },

    /// No candidate node to snap a coordinate to
    #[error("No node found near ({lat}, {lng})")]
    NoNearbyNode { lat: f64, lng: f64 },

    /// Duplicate identifier on create or rename
    #[error("Node '{0}' already exists")]
    Conflict(String),

    /// The map-data service failed, timed out or answered garbage
    #[error("Map data unavailable: {0}")]
    UpstreamUnavailable(String),
}

/// Coarse classification of [`Error`], used to pick a transport status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Conflict,
    UpstreamUnavailable,
}

impl Error {
    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn upstream<T: Into<String>>(msg: T) -> Self {
        Error::UpstreamUnavailable(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::NodeNotFound(_) | Error::EdgeNotFound { .. } | Error::NoNearbyNode { .. } => {
                ErrorKind::NotFound
            }
            Error::Conflict(_) => ErrorKind::Conflict,
            Error::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::UpstreamUnavailable(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Error::UpstreamUnavailable(format!("connection failed: {err}"))
        } else if err.is_decode() {
            Error::UpstreamUnavailable(format!("malformed response: {err}"))
        } else {
            Error::UpstreamUnavailable(err.to_string())
        }
    }
}

/// Convenience result type for butterfly-path operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimum combined similarity before a candidate is offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.65;

/// Suggest an existing node id close to a mistyped one.
///
/// Scores every candidate with 70% Jaro-Winkler plus 30% normalized
/// Levenshtein on the lowercased ids and returns the best one above
/// [`SUGGESTION_THRESHOLD`]. Exact matches are never suggested.
pub fn suggest_node_id<'a, I>(id: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let input = id.to_lowercase();
    let mut best_match = None;
    let mut best_score = 0.0f64;

    for candidate in candidates {
        if candidate == id {
            return None;
        }
        let candidate_lower = candidate.to_lowercase();
        let score = jaro_winkler(&input, &candidate_lower) * 0.7
            + normalized_levenshtein(&input, &candidate_lower) * 0.3;

        if score >= SUGGESTION_THRESHOLD && score > best_score {
            best_score = score;
            best_match = Some(candidate.clone());
        }
    }

    best_match
}
