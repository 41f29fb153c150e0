//! Overpass map-data client
//!
//! Fetches every highway way within a radius of a point, together with the
//! nodes those ways reference. Failures are never retried: a timeout, a
//! non-success status or a body that does not parse all surface as
//! `UpstreamUnavailable` and fail the enclosing request.

use log::{info, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;

use crate::core::builder::MapData;
use crate::core::config::OverpassConfig;
use crate::core::error::{Error, Result};
use crate::core::geo::Coordinate;

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
    },
    Way {
        #[serde(default)]
        nodes: Vec<i64>,
    },
    #[serde(other)]
    Other,
}

/// Build the Overpass QL query for highways around a point
pub fn highway_query(center: Coordinate, radius_m: f64, server_timeout_secs: u64) -> String {
    format!(
        "[out:json][timeout:{server_timeout_secs}];\n\
         (\n  way(around:{radius_m},{lat},{lng})[highway];\n);\n\
         (._;>;);\n\
         out body;\n",
        lat = center.lat,
        lng = center.lng,
    )
}

fn into_map_data(response: OverpassResponse) -> MapData {
    let mut data = MapData::default();
    for element in response.elements {
        match element {
            Element::Node { id, lat, lon } => {
                data.nodes.insert(id.to_string(), Coordinate::new(lat, lon));
            }
            Element::Way { nodes } => {
                data.ways
                    .push(nodes.into_iter().map(|id| id.to_string()).collect());
            }
            Element::Other => {}
        }
    }
    data
}

/// HTTP client for an Overpass interpreter endpoint
#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: Client,
    config: OverpassConfig,
}

impl OverpassClient {
    pub fn new(config: OverpassConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::upstream(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OverpassConfig {
        &self.config
    }

    /// Fetch highway ways and their nodes within `radius_m` of `center`
    pub async fn fetch_highways(&self, center: Coordinate, radius_m: f64) -> Result<MapData> {
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err(Error::invalid_input(format!(
                "radius must be a positive number of meters, got {radius_m}"
            )));
        }

        let query = highway_query(center, radius_m, self.config.timeout.as_secs().max(1));
        info!(
            "fetching highways within {radius_m}m of ({}, {}) from {}",
            center.lat, center.lng, self.config.endpoint
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(CONTENT_TYPE, "text/plain")
            .body(query)
            .send()
            .await
            .map_err(|e| {
                warn!("Overpass request failed: {e}");
                Error::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Overpass answered {status}");
            return Err(Error::upstream(format!("Overpass returned {status}")));
        }

        let body: OverpassResponse = response.json().await.map_err(|e| {
            warn!("Overpass response could not be decoded: {e}");
            Error::upstream(format!("malformed Overpass response: {e}"))
        })?;

        let data = into_map_data(body);
        info!(
            "received {} nodes and {} ways",
            data.nodes.len(),
            data.ways.len()
        );
        Ok(data)
    }
}
