//! HTTP surface over the graph store, the path engine and the route planner

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use log::info;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::core::config::ServeConfig;
use crate::core::dijkstra::{shortest_path, PathResult};
use crate::core::error::{Error, ErrorKind};
use crate::core::geo::Coordinate;
use crate::core::graph::{Adjacency, Edge, GraphSnapshot, GraphStore, Node, SharedGraph};
use crate::core::route::{RoutePlan, RoutePlanner};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub graph: SharedGraph,
    pub planner: Arc<RoutePlanner>,
}

impl AppState {
    pub fn new(graph: SharedGraph, planner: RoutePlanner) -> Self {
        Self {
            graph,
            planner: Arc::new(planner),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Error returned by handlers, rendered as `{ "error": ... }`
#[derive(Debug)]
pub struct ApiError {
    error: Error,
    suggestion: Option<String>,
}

impl ApiError {
    /// Attach a "did you mean" hint when the error names an unknown node
    fn with_hint(error: Error, store: &GraphStore) -> Self {
        let suggestion = match &error {
            Error::NodeNotFound(id) => store.suggest_node(id),
            _ => None,
        };
        Self { error, suggestion }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self {
            error,
            suggestion: None,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Error::invalid_input(rejection.body_text()).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Error::invalid_input(rejection.body_text()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
        };
        let body = ErrorResponse {
            error: self.error.to_string(),
            suggestion: self.suggestion,
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

fn require<T>(value: Option<T>, field: &str) -> Result<T, Error> {
    value.ok_or_else(|| Error::invalid_input(format!("missing field '{field}'")))
}

#[derive(Debug, Deserialize)]
pub struct NodeRequest {
    pub id: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct EdgeRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    pub weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct EdgeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DijkstraRequest {
    /// Ad-hoc graph; the store is used when absent
    pub graph: Option<Adjacency>,
    pub start_node: Option<String>,
    pub end_node: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub start_lat: Option<f64>,
    pub start_lng: Option<f64>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
    /// Search radius around the start, in meters
    pub radius: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ConnectivityResponse {
    pub connected: bool,
    pub nodes: usize,
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": format!("butterfly-path v{} running", env!("BUTTERFLY_VERSION"))
    }))
}

async fn get_graph(State(state): State<AppState>) -> Json<GraphSnapshot> {
    Json(state.graph.read().snapshot())
}

async fn get_connectivity(State(state): State<AppState>) -> Json<ConnectivityResponse> {
    let graph = state.graph.read();
    Json(ConnectivityResponse {
        connected: graph.is_connected(),
        nodes: graph.len(),
    })
}

async fn create_node(
    State(state): State<AppState>,
    payload: Result<Json<NodeRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Node>)> {
    let Json(req) = payload?;
    let id = require(req.id, "id")?;
    let lat = require(req.lat, "lat")?;
    let lng = require(req.lng, "lng")?;

    let node = state.graph.write().add_node(&id, lat, lng)?;
    Ok((StatusCode::CREATED, Json(node)))
}

async fn update_node(
    State(state): State<AppState>,
    Path(old_id): Path<String>,
    payload: Result<Json<NodeRequest>, JsonRejection>,
) -> ApiResult<Json<Node>> {
    let mut graph = state.graph.write();
    if !graph.contains(&old_id) {
        return Err(ApiError::with_hint(Error::NodeNotFound(old_id), &graph));
    }

    let Json(req) = payload?;
    let id = require(req.id, "id")?;
    let lat = require(req.lat, "lat")?;
    let lng = require(req.lng, "lng")?;

    let node = graph
        .update_node(&old_id, &id, lat, lng)
        .map_err(|e| ApiError::with_hint(e, &graph))?;
    Ok(Json(node))
}

async fn delete_node(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let mut graph = state.graph.write();
    graph
        .delete_node(&id)
        .map_err(|e| ApiError::with_hint(e, &graph))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_edge(
    State(state): State<AppState>,
    payload: Result<Json<EdgeRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Edge>)> {
    let Json(req) = payload?;
    let from = require(req.from, "from")?;
    let to = require(req.to, "to")?;

    let mut graph = state.graph.write();
    let edge = graph
        .add_or_update_edge(&from, &to, req.weight)
        .map_err(|e| ApiError::with_hint(e, &graph))?;
    Ok((StatusCode::CREATED, Json(edge)))
}

async fn delete_edge(
    State(state): State<AppState>,
    query: Result<Query<EdgeQuery>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Query(query) = query?;
    let from = require(query.from, "from")?;
    let to = require(query.to, "to")?;

    let mut graph = state.graph.write();
    graph
        .delete_edge(&from, &to)
        .map_err(|e| ApiError::with_hint(e, &graph))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn run_dijkstra(
    State(state): State<AppState>,
    payload: Result<Json<DijkstraRequest>, JsonRejection>,
) -> ApiResult<Json<PathResult>> {
    let Json(req) = payload?;
    let start = require(req.start_node, "startNode")?;
    let end = require(req.end_node, "endNode")?;

    // Never run the search while holding the store lock
    let adjacency: Adjacency = match req.graph {
        Some(graph) => graph,
        None => state.graph.read().snapshot().edges,
    };

    let result = shortest_path(&adjacency, &start, &end)?;
    Ok(Json(result))
}

async fn find_route(
    State(state): State<AppState>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> ApiResult<Json<RoutePlan>> {
    let Json(req) = payload?;
    let from = Coordinate::new(require(req.start_lat, "startLat")?, require(req.start_lng, "startLng")?);
    let to = Coordinate::new(require(req.end_lat, "endLat")?, require(req.end_lng, "endLng")?);

    let plan = state.planner.find_route(from, to, req.radius).await?;
    Ok(Json(plan))
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/graph", get(get_graph))
        .route("/api/graph/connected", get(get_connectivity))
        .route("/api/graph/node", post(create_node))
        .route("/api/graph/node/{id}", put(update_node).delete(delete_node))
        .route("/api/graph/edge", post(create_edge).delete(delete_edge))
        .route("/api/dijkstra", post(run_dijkstra))
        .route("/api/route", post(find_route))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API until the process is stopped
pub async fn run_server(state: AppState, config: &ServeConfig) -> anyhow::Result<()> {
    let app = router(state);
    let addr = config.bind_addr();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
