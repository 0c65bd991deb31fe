mod llm;

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use formats::{project_buildings, BuildingSet, ProjectorConfig};
use query::{evaluate, Filter};
use scene::BuildingBox;

use crate::llm::{LlmConfig, LlmError};

#[derive(Clone)]
struct AppState {
    /// Raw GeoJSON document, served verbatim.
    raw: Bytes,
    /// Render list, projected once at startup and read-only after.
    boxes: Arc<Vec<BuildingBox>>,
    llm: Arc<LlmConfig>,
    http: reqwest::Client,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let buildings_path =
        env::var("BUILDINGS_PATH").unwrap_or_else(|_| "Buildings.geojson".to_string());
    let addr: SocketAddr = env::var("DASH_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:9200".to_string())
        .parse()
        .expect("invalid DASH_ADDR");

    let llm = LlmConfig {
        api_url: env::var("QUERY_MODEL_URL").unwrap_or_else(|_| {
            "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.1"
                .to_string()
        }),
        api_key: env::var("QUERY_API_KEY").ok(),
    };

    let payload = match tokio::fs::read_to_string(&buildings_path).await {
        Ok(payload) => payload,
        Err(err) => {
            error!("failed to read building data from {buildings_path}: {err}");
            std::process::exit(1);
        }
    };
    let raw: Value = match serde_json::from_str(&payload) {
        Ok(raw) => raw,
        Err(err) => {
            error!("building data is not valid JSON: {err}");
            std::process::exit(1);
        }
    };

    // A payload without a features array still serves verbatim; the render
    // list just stays empty.
    let records = match BuildingSet::from_geojson_value(&raw) {
        Ok(set) => set.records,
        Err(err) => {
            warn!("building ingest degraded: {err}");
            Vec::new()
        }
    };
    let boxes = project_buildings(&records, &ProjectorConfig::default());
    info!(
        "projected {} boxes from {} records ({buildings_path})",
        boxes.len(),
        records.len()
    );

    let state = AppState {
        raw: Bytes::from(payload),
        boxes: Arc::new(boxes),
        llm: Arc::new(llm),
        http: reqwest::Client::new(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/buildings", get(get_buildings))
        .route("/api/boxes", get(get_boxes))
        .route("/api/query", post(post_query))
        .route("/api/highlight", post(post_highlight))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("dashboard server listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app)
        .await
        .unwrap();
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

/// The raw GeoJSON document, exactly as loaded.
async fn get_buildings(State(state): State<AppState>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    (StatusCode::OK, headers, Body::from(state.raw.clone())).into_response()
}

/// The projected render list.
async fn get_boxes(State(state): State<AppState>) -> Response {
    Json(state.boxes.as_ref()).into_response()
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: String,
}

/// Natural-language query -> structured filter, via the hosted model.
///
/// A failed or slow call mutates nothing: the client keeps whatever
/// highlight set it had.
async fn post_query(State(state): State<AppState>, Json(req): Json<QueryRequest>) -> Response {
    match llm::parse_query(&state.http, &state.llm, &req.query).await {
        Ok(filter) => Json(filter).into_response(),
        Err(LlmError::NoFilter) => {
            warn!("model produced no usable filter for query: {}", req.query);
            error_response(StatusCode::BAD_REQUEST, "Invalid LLM output")
        }
        Err(LlmError::Transport(reason)) => {
            warn!("query service unreachable: {reason}");
            error_response(StatusCode::BAD_GATEWAY, "query service unreachable")
        }
    }
}

#[derive(Debug, Serialize)]
struct HighlightResponse {
    ids: Vec<u32>,
}

/// Server-side twin of the client's filter evaluator: validates an
/// untrusted filter payload and returns the matching building ids.
async fn post_highlight(State(state): State<AppState>, Json(payload): Json<Value>) -> Response {
    let valid = match Filter::from_value(&payload).and_then(Filter::validate) {
        Ok(valid) => valid,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    };

    let highlights = evaluate(&valid, &state.boxes);
    let ids: Vec<u32> = highlights.iter_indices().collect();
    Json(HighlightResponse { ids }).into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
