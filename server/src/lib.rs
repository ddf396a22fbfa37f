use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use fabler_core::persist::load_collection;
use fabler_core::{DocId, Document, Engine, ModelKind, SearchOptions, SignatureParams, TermView, DEFAULT_K};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub stop_word_filtering: bool,
    #[serde(default)]
    pub stemming: bool,
}
fn default_k() -> usize { DEFAULT_K }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub model: ModelKind,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub title: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<fabler_core::Error> for ApiError {
    fn from(err: fabler_core::Error) -> Self {
        match err {
            fabler_core::Error::Parse(_) | fabler_core::Error::Config(_) => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Engines are built on first use for each model and term view, then shared.
#[derive(Clone)]
pub struct AppState {
    pub collection: Arc<Vec<Document>>,
    pub positions: Arc<HashMap<DocId, usize>>,
    pub signature: SignatureParams,
    engines: Arc<RwLock<HashMap<(ModelKind, TermView), Arc<Engine>>>>,
}

impl AppState {
    pub fn new(collection: Vec<Document>, signature: SignatureParams) -> Self {
        let positions = collection.iter().enumerate().map(|(i, d)| (d.id, i)).collect();
        Self {
            collection: Arc::new(collection),
            positions: Arc::new(positions),
            signature,
            engines: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn document(&self, id: DocId) -> Option<&Document> {
        self.positions.get(&id).map(|&i| &self.collection[i])
    }

    /// The engine for `kind` over `view`, built by the first caller while it
    /// holds the write lock so each one is built once.
    pub fn engine(&self, kind: ModelKind, view: TermView) -> fabler_core::Result<Arc<Engine>> {
        let key = (kind, view);
        if let Some(engine) = self.engines.read().get(&key) {
            return Ok(engine.clone());
        }
        let mut engines = self.engines.write();
        if let Some(engine) = engines.get(&key) {
            return Ok(engine.clone());
        }
        let options = SearchOptions { stop_word_filtering: view.stop_word_filtering, stemming: view.stemming, k: DEFAULT_K };
        let engine = Arc::new(Engine::build(kind, &self.collection, options, self.signature)?);
        engines.insert(key, engine.clone());
        Ok(engine)
    }

    pub fn cached_engines(&self) -> usize {
        self.engines.read().len()
    }
}

pub fn build_app(collection_path: &std::path::Path, signature: SignatureParams) -> Result<Router> {
    signature.validate()?;
    let collection = load_collection(collection_path)?;
    tracing::info!(path = %collection_path.display(), num_docs = collection.len(), "loaded collection");
    Ok(router(AppState::new(collection, signature)))
}

/// `CORS_ALLOW_ORIGIN` holds a comma-separated origin list; unset, empty or
/// unparsable values fall back to any origin.
fn cors_layer(allowed: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(std::env::var("CORS_ALLOW_ORIGIN").ok().as_deref());
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let model = match params.model.as_deref() {
        Some(name) => name.parse::<ModelKind>()?,
        None => ModelKind::Vector,
    };
    let view = TermView::new(params.stop_word_filtering, params.stemming);
    let engine = state.engine(model, view)?;
    let hits = engine.search_top(&params.q, params.k.min(MAX_K))?;

    let results: Vec<SearchHit> = hits
        .iter()
        .filter_map(|hit| {
            let doc = state.document(hit.doc_id)?;
            Some(SearchHit { doc_id: hit.doc_id, score: hit.score, title: doc.title.clone() })
        })
        .collect();
    tracing::debug!(query = %params.q, %model, hits = results.len(), "served search");

    Ok(Json(SearchResponse {
        query: params.q,
        model,
        took_s: start.elapsed().as_secs_f64(),
        total_hits: results.len(),
        results,
    }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let doc = state
        .document(doc_id)
        .ok_or_else(|| ApiError::NotFound(format!("no document with id {doc_id}")))?;
    Ok(Json(json!({
        "doc_id": doc.id,
        "title": doc.title,
        "text": doc.raw_text,
        "num_terms": doc.terms.len(),
    })))
}
