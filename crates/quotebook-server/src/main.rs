use axum::http::StatusCode;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use quotebook_core::{Quote, QuoteError, SearchOptions, SearchParams};
use quotebook_storage::{
    pick_random_from_store, search, search_then_random, InMemoryStore, PersistentStore,
    RandomStrategy, Storage,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod metrics;

use config::ServerConfig;

#[derive(Clone)]
struct AppState {
    store: Arc<dyn Storage>,
    search: SearchOptions,
    random: RandomStrategy,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cfg = ServerConfig::from_env()?;
    let store: Arc<dyn Storage> = match PersistentStore::open(&cfg.db_path, &cfg.table) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            warn!(
                "loading {} failed: {}; serving an empty store",
                cfg.db_path.display(),
                e
            );
            Arc::new(InMemoryStore::new())
        }
    };
    metrics::STORE_DOCUMENTS.set(store.count() as i64);
    info!(
        documents = store.count(),
        zero_bound_as_unset = cfg.search.zero_bound_as_unset,
        random = ?cfg.random,
        "quote store ready"
    );

    let app = router(AppState {
        store,
        search: cfg.search,
        random: cfg.random,
    });

    info!("http listening on {}", cfg.http_addr);
    axum_server::bind(cfg.http_addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/random", get(random_quote))
        .route("/search", get(search_quotes))
        .route("/search_then_random", get(search_quote_then_random))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn random_quote(State(app): State<AppState>) -> impl IntoResponse {
    let _timer = metrics::OP_DURATION
        .with_label_values(&["random"])
        .start_timer();
    match pick_random_from_store(app.store.as_ref(), &mut rand::thread_rng(), app.random) {
        Ok(doc) => ok_json("random", doc.quote),
        Err(QuoteError::InvalidArgument(_)) => {
            metrics::OPS_TOTAL
                .with_label_values(&["random", "empty"])
                .inc();
            (StatusCode::NOT_FOUND, Json(json!({"error": "empty_store"}))).into_response()
        }
        Err(e) => error_response("random", &e),
    }
}

async fn search_quotes(
    State(app): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let _timer = metrics::OP_DURATION
        .with_label_values(&["search"])
        .start_timer();
    let req = params.into_request(&app.search);
    match search(app.store.as_ref(), &req, &app.search) {
        Ok(docs) => {
            metrics::SEARCH_MATCHES.observe(docs.len() as f64);
            let quotes: Vec<Quote> = docs.into_iter().map(|d| d.quote).collect();
            ok_json("search", quotes)
        }
        Err(e) => error_response("search", &e),
    }
}

async fn search_quote_then_random(
    State(app): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let _timer = metrics::OP_DURATION
        .with_label_values(&["search_then_random"])
        .start_timer();
    let req = params.into_request(&app.search);
    match search_then_random(
        app.store.as_ref(),
        &req,
        &app.search,
        &mut rand::thread_rng(),
    ) {
        Ok(Some(doc)) => ok_json("search_then_random", doc.quote),
        Ok(None) => {
            metrics::OPS_TOTAL
                .with_label_values(&["search_then_random", "no_match"])
                .inc();
            (StatusCode::NOT_FOUND, Json(json!({"error": "no_match"}))).into_response()
        }
        Err(e) => error_response("search_then_random", &e),
    }
}

async fn metrics() -> impl IntoResponse {
    use prometheus::{Encoder, TextEncoder};
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buf = Vec::new();
    let _ = encoder.encode(&metric_families, &mut buf);
    (StatusCode::OK, String::from_utf8(buf).unwrap_or_default())
}

fn ok_json<T: serde::Serialize>(op: &str, body: T) -> Response {
    metrics::OPS_TOTAL.with_label_values(&[op, "ok"]).inc();
    (StatusCode::OK, Json(body)).into_response()
}

fn error_response(op: &str, e: &QuoteError) -> Response {
    let status = match e {
        QuoteError::NotFound(_) => StatusCode::NOT_FOUND,
        QuoteError::InvalidArgument(_) | QuoteError::MalformedFilter { .. } => {
            StatusCode::BAD_REQUEST
        }
        QuoteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!(op, %status, "request failed: {}", e);
    metrics::OPS_TOTAL.with_label_values(&[op, "error"]).inc();
    (status, Json(json!({"error": e.to_string()}))).into_response()
}
