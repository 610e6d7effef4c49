mod config;
mod metrics;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing_subscriber;

use config::AppConfig;
use evaluate::{Evaluator, OllamaClient, RetryPolicy};
use metrics::{Metrics, MetricsSnapshot};
use rank::{EvaluationOutcome, RankConfig, RankError, Ranker, Ranking};
use store::QdrantStore;

struct AppState {
    ranker: Ranker<QdrantStore, QdrantStore, Evaluator>,
    store: QdrantStore,
    llm: OllamaClient,
    metrics: Arc<Metrics>,
}

#[derive(Deserialize)]
struct RankRequest {
    jd_id: String,
    cv_ids: Vec<String>,
    top_n: Option<usize>,
}

#[derive(Serialize)]
struct RankResponse {
    request_id: String,
    #[serde(flatten)]
    ranking: Ranking,
}

#[derive(Serialize)]
struct HealthResponse {
    qdrant: String,
    ollama: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    tracing::info!(
        qdrant = %config.qdrant_url,
        ollama = %config.ollama_url,
        model = %config.model,
        "Starting ranking service"
    );

    let store = QdrantStore::new(config.qdrant_url.clone())
        .with_collections(config.jd_collection.clone(), config.cv_collection.clone());

    let llm = OllamaClient::new(config.ollama_url.clone(), config.model.clone());
    let retry = RetryPolicy::new(
        config.retry.max_retries,
        config.retry.initial_backoff_ms,
        config.retry.max_backoff_ms,
    );
    let mut evaluator = Evaluator::new(llm.clone(), retry);
    if config.cache.enabled {
        evaluator = evaluator.with_cache(config.cache.max_entries);
    }

    let rank_config: RankConfig = config.rank.clone();
    let ranker = Ranker::new(store.clone(), store.clone(), evaluator, rank_config);

    let state = Arc::new(AppState {
        ranker,
        store,
        llm,
        metrics: Metrics::new(),
    });

    // Build router
    let app = Router::new()
        .route("/rank", post(rank_cvs))
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("Failed to bind port 3000");

    tracing::info!("Server listening on http://localhost:3000");

    axum::serve(listener, app).await.expect("Server error");
}

async fn rank_cvs(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RankRequest>,
) -> Result<Json<RankResponse>, (StatusCode, String)> {
    let request_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(
        request_id = %request_id,
        jd_id = %req.jd_id,
        candidates = req.cv_ids.len(),
        top_n = ?req.top_n,
        "Received ranking request"
    );

    let started = Instant::now();
    match state.ranker.rank(&req.jd_id, &req.cv_ids, req.top_n).await {
        Ok(ranking) => {
            let failed_evaluations = ranking
                .rankings
                .iter()
                .filter(|r| matches!(r.outcome, EvaluationOutcome::Failed { .. }))
                .count();
            state.metrics.record_success(
                started.elapsed(),
                ranking.rankings.len(),
                failed_evaluations,
                ranking.stage_one_bypassed,
            );
            Ok(Json(RankResponse {
                request_id,
                ranking,
            }))
        }
        Err(e) => {
            state.metrics.record_failure();
            tracing::error!(request_id = %request_id, error = %e, "Ranking request failed");
            Err((status_for(&e), e.to_string()))
        }
    }
}

fn status_for(error: &RankError) -> StatusCode {
    match error {
        RankError::EmptyCandidateSet | RankError::InvalidTopN => StatusCode::BAD_REQUEST,
        RankError::UnknownJobDescription(_) => StatusCode::NOT_FOUND,
        RankError::NoScoredCandidates(_) => StatusCode::BAD_GATEWAY,
        RankError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let qdrant = match state.store.ping().await {
        Ok(()) => "ok".to_string(),
        Err(e) => format!("error: {}", e),
    };
    let ollama = match state.llm.ping().await {
        Ok(()) => "ok".to_string(),
        Err(e) => format!("error: {}", e),
    };
    Json(HealthResponse { qdrant, ollama })
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
