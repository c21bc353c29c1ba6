//! REST API server for forgechain
//!
//! Maps the ledger facade onto HTTP: chain inspection, payload submission,
//! and mine cycles with an optional timeout.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{self, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use crate::block::Block;
use crate::error::ChainError;
use crate::ledger::{Ledger, MineOutcome};
use crate::miner::StopSignal;

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    ChainRejected(ChainError),
    InvalidInput(String),
    NotFound(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::ChainRejected(e) => {
                let status = match e {
                    // A stale candidate is retryable; everything else from
                    // the chain is a server-side fault.
                    ChainError::LinkageMismatch(_) => StatusCode::CONFLICT,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        ApiError::ChainRejected(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
struct ChainResponse {
    length: usize,
    chain: Vec<Block>,
}

#[derive(Serialize)]
struct PendingResponse {
    count: usize,
    transactions: Vec<String>,
}

#[derive(Deserialize)]
struct SubmitRequest {
    payload: String,
}

#[derive(Serialize)]
struct SubmitResponse {
    pending: usize,
}

#[derive(Deserialize, Default)]
struct MineRequest {
    /// Payloads to enqueue before the cycle starts.
    #[serde(default)]
    transactions: Vec<String>,
    /// Bound on the search; when it fires the cycle reports `cancelled`
    /// and the pool is left untouched.
    #[serde(default)]
    timeout_ms: Option<u64>,
}

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum MineResponse {
    Sealed { block: Block },
    EmptyPool,
    Cancelled,
}

// ============================================================================
// Router
// ============================================================================

pub fn build_router(ledger: Arc<Ledger>) -> Router {
    // CORS configuration - allow all origins with credentials
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .route("/chain", get(get_chain))
        .route("/chain/:index", get(get_block))
        .route("/pending", get(get_pending))
        .route("/transactions", post(submit_transaction))
        .route("/mine", post(mine))
        .route("/health", get(health_check))
        .with_state(ledger)
        .layer(cors)
}

/// Bind and serve the API until the process exits.
pub async fn run_api_server(
    ledger: Arc<Ledger>,
    bind_addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(ledger);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("API server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn get_chain(State(ledger): State<Arc<Ledger>>) -> impl IntoResponse {
    let chain = ledger.chain_snapshot();
    Json(ChainResponse {
        length: chain.len(),
        chain,
    })
}

async fn get_block(
    State(ledger): State<Arc<Ledger>>,
    Path(index): Path<u64>,
) -> Result<Json<Block>, ApiError> {
    ledger
        .block_at(index)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Block at index {} not found", index)))
}

async fn get_pending(State(ledger): State<Arc<Ledger>>) -> impl IntoResponse {
    let transactions = ledger.pending_snapshot();
    Json(PendingResponse {
        count: transactions.len(),
        transactions,
    })
}

async fn submit_transaction(
    State(ledger): State<Arc<Ledger>>,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    if req.payload.is_empty() {
        return Err(ApiError::InvalidInput(
            "payload must not be empty".to_string(),
        ));
    }
    let pending = ledger.submit_transaction(req.payload);
    Ok((StatusCode::CREATED, Json(SubmitResponse { pending })))
}

/// Enqueue any payloads carried in the body, then run one mine cycle. The
/// search is offloaded to a blocking thread so the runtime keeps serving
/// reads while it runs.
async fn mine(
    State(ledger): State<Arc<Ledger>>,
    body: Option<Json<MineRequest>>,
) -> Result<Json<MineResponse>, ApiError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    for payload in req.transactions {
        ledger.submit_transaction(payload);
    }

    let stop = StopSignal::new();
    if let Some(ms) = req.timeout_ms {
        let timer_stop = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            timer_stop.request_stop();
        });
    }

    let worker = ledger.clone();
    let outcome = tokio::task::spawn_blocking(move || worker.mine_with_signal(&stop))
        .await
        .map_err(|e| ApiError::InternalError(format!("mining task failed: {}", e)))??;

    Ok(Json(match outcome {
        MineOutcome::Sealed(block) => MineResponse::Sealed { block },
        MineOutcome::EmptyPool => MineResponse::EmptyPool,
        MineOutcome::Cancelled => MineResponse::Cancelled,
    }))
}

async fn health_check(State(ledger): State<Arc<Ledger>>) -> impl IntoResponse {
    match ledger.validate() {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "length": ledger.len(),
                "difficulty": ledger.difficulty(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "corrupt",
                "error": e.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            })),
        )
            .into_response(),
    }
}
