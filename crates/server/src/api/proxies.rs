//! Proxy pool API handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rotaproxy_core::{ProxyEndpoint, ProxyStatus};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct DispatchParams {
    /// Overrides the configured deadline for this request.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub name: String,
    pub base_url: String,
}

#[derive(Debug, Serialize)]
pub struct ProxiesResponse {
    /// Index of the next candidate.
    pub cursor: usize,
    pub proxies: Vec<ProxyStatus>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/proxies
///
/// Current capacity of every proxy in pool order.
pub async fn list_proxies(State(state): State<Arc<AppState>>) -> Json<ProxiesResponse> {
    let dispatcher = state.dispatcher();
    Json(ProxiesResponse {
        cursor: dispatcher.cursor(),
        proxies: dispatcher.proxies().iter().map(|p| p.status()).collect(),
    })
}

/// POST /api/v1/dispatch
///
/// Reserve one request slot on the next proxy with capacity.
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DispatchParams>,
) -> Result<Json<DispatchResponse>, impl IntoResponse> {
    let dispatcher = state.dispatcher();

    let mut policy = *dispatcher.policy();
    if let Some(ms) = params.deadline_ms {
        policy.deadline = Some(Duration::from_millis(ms));
    }

    match dispatcher.acquire_with(&policy).await {
        Ok(proxy) => {
            debug!(proxy = proxy.name(), "Dispatched request slot");
            Ok(Json(DispatchResponse {
                name: proxy.name().to_string(),
                base_url: proxy.base_url().to_string(),
            }))
        }
        Err(e) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
