use crate::infra::{AppState, InMemoryLeadSink};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use brokerage_site::auth::{auth_router, guarded, RouteRequirement, SessionProvider};
use brokerage_site::contact::{contact_router, FormRegistry, LeadSubmission};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct LeadListResponse {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) total: usize,
    pub(crate) leads: Vec<LeadSubmission>,
}

pub(crate) fn with_site_routes<P>(
    registry: Arc<FormRegistry<InMemoryLeadSink>>,
    sessions: Arc<P>,
    leads: Arc<InMemoryLeadSink>,
) -> Router
where
    P: SessionProvider + 'static,
{
    let admin = guarded(
        Router::new()
            .route("/admin/leads", get(lead_list_endpoint))
            .with_state(leads),
        sessions.clone(),
        RouteRequirement::Admin,
    );

    contact_router(registry)
        .merge(auth_router(sessions))
        .merge(admin)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn lead_list_endpoint(
    State(leads): State<Arc<InMemoryLeadSink>>,
) -> Json<LeadListResponse> {
    let leads = leads.leads();
    Json(LeadListResponse {
        generated_at: Utc::now(),
        total: leads.len(),
        leads,
    })
}
