//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db;
use crate::errors::Result;
use crate::events::{ApplicationRecord, ApplicationStatus, EventRecord};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ApplicationEventsResponse {
    pub application_id: i64,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

/// Public view of an application: only the plaintext fields the contract
/// exposes, plus derived funding progress.
#[derive(Debug, Serialize)]
pub struct ApplicationView {
    pub application_id: i64,
    pub applicant: String,
    pub public_amount: String,
    pub status: Option<ApplicationStatus>,
    pub verifier: Option<String>,
    pub donated_amount: String,
    pub progress_percent: u8,
    pub submitted_at: i64,
    pub updated_ledger: i64,
}

impl From<ApplicationRecord> for ApplicationView {
    fn from(record: ApplicationRecord) -> Self {
        let progress_percent = record.progress_percent();
        Self {
            application_id: record.application_id,
            status: ApplicationStatus::from_code(record.status),
            applicant: record.applicant,
            public_amount: record.public_amount,
            verifier: record.verifier,
            donated_amount: record.donated_amount,
            progress_percent,
            submitted_at: record.submitted_at,
            updated_ledger: record.updated_ledger,
        }
    }
}

#[derive(Serialize)]
pub struct ApplicationsResponse {
    pub count: usize,
    pub applications: Vec<ApplicationView>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /events`
///
/// Returns all indexed events across all applications.
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> Result<Json<AllEventsResponse>> {
    let events = db::get_all_events(&state.pool).await?;
    Ok(Json(AllEventsResponse {
        count: events.len(),
        events,
    }))
}

/// `GET /applications`
pub async fn list_applications(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ApplicationsResponse>> {
    let applications: Vec<ApplicationView> = db::list_applications(&state.pool)
        .await?
        .into_iter()
        .map(ApplicationView::from)
        .collect();
    Ok(Json(ApplicationsResponse {
        count: applications.len(),
        applications,
    }))
}

/// `GET /applications/:id`
///
/// 404 when the indexer has not seen the application yet.
pub async fn get_application(
    State(state): State<Arc<ApiState>>,
    Path(application_id): Path<i64>,
) -> Result<Json<ApplicationView>> {
    let record = db::get_application(&state.pool, application_id).await?;
    Ok(Json(record.into()))
}

/// `GET /applications/:id/events`
pub async fn get_application_events(
    State(state): State<Arc<ApiState>>,
    Path(application_id): Path<i64>,
) -> Result<Json<ApplicationEventsResponse>> {
    let events = db::get_events_for_application(&state.pool, application_id).await?;
    Ok(Json(ApplicationEventsResponse {
        application_id,
        count: events.len(),
        events,
    }))
}
