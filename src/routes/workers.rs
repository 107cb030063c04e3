use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::db::{self, earning_queries, worker_queries};
use crate::error::AppError;
use crate::models::earning::EarningRecord;
use crate::models::worker::{Availability, NewWorker, Worker};

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub availability: Availability,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub success: bool,
    pub availability: Availability,
}

#[derive(Debug, Serialize)]
pub struct EarningsResponse {
    pub earnings: Vec<EarningRecord>,
    pub total: f64,
}

/// POST /api/v1/workers — administrative worker registration.
///
/// The role enum is authoritative; the legacy id prefix must agree with it
/// so prefix-matched broadcasts and role-based lookups never diverge.
pub async fn register(
    State(state): State<AppState>,
    Json(new): Json<NewWorker>,
) -> Result<(StatusCode, Json<Worker>), AppError> {
    new.validate()?;

    if !new.worker_id.starts_with(new.role.prefix()) {
        return Err(AppError::Validation(format!(
            "worker_id must start with role prefix {}",
            new.role.prefix()
        )));
    }

    let worker = worker_queries::create_worker(&state.db, &new)
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e, None) {
                AppError::Validation("worker with this id, phone, or email already exists".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

    tracing::info!(worker_id = %worker.worker_id, role = %worker.role, "worker registered");
    Ok((StatusCode::CREATED, Json(worker)))
}

/// GET /api/v1/workers/{worker_id} — worker profile.
pub async fn profile(
    State(state): State<AppState>,
    Path(worker_id): Path<String>,
) -> Result<Json<Worker>, AppError> {
    let worker = worker_queries::get_worker(&state.db, &worker_id)
        .await?
        .ok_or_else(|| AppError::NotFound("worker not found".to_string()))?;
    Ok(Json(worker))
}

/// PATCH /api/v1/workers/{worker_id}/availability — workers may toggle
/// themselves available or offline; busy is system-managed.
pub async fn set_availability(
    State(state): State<AppState>,
    Path(worker_id): Path<String>,
    Json(req): Json<AvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    if !matches!(req.availability, Availability::Available | Availability::Offline) {
        return Err(AppError::Validation("invalid availability".to_string()));
    }

    let availability = worker_queries::update_availability(&state.db, &worker_id, req.availability)
        .await?
        .ok_or_else(|| AppError::NotFound("worker not found".to_string()))?;

    Ok(Json(AvailabilityResponse {
        success: true,
        availability,
    }))
}

/// GET /api/v1/workers/{worker_id}/earnings — settlement ledger plus total.
pub async fn earnings(
    State(state): State<AppState>,
    Path(worker_id): Path<String>,
) -> Result<Json<EarningsResponse>, AppError> {
    if worker_queries::get_worker(&state.db, &worker_id).await?.is_none() {
        return Err(AppError::NotFound("worker not found".to_string()));
    }

    let earnings = earning_queries::list_for_worker(&state.db, &worker_id).await?;
    let total = earning_queries::total_for_worker(&state.db, &worker_id).await?;

    Ok(Json(EarningsResponse { earnings, total }))
}
