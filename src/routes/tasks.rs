use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::{earning_queries, task_queries, worker_queries};
use crate::error::AppError;
use crate::models::task::{NewTask, Task};
use crate::services::lifecycle::{self, ResponseAction};
use crate::services::{assignment, otp, settlement};

#[derive(Debug, Deserialize)]
pub struct ListTasksParams {
    pub worker_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub task_id: Uuid,
    pub worker_id: String,
    pub action: ResponseAction,
}

#[derive(Debug, Deserialize)]
pub struct RequestOtpRequest {
    pub task_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub order_id: String,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    pub order_id: String,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub total_earning: f64,
    pub workers_paid: usize,
}

/// POST /api/v1/tasks — place a customer order and broadcast it.
///
/// The role lookup happens once: the derived category drives both the order
/// id prefix and the roster, atomically with the insert.
pub async fn create_task(
    State(state): State<AppState>,
    Json(new): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    new.validate()?;

    let role = assignment::derive_role(&new.cart);
    let pool_workers = worker_queries::list_workers_by_role(&state.db, role).await?;
    let roster = assignment::build_roster(&pool_workers);

    let task =
        task_queries::create_task(&state.db, &new, role, &roster, state.order_id_retries).await?;

    metrics::counter!("tasks_created_total").increment(1);
    tracing::info!(
        order_id = %task.order_id,
        role = %role,
        roster_size = task.assigned_workers.len(),
        "task created and broadcast"
    );

    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/v1/tasks?worker_id= — tasks visible to a worker, matched by the
/// role prefix shared between worker ids and order ids.
pub async fn list_tasks_for_worker(
    State(state): State<AppState>,
    Query(params): Query<ListTasksParams>,
) -> Result<Json<Vec<Task>>, AppError> {
    let prefix = params
        .worker_id
        .get(..2)
        .ok_or_else(|| AppError::Validation("worker_id is required".to_string()))?;

    let tasks = task_queries::list_tasks_by_prefix(&state.db, prefix).await?;
    Ok(Json(tasks))
}

/// PATCH /api/v1/tasks/respond — a worker accepts or rejects a broadcast
/// task. First accept wins; the roster update and the derived task status
/// are applied as one row-locked write.
pub async fn respond(
    State(state): State<AppState>,
    Json(req): Json<RespondRequest>,
) -> Result<Json<Task>, AppError> {
    let mut tx = state.db.begin().await?;

    let mut task = task_queries::fetch_task_for_update(&mut tx, req.task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("task not found".to_string()))?;

    let outcome = lifecycle::apply_response(&mut task, &req.worker_id, req.action)?;
    task_queries::persist_lifecycle(&mut tx, &task).await?;
    tx.commit().await?;

    metrics::counter!("task_responses_total", "action" => req.action.to_string()).increment(1);
    tracing::info!(
        order_id = %task.order_id,
        worker_id = %req.worker_id,
        outcome = ?outcome,
        "task response resolved"
    );

    Ok(Json(task))
}

/// POST /api/v1/tasks/request-otp — arm the presence gate on an accepted
/// task and deliver the code to the customer.
pub async fn request_otp(
    State(state): State<AppState>,
    Json(req): Json<RequestOtpRequest>,
) -> Result<Json<OkResponse>, AppError> {
    let code = otp::generate_code();

    let mut tx = state.db.begin().await?;
    let mut task = task_queries::fetch_task_for_update(&mut tx, req.task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("task not found".to_string()))?;

    lifecycle::request_otp(&mut task, code.clone())?;
    task_queries::persist_lifecycle(&mut tx, &task).await?;
    tx.commit().await?;

    // Delivery is out-of-band; a channel failure must not undo the code.
    if let Err(e) = state.delivery.deliver(&task.phone, &code).await {
        tracing::warn!(order_id = %task.order_id, error = %e, "otp delivery failed");
    }

    tracing::info!(order_id = %task.order_id, "service otp requested");
    Ok(Json(OkResponse { success: true }))
}

/// POST /api/v1/tasks/verify-otp — customer-held code confirms on-site
/// presence and moves the task into progress.
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<OkResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    let mut task = task_queries::fetch_task_by_order_for_update(&mut tx, &req.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("task not found".to_string()))?;

    lifecycle::verify_otp(&mut task, &req.otp)?;
    task_queries::persist_lifecycle(&mut tx, &task).await?;
    tx.commit().await?;

    metrics::counter!("otp_verifications_total").increment(1);
    tracing::info!(order_id = %task.order_id, "service otp verified, work in progress");

    Ok(Json(OkResponse { success: true }))
}

/// POST /api/v1/tasks/complete — finish an in-progress task and settle
/// earnings. Ledger inserts are idempotent per (worker, order, service), and
/// balances are only incremented for lines actually recorded, so a replayed
/// completion can never pay twice.
pub async fn complete(
    State(state): State<AppState>,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<CompleteResponse>, AppError> {
    let mut tx = state.db.begin().await?;
    let mut task = task_queries::fetch_task_by_order_for_update(&mut tx, &req.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("task not found".to_string()))?;

    let result = settlement::settle(&mut task)?;

    for line in &result.lines {
        let credited = earning_queries::record_credit(&mut tx, &task.order_id, line).await?;
        if credited {
            worker_queries::credit_earning(&mut tx, &line.worker_id, line.amount).await?;
        }
    }

    task_queries::persist_lifecycle(&mut tx, &task).await?;
    tx.commit().await?;

    metrics::counter!("tasks_completed_total").increment(1);
    metrics::histogram!("settlement_amount").record(result.total_earning);
    tracing::info!(
        order_id = %task.order_id,
        total_earning = result.total_earning,
        workers_paid = result.payees.len(),
        "task completed and settled"
    );

    Ok(Json(CompleteResponse {
        total_earning: result.total_earning,
        workers_paid: result.payees.len(),
    }))
}
