use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use base64::Engine;
use image::ImageFormat;
use serde::Serialize;

use crate::app_state::AppState;
use crate::db::{proof_queries, task_queries};
use crate::error::AppError;
use crate::models::proof::Proof;
use crate::models::task::AssignmentStatus;

#[derive(Debug, Serialize)]
pub struct ProofResponse {
    pub success: bool,
    pub proof: Proof,
}

/// POST /api/v1/proof/{order_id} — upload a proof-of-work image.
///
/// Only the worker holding the accepted roster entry on the order may
/// attach proof. Accepts jpeg/png/webp; stored inline as a base64 data URI.
pub async fn upload_proof(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ProofResponse>), AppError> {
    let mut worker_id: Option<String> = None;
    let mut image_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::Validation("malformed multipart body".to_string()))?
    {
        match field.name() {
            Some("worker_id") => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::Validation("invalid worker_id field".to_string()))?;
                worker_id = Some(value);
            }
            Some("image") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::Validation("invalid image field".to_string()))?;
                image_data = Some(data.to_vec());
            }
            _ => {}
        }
    }

    let worker_id =
        worker_id.ok_or_else(|| AppError::Validation("worker_id is required".to_string()))?;
    let image_data =
        image_data.ok_or_else(|| AppError::Validation("image is required".to_string()))?;

    let format = image::guess_format(&image_data)
        .map_err(|_| AppError::Validation("unrecognized image format".to_string()))?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP) {
        return Err(AppError::Validation("invalid file type".to_string()));
    }

    let task = task_queries::get_task_by_order(&state.db, &order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;

    let authorized = task
        .assigned_workers
        .iter()
        .any(|entry| entry.worker_id == worker_id && entry.status == AssignmentStatus::Accepted);
    if !authorized {
        return Err(AppError::Forbidden("worker not authorized".to_string()));
    }

    let encoded = base64::engine::general_purpose::STANDARD.encode(&image_data);
    let data_uri = format!("data:{};base64,{}", format.to_mime_type(), encoded);

    let proof = proof_queries::create_proof(&state.db, &worker_id, &order_id, &data_uri).await?;

    tracing::info!(order_id = %order_id, worker_id = %worker_id, "proof of work stored");
    Ok((
        StatusCode::CREATED,
        Json(ProofResponse {
            success: true,
            proof,
        }),
    ))
}

/// GET /api/v1/proof/{order_id} — proofs attached to an order.
pub async fn list_proofs(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Vec<Proof>>, AppError> {
    let proofs = proof_queries::list_for_order(&state.db, &order_id).await?;
    Ok(Json(proofs))
}
