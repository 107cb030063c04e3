use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::db::catalog_queries;
use crate::error::AppError;
use crate::models::catalog::CatalogService;

#[derive(Debug, Deserialize)]
pub struct ServiceLookupParams {
    pub name: Option<String>,
}

/// GET /api/v1/services?name= — published price and required consumables
/// for a service, matched case-insensitively by exact name.
pub async fn lookup_service(
    State(state): State<AppState>,
    Query(params): Query<ServiceLookupParams>,
) -> Result<Json<CatalogService>, AppError> {
    let name = params
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::Validation("service name required".to_string()))?;

    let service = catalog_queries::find_by_name(&state.db, &name)
        .await?
        .ok_or_else(|| AppError::NotFound("service not found".to_string()))?;

    Ok(Json(service))
}
