//! Health endpoint.
//!
//! # Key invariants and assumptions
//! - Not gated by the authorization middleware.
//! - With the MongoDB backend a failed ping turns the probe into a 500.
use crate::api::error::{ApiError, api_store};
use crate::api::types::HealthStatus;
use crate::app::AppState;
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service health", body = HealthStatus),
        (status = 500, description = "Policy store unreachable", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    if let Some(store) = &state.store {
        store
            .ping()
            .await
            .map_err(|err| api_store("policy store unavailable", &err))?;
    }
    Ok(Json(HealthStatus {
        status: "ok".to_string(),
        backend: state.backend.to_string(),
    }))
}
