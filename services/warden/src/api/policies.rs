//! Policy administration endpoints.
//!
//! # Purpose and responsibility
//! Seeds the starter policy and lets operators inspect, add, remove and reload
//! permission and grouping rules at runtime.
//!
//! # Key invariants and assumptions
//! - Every route except `/init` goes through the authorization middleware, so
//!   only callers allowed on these paths (the seeded admin role) reach them.
//! - Mutations are written through to the configured adapter immediately.
use crate::api::error::{ApiError, api_authz, api_not_found};
use crate::app::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use warden_authz::enforcer;
use warden_authz::seed::install_seed;
use warden_authz::{GroupingRule, PolicyRule, PolicySnapshot};

#[utoipa::path(
    post,
    path = "/init",
    tag = "policies",
    responses(
        (status = 200, description = "Seed policy installed and saved", body = String),
        (status = 500, description = "Saving the policy failed", body = crate::api::types::ErrorResponse)
    )
)]
/// Install the starter roles and rules, then persist the whole policy.
///
/// # Errors
/// - Returns 500 when the adapter cannot save the policy.
pub async fn init_policy(State(state): State<AppState>) -> Result<Json<&'static str>, ApiError> {
    install_seed(&state.enforcer)
        .await
        .map_err(|err| api_authz("failed to install seed policy", &err))?;
    Ok(Json("OK"))
}

#[utoipa::path(
    get,
    path = "/policies",
    tag = "policies",
    params(("user" = Option<String>, Header, description = "Caller identity")),
    responses(
        (status = 200, description = "Every loaded rule", body = PolicySnapshot),
        (status = 401, description = "Caller not allowed", body = String)
    )
)]
pub async fn list_policies(State(state): State<AppState>) -> Json<PolicySnapshot> {
    Json(enforcer::snapshot(&state.enforcer).await)
}

#[utoipa::path(
    post,
    path = "/policies",
    tag = "policies",
    params(("user" = Option<String>, Header, description = "Caller identity")),
    request_body = PolicyRule,
    responses(
        (status = 201, description = "Rule added", body = PolicyRule),
        (status = 200, description = "Rule already present", body = PolicyRule),
        (status = 400, description = "Blank subject or object", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn add_policy(
    State(state): State<AppState>,
    Json(rule): Json<PolicyRule>,
) -> Result<(StatusCode, Json<PolicyRule>), ApiError> {
    let added = enforcer::add_policy(&state.enforcer, &rule)
        .await
        .map_err(|err| api_authz("failed to add policy", &err))?;
    Ok((created_or_ok(added), Json(rule)))
}

#[utoipa::path(
    delete,
    path = "/policies",
    tag = "policies",
    params(("user" = Option<String>, Header, description = "Caller identity")),
    request_body = PolicyRule,
    responses(
        (status = 204, description = "Rule removed"),
        (status = 404, description = "No such rule", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn remove_policy(
    State(state): State<AppState>,
    Json(rule): Json<PolicyRule>,
) -> Result<StatusCode, ApiError> {
    let removed = enforcer::remove_policy(&state.enforcer, &rule)
        .await
        .map_err(|err| api_authz("failed to remove policy", &err))?;
    if !removed {
        return Err(api_not_found("policy not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/groupings",
    tag = "policies",
    params(("user" = Option<String>, Header, description = "Caller identity")),
    request_body = GroupingRule,
    responses(
        (status = 201, description = "Role assigned", body = GroupingRule),
        (status = 200, description = "Role already assigned", body = GroupingRule),
        (status = 400, description = "Blank user or role", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn add_grouping(
    State(state): State<AppState>,
    Json(rule): Json<GroupingRule>,
) -> Result<(StatusCode, Json<GroupingRule>), ApiError> {
    let added = enforcer::add_grouping(&state.enforcer, &rule)
        .await
        .map_err(|err| api_authz("failed to add grouping", &err))?;
    Ok((created_or_ok(added), Json(rule)))
}

#[utoipa::path(
    delete,
    path = "/groupings",
    tag = "policies",
    params(("user" = Option<String>, Header, description = "Caller identity")),
    request_body = GroupingRule,
    responses(
        (status = 204, description = "Role unassigned"),
        (status = 404, description = "No such grouping", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn remove_grouping(
    State(state): State<AppState>,
    Json(rule): Json<GroupingRule>,
) -> Result<StatusCode, ApiError> {
    let removed = enforcer::remove_grouping(&state.enforcer, &rule)
        .await
        .map_err(|err| api_authz("failed to remove grouping", &err))?;
    if !removed {
        return Err(api_not_found("grouping not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/policies/reload",
    tag = "policies",
    params(("user" = Option<String>, Header, description = "Caller identity")),
    responses(
        (status = 200, description = "Rules reloaded from the store", body = String),
        (status = 500, description = "Loading failed", body = crate::api::types::ErrorResponse)
    )
)]
/// Replace the in-memory rules with what the store currently holds.
pub async fn reload_policies(State(state): State<AppState>) -> Result<Json<&'static str>, ApiError> {
    enforcer::reload(&state.enforcer)
        .await
        .map_err(|err| api_authz("failed to reload policy", &err))?;
    tracing::info!("policy reloaded");
    Ok(Json("OK"))
}

fn created_or_ok(added: bool) -> StatusCode {
    if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    }
}
