//! OpenAPI document for the warden HTTP API.
use crate::api::types::{ErrorResponse, HealthStatus};
use crate::api::{pages, policies, roles, system};
use axum::Json;
use utoipa::OpenApi;
use warden_authz::{GroupingRule, PolicyRule, PolicySnapshot};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "warden",
        version = "v1",
        description = "RBAC-gated HTTP service backed by a Casbin policy"
    ),
    paths(
        pages::hello,
        pages::current_time,
        pages::protected,
        roles::caller_roles,
        policies::init_policy,
        policies::list_policies,
        policies::add_policy,
        policies::remove_policy,
        policies::add_grouping,
        policies::remove_grouping,
        policies::reload_policies,
        system::health
    ),
    components(schemas(
        ErrorResponse,
        HealthStatus,
        PolicyRule,
        GroupingRule,
        PolicySnapshot
    )),
    tags(
        (name = "pages", description = "Policy-gated endpoints"),
        (name = "policies", description = "Policy administration"),
        (name = "system", description = "Health")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
