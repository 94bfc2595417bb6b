//! Role lookup for the calling user.
use crate::app::AppState;
use crate::auth::middleware::caller_from_headers;
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use warden_authz::enforcer::roles_for_user;

#[utoipa::path(
    get,
    path = "/roles",
    tag = "pages",
    params(("user" = Option<String>, Header, description = "Caller identity")),
    responses(
        (status = 200, description = "Roles directly assigned to the caller", body = [String]),
        (status = 401, description = "Caller not allowed", body = String)
    )
)]
/// Return the roles directly assigned to the caller named in the headers.
///
/// Inherited roles are not expanded.
pub async fn caller_roles(State(state): State<AppState>, headers: HeaderMap) -> Json<Vec<String>> {
    let caller = caller_from_headers(&headers);
    Json(roles_for_user(&state.enforcer, &caller).await)
}
