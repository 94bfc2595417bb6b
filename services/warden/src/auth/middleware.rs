//! Authorization middleware.
//!
//! # Key invariants and assumptions
//! - The caller identity is taken from the `user` header as-is, falling back
//!   to `role`. It is not authenticated.
//! - The object checked is the full request URI (path plus query).
//! - Denials answer 401 with a JSON string body; engine failures answer 500.
use crate::api::error::api_internal_message;
use crate::app::AppState;
use crate::observability::record_decision;
use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use warden_authz::enforcer::{authorize, subjects};

pub const USER_HEADER: &str = "user";
pub const ROLE_HEADER: &str = "role";

/// Paths served without a policy check.
const PUBLIC_PATHS: &[&str] = &["/init", "/health", "/openapi.json"];

fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Caller identity from the request headers; empty when neither is set.
pub fn caller_from_headers(headers: &HeaderMap) -> String {
    [USER_HEADER, ROLE_HEADER]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string()
}

pub fn denial_message(caller: &str, object: &str) -> String {
    format!("The current user ({caller}) is not allowed to execute {object}\n")
}

pub async fn authorize_request(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if is_public_path(request.uri().path()) {
        return next.run(request).await;
    }

    let caller = caller_from_headers(request.headers());
    let object = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    tracing::info!(
        method = %request.method(),
        uri = %request.uri(),
        headers = ?request.headers(),
        "authorizing request"
    );
    if tracing::enabled!(tracing::Level::DEBUG) {
        let known = subjects(&state.enforcer).await;
        tracing::debug!(subjects = ?known, "policy subjects");
    }

    match authorize(&state.enforcer, &caller, &object).await {
        Ok(true) => {
            record_decision("allow");
            next.run(request).await
        }
        Ok(false) => {
            record_decision("deny");
            tracing::info!(caller = %caller, object = %object, "request denied");
            (StatusCode::UNAUTHORIZED, Json(denial_message(&caller, &object))).into_response()
        }
        Err(err) => {
            record_decision("error");
            tracing::error!(error = %err, caller = %caller, object = %object, "enforce failed");
            api_internal_message("authorization failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn user_header_wins_over_role() {
        let mut headers = HeaderMap::new();
        headers.insert(ROLE_HEADER, HeaderValue::from_static("role:user"));
        assert_eq!(caller_from_headers(&headers), "role:user");
        headers.insert(USER_HEADER, HeaderValue::from_static("xdorro"));
        assert_eq!(caller_from_headers(&headers), "xdorro");
    }

    #[test]
    fn missing_headers_yield_empty_caller() {
        assert_eq!(caller_from_headers(&HeaderMap::new()), "");
    }

    #[test]
    fn public_paths_are_exact() {
        assert!(is_public_path("/init"));
        assert!(is_public_path("/health"));
        assert!(!is_public_path("/init/extra"));
        assert!(!is_public_path("/protected"));
    }

    #[test]
    fn denial_message_names_caller_and_object() {
        assert_eq!(
            denial_message("ahihi", "/protected?x=1"),
            "The current user (ahihi) is not allowed to execute /protected?x=1\n"
        );
    }
}
