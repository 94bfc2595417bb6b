//! Plain endpoints sitting behind the authorization middleware.
//!
//! Each returns a JSON string; reaching the handler at all means the caller
//! passed the policy check.
use axum::Json;
use chrono::{Local, SecondsFormat};

#[utoipa::path(
    get,
    path = "/",
    tag = "pages",
    params(("user" = Option<String>, Header, description = "Caller identity")),
    responses(
        (status = 200, description = "Greeting", body = String),
        (status = 401, description = "Caller not allowed", body = String)
    )
)]
/// Greeting. Also answers every path without a dedicated route.
pub async fn hello() -> Json<&'static str> {
    Json("Hello, World!")
}

#[utoipa::path(
    get,
    path = "/time",
    tag = "pages",
    params(("user" = Option<String>, Header, description = "Caller identity")),
    responses(
        (status = 200, description = "Server time in RFC 3339", body = String),
        (status = 401, description = "Caller not allowed", body = String)
    )
)]
pub async fn current_time() -> Json<String> {
    Json(time_message(&Local::now().to_rfc3339_opts(SecondsFormat::Secs, true)))
}

fn time_message(now: &str) -> String {
    format!("the current time is {now}")
}

#[utoipa::path(
    get,
    path = "/protected",
    tag = "pages",
    params(("user" = Option<String>, Header, description = "Caller identity")),
    responses(
        (status = 200, description = "Caller passed the policy check", body = String),
        (status = 401, description = "Caller not allowed", body = String)
    )
)]
pub async fn protected() -> Json<&'static str> {
    Json("Protect passed")
}
