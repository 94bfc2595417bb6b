//! Warden HTTP application wiring.
//!
//! # Purpose
//! Builds the shared state (enforcer plus optional MongoDB handle) and the
//! Axum router with the authorization and tracing layers.
use crate::api;
use crate::auth::middleware::authorize_request;
use crate::config::{AppConfig, PolicyBackend};
use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use casbin::MemoryAdapter;
use tower_http::trace::TraceLayer;
use warden_authz::{SharedEnforcer, build_enforcer, load_model, share};
use warden_store::{MongoAdapter, MongoStore};

#[derive(Clone)]
pub struct AppState {
    pub enforcer: SharedEnforcer,
    /// Present only with the MongoDB backend.
    pub store: Option<MongoStore>,
    pub backend: PolicyBackend,
}

/// Load the model, connect the configured backend and load every rule.
///
/// # Errors
/// - Unreadable or invalid model files.
/// - MongoDB connection or initial policy load failures.
pub async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let model = load_model(config.model_path.as_deref())
        .await
        .context("load casbin model")?;
    let (enforcer, store) = match config.backend {
        PolicyBackend::Memory => {
            let enforcer = build_enforcer(model, MemoryAdapter::default())
                .await
                .context("build enforcer")?;
            (enforcer, None)
        }
        PolicyBackend::MongoDb => {
            let store = MongoStore::connect(&config.mongo)
                .await
                .context("connect to mongodb")?;
            let enforcer = build_enforcer(model, MongoAdapter::new(&store))
                .await
                .context("build enforcer")?;
            (enforcer, Some(store))
        }
    };
    Ok(AppState {
        enforcer: share(enforcer),
        store,
        backend: config.backend,
    })
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            )
        });

    Router::new()
        .route("/", get(api::pages::hello))
        .route("/time", get(api::pages::current_time))
        .route("/protected", get(api::pages::protected))
        .route("/roles", get(api::roles::caller_roles))
        .route("/init", post(api::policies::init_policy))
        .route(
            "/policies",
            get(api::policies::list_policies)
                .post(api::policies::add_policy)
                .delete(api::policies::remove_policy),
        )
        .route(
            "/groupings",
            post(api::policies::add_grouping).delete(api::policies::remove_grouping),
        )
        .route("/policies/reload", post(api::policies::reload_policies))
        .route("/health", get(api::system::health))
        .route("/openapi.json", get(api::openapi::openapi_json))
        .fallback(api::pages::hello)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            authorize_request,
        ))
        .layer(trace_layer)
        .with_state(state)
}
