mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use casbin::error::AdapterError;
use casbin::{Adapter, DefaultModel, Filter, MemoryAdapter, Model};
use common::{read_json, request};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tower::ServiceExt;
use warden::app::{AppState, build_router};
use warden::config::PolicyBackend;
use warden_authz::enforcer::add_policy;
use warden_authz::{PolicyRule, build_enforcer, load_model, share};

/// Adapter that keeps nothing and can be told to fail loads and saves.
#[derive(Clone, Default)]
struct FailingAdapter {
    fail_load: Arc<AtomicBool>,
    fail_save: Arc<AtomicBool>,
}

fn storage_down() -> casbin::Error {
    AdapterError(Box::new(io::Error::other("policy store down"))).into()
}

#[async_trait]
impl Adapter for FailingAdapter {
    async fn load_policy(&mut self, _m: &mut dyn Model) -> casbin::Result<()> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(storage_down());
        }
        Ok(())
    }

    async fn load_filtered_policy<'a>(
        &mut self,
        m: &mut dyn Model,
        _f: Filter<'a>,
    ) -> casbin::Result<()> {
        self.load_policy(m).await
    }

    async fn save_policy(&mut self, _m: &mut dyn Model) -> casbin::Result<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(storage_down());
        }
        Ok(())
    }

    async fn clear_policy(&mut self) -> casbin::Result<()> {
        Ok(())
    }

    fn is_filtered(&self) -> bool {
        false
    }

    async fn add_policy(
        &mut self,
        _sec: &str,
        _ptype: &str,
        _rule: Vec<String>,
    ) -> casbin::Result<bool> {
        Ok(true)
    }

    async fn add_policies(
        &mut self,
        _sec: &str,
        _ptype: &str,
        _rules: Vec<Vec<String>>,
    ) -> casbin::Result<bool> {
        Ok(true)
    }

    async fn remove_policy(
        &mut self,
        _sec: &str,
        _ptype: &str,
        _rule: Vec<String>,
    ) -> casbin::Result<bool> {
        Ok(true)
    }

    async fn remove_policies(
        &mut self,
        _sec: &str,
        _ptype: &str,
        _rules: Vec<Vec<String>>,
    ) -> casbin::Result<bool> {
        Ok(true)
    }

    async fn remove_filtered_policy(
        &mut self,
        _sec: &str,
        _ptype: &str,
        _field_index: usize,
        _field_values: Vec<String>,
    ) -> casbin::Result<bool> {
        Ok(true)
    }
}

async fn app_over(adapter: FailingAdapter) -> (common::App, AppState) {
    let model = load_model(None).await.expect("model");
    let enforcer = build_enforcer(model, adapter).await.expect("enforcer");
    let state = AppState {
        enforcer: share(enforcer),
        store: None,
        backend: PolicyBackend::Memory,
    };
    (build_router(state.clone()).into_service(), state)
}

#[tokio::test]
async fn init_reports_save_failure() {
    let adapter = FailingAdapter::default();
    adapter.fail_save.store(true, Ordering::SeqCst);
    let (app, _) = app_over(adapter).await;

    let response = app
        .oneshot(request("POST", "/init", None))
        .await
        .expect("init");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["code"], "internal");
    assert_eq!(body["message"], "failed to install seed policy");
}

#[tokio::test]
async fn reload_reports_load_failure() {
    let adapter = FailingAdapter::default();
    let (app, state) = app_over(adapter.clone()).await;
    add_policy(&state.enforcer, &PolicyRule::new("*", "/*"))
        .await
        .expect("open policy");
    adapter.fail_load.store(true, Ordering::SeqCst);

    let response = app
        .oneshot(request("POST", "/policies/reload", Some("operator")))
        .await
        .expect("reload");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["code"], "internal");
    assert_eq!(body["message"], "failed to reload policy");
}

/// Matcher calling a function the engine does not define, so every
/// evaluation fails.
const BROKEN_MATCHER_MODEL: &str = r#"
[request_definition]
r = sub, obj

[policy_definition]
p = sub, obj

[policy_effect]
e = some(where (p.eft == allow))

[matchers]
m = undefinedMatcher(r.obj, p.obj) && r.sub == p.sub
"#;

#[tokio::test]
async fn enforce_failure_is_an_internal_error() {
    let model = DefaultModel::from_str(BROKEN_MATCHER_MODEL)
        .await
        .expect("model");
    let enforcer = share(
        build_enforcer(model, MemoryAdapter::default())
            .await
            .expect("enforcer"),
    );
    add_policy(&enforcer, &PolicyRule::new("xdorro", "/protected"))
        .await
        .expect("policy");
    let app = build_router(AppState {
        enforcer,
        store: None,
        backend: PolicyBackend::Memory,
    })
    .into_service();

    let response = app
        .oneshot(request("GET", "/protected", Some("xdorro")))
        .await
        .expect("protected");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["code"], "internal");
    assert_eq!(body["message"], "authorization failed");
}
