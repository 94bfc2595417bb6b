//! Casbin caching enforcer construction and the operations the HTTP layer
//! performs on it.
//!
//! # Purpose and responsibility
//! Builds the process-wide [`CachedEnforcer`] from a model and a storage
//! adapter, and wraps the handful of Casbin calls the service needs so lock
//! handling and error tagging live in one place.
//!
//! # Key invariants and assumptions
//! - One enforcer per process, shared as [`SharedEnforcer`].
//! - Enforcement takes the write lock: the decision cache is updated on every
//!   call.
//! - With auto-save on, rule mutations are written through to the adapter
//!   before the in-memory model changes.
use crate::errors::{AuthzResult, at};
use crate::rules::{GroupingRule, PolicyRule, PolicySnapshot};
use casbin::{Adapter, CachedEnforcer, CoreApi, DefaultModel, MgmtApi, RbacApi};
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SharedEnforcer = Arc<RwLock<CachedEnforcer>>;

/// Build a caching enforcer and load every rule the adapter holds.
///
/// # Errors
/// - Returns Casbin errors for invalid models or failed policy loads.
pub async fn build_enforcer<A>(model: DefaultModel, adapter: A) -> AuthzResult<CachedEnforcer>
where
    A: Adapter + 'static,
{
    let mut enforcer = CachedEnforcer::new(model, adapter)
        .await
        .map_err(at("load policy"))?;
    enforcer.build_role_links().map_err(at("build role links"))?;
    tracing::info!(
        policies = enforcer.get_policy().len(),
        groupings = enforcer.get_grouping_policy().len(),
        "policy loaded"
    );
    Ok(enforcer)
}

/// Wrap an enforcer for sharing across request handlers.
pub fn share(enforcer: CachedEnforcer) -> SharedEnforcer {
    Arc::new(RwLock::new(enforcer))
}

/// Decide whether `subject` may request `object`.
pub async fn authorize(enforcer: &SharedEnforcer, subject: &str, object: &str) -> AuthzResult<bool> {
    let mut guard = enforcer.write().await;
    guard.enforce_mut((subject, object)).map_err(at("enforce"))
}

/// Roles directly assigned to `user`.
pub async fn roles_for_user(enforcer: &SharedEnforcer, user: &str) -> Vec<String> {
    let mut guard = enforcer.write().await;
    guard.get_roles_for_user(user, None)
}

/// Every subject named by a permission rule.
pub async fn subjects(enforcer: &SharedEnforcer) -> Vec<String> {
    enforcer.read().await.get_all_subjects()
}

pub async fn snapshot(enforcer: &SharedEnforcer) -> PolicySnapshot {
    let guard = enforcer.read().await;
    PolicySnapshot {
        policies: guard
            .get_policy()
            .iter()
            .filter_map(|values| PolicyRule::from_values(values))
            .collect(),
        groupings: guard
            .get_grouping_policy()
            .iter()
            .filter_map(|values| GroupingRule::from_values(values))
            .collect(),
    }
}

/// Add a permission rule. Returns `false` when it already exists.
pub async fn add_policy(enforcer: &SharedEnforcer, rule: &PolicyRule) -> AuthzResult<bool> {
    rule.validate()?;
    let mut guard = enforcer.write().await;
    guard
        .add_policy(rule.to_values())
        .await
        .map_err(at("add policy"))
}

/// Remove a permission rule. Returns `false` when it did not exist.
pub async fn remove_policy(enforcer: &SharedEnforcer, rule: &PolicyRule) -> AuthzResult<bool> {
    rule.validate()?;
    let mut guard = enforcer.write().await;
    guard
        .remove_policy(rule.to_values())
        .await
        .map_err(at("remove policy"))
}

pub async fn add_grouping(enforcer: &SharedEnforcer, rule: &GroupingRule) -> AuthzResult<bool> {
    rule.validate()?;
    let mut guard = enforcer.write().await;
    guard
        .add_grouping_policy(rule.to_values())
        .await
        .map_err(at("add grouping"))
}

pub async fn remove_grouping(enforcer: &SharedEnforcer, rule: &GroupingRule) -> AuthzResult<bool> {
    rule.validate()?;
    let mut guard = enforcer.write().await;
    guard
        .remove_grouping_policy(rule.to_values())
        .await
        .map_err(at("remove grouping"))
}

/// Drop the in-memory rules and load them again from the adapter.
pub async fn reload(enforcer: &SharedEnforcer) -> AuthzResult<()> {
    let mut guard = enforcer.write().await;
    guard.load_policy().await.map_err(at("load policy"))
}
