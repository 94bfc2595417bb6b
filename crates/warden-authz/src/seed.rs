//! Starter policy installed by the `/init` endpoint.
use crate::enforcer::SharedEnforcer;
use crate::errors::{AuthzResult, at};
use crate::rules::{GroupingRule, PolicyRule};
use casbin::{CoreApi, MgmtApi};

pub fn seed_policies() -> Vec<PolicyRule> {
    vec![
        PolicyRule::new("role:user", "/"),
        PolicyRule::new("role:user", "/time"),
        PolicyRule::new("role:admin", "/*"),
        PolicyRule::new("*", "/"),
    ]
}

pub fn seed_groupings() -> Vec<GroupingRule> {
    vec![
        GroupingRule::new("xdorro", "role:admin"),
        GroupingRule::new("ahihi", "role:user"),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub added: usize,
    pub existing: usize,
}

/// Add every seed rule that is not present yet, then save the whole policy
/// back to the adapter.
pub async fn install_seed(enforcer: &SharedEnforcer) -> AuthzResult<SeedReport> {
    let mut guard = enforcer.write().await;
    let mut report = SeedReport {
        added: 0,
        existing: 0,
    };
    for rule in seed_policies() {
        if guard
            .add_policy(rule.to_values())
            .await
            .map_err(at("add seed policy"))?
        {
            report.added += 1;
        } else {
            report.existing += 1;
        }
    }
    for rule in seed_groupings() {
        if guard
            .add_grouping_policy(rule.to_values())
            .await
            .map_err(at("add seed grouping"))?
        {
            report.added += 1;
        } else {
            report.existing += 1;
        }
    }
    guard.save_policy().await.map_err(at("save policy"))?;
    tracing::info!(added = report.added, existing = report.existing, "seed policy installed");
    Ok(report)
}
