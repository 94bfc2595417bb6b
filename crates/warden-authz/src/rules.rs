//! Typed policy and grouping rules.
//!
//! # Purpose
//! Defines the rule shapes shared by the enforcer helpers and the HTTP API,
//! and their conversion to Casbin's positional rule values.
use crate::errors::{AuthzError, AuthzResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `p, subject, object`: `subject` (user, role or `*`) may request `object`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PolicyRule {
    pub subject: String,
    pub object: String,
}

/// `g, user, role`: `user` inherits the permissions of `role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GroupingRule {
    pub user: String,
    pub role: String,
}

/// Every rule currently held by an enforcer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PolicySnapshot {
    pub policies: Vec<PolicyRule>,
    pub groupings: Vec<GroupingRule>,
}

impl PolicyRule {
    pub fn new(subject: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            object: object.into(),
        }
    }

    pub fn to_values(&self) -> Vec<String> {
        vec![self.subject.clone(), self.object.clone()]
    }

    pub fn from_values(values: &[String]) -> Option<Self> {
        match values {
            [subject, object, ..] => Some(Self::new(subject.as_str(), object.as_str())),
            _ => None,
        }
    }

    pub fn validate(&self) -> AuthzResult<()> {
        require("subject", &self.subject)?;
        require("object", &self.object)
    }
}

impl GroupingRule {
    pub fn new(user: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            role: role.into(),
        }
    }

    pub fn to_values(&self) -> Vec<String> {
        vec![self.user.clone(), self.role.clone()]
    }

    pub fn from_values(values: &[String]) -> Option<Self> {
        match values {
            [user, role, ..] => Some(Self::new(user.as_str(), role.as_str())),
            _ => None,
        }
    }

    pub fn validate(&self) -> AuthzResult<()> {
        require("user", &self.user)?;
        require("role", &self.role)
    }
}

fn require(field: &str, value: &str) -> AuthzResult<()> {
    if value.trim().is_empty() {
        return Err(AuthzError::InvalidRule(format!("{field} must not be empty")));
    }
    Ok(())
}
