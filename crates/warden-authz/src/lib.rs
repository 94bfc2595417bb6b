//! Authorization building blocks for warden.
//!
//! # Purpose
//! Owns the Casbin policy model, the shared caching enforcer and the typed
//! policy/grouping rules exchanged with the HTTP layer.
pub mod casbin_model;
pub mod enforcer;
pub mod errors;
pub mod rules;
pub mod seed;

pub use casbin_model::{MODEL_CONF, load_model};
pub use enforcer::{SharedEnforcer, build_enforcer, share};
pub use errors::{AuthzError, AuthzResult};
pub use rules::{GroupingRule, PolicyRule, PolicySnapshot};
