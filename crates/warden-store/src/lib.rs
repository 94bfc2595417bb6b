//! MongoDB persistence for warden.
//!
//! # Purpose
//! Provides the MongoDB client handle, timeout-bounded collection helpers and
//! the Casbin adapter that keeps policy rows in a `casbin_rule` collection.
pub mod adapter;
pub mod client;
pub mod errors;
pub mod repo;
pub mod rule;

pub use adapter::MongoAdapter;
pub use client::{MongoConfig, MongoStore};
pub use errors::{StoreError, StoreResult};
pub use rule::CasbinRule;
