//! Warden HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules plus the shared error and payload types.
pub mod error;
pub mod openapi;
pub mod pages;
pub mod policies;
pub mod roles;
pub mod system;
pub mod types;
