//! Request authorization.
//!
//! # Purpose
//! Gates every non-public request on a Casbin decision for the caller named
//! in the request headers.
pub mod middleware;
