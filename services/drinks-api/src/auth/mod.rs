//! Request authorization for the drinks API.
//!
//! # Purpose
//! Adapts the framework-free [`drinks_authz::Authorizer`] to axum middleware
//! so each gated route declares exactly one required permission.
pub mod gate;

pub use gate::{PermissionGate, require_permission};
