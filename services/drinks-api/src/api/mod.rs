//! Drinks HTTP API module.
//!
//! # Purpose
//! Exposes the route handler modules, the shared payload types and the
//! error envelope.
pub mod drinks;
pub mod error;
pub mod openapi;
pub mod system;
pub mod types;
