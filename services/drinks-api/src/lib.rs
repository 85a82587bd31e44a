//! Drinks API service library crate.
//!
//! # Purpose
//! Exposes the router, handlers, permission middleware, configuration,
//! storage and observability setup for use by the binary and tests.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod model;
pub mod observability;
pub mod store;
