//! # Store Monitor
//!
//! Store uptime monitoring over sparse status polls.
//!
//! The service ingests periodic "active/inactive" polls for each store,
//! reconciles them against each store's local business hours, and reports
//! estimated uptime and downtime over the last hour, day, and week. Reports
//! are available synchronously or as pollable background jobs producing CSV.
//!
//! ## Architecture
//!
//! - [`models`]: Domain rows (observations, business hours, report rows)
//! - [`db`]: Read-only source tables and their CSV loaders
//! - [`services`]: Uptime estimation, report building, report jobs
//! - [`config`]: TOML and environment configuration
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Estimation in brief
//!
//! Polls inside business hours are paired in time order; the gap between a
//! pair counts as downtime when the later poll saw the store inactive, and
//! as uptime otherwise. Polls outside business hours are ignored.

pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
