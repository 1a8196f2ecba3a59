/// Feed Service Library
///
/// HTTP surface for the home feed, geographic discovery and geotagged post creation.
/// Ranking itself lives in the `feed-ranking` crate; this crate wires it to PostgreSQL
/// and actix-web.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route registration
/// - `models`: request/response bodies
/// - `db`: PostgreSQL store and post writer
/// - `middleware`: viewer identity extraction
/// - `error`: error types and HTTP mapping
/// - `config`: configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod openapi;

pub use config::Config;
pub use error::{AppError, Result};
