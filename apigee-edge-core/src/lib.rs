//! Apigee Edge Core - Edge entities as locally routed resources
//!
//! This crate binds Apigee Edge API products and developer apps to local
//! entity types, generates the web routes of those entity types and serves
//! them over HTTP.

pub mod api;
pub mod config;
pub mod directory;
pub mod edge;
pub mod entity;
pub mod error;
pub mod policy;
pub mod routing;
pub mod server;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
