//! Apigee Edge management API client
//!
//! This module holds the transport to the management API, the generic
//! organization-scoped entity controller, and the serialization adapters
//! shared by every entity kind.

pub mod client;
pub mod controller;
pub mod normalizer;

pub use client::{EdgeClient, EdgeRequest, EdgeTransport};
pub use controller::EntityController;
pub use normalizer::{default_normalizers, AttributesNormalizer, EntityNormalizer};
