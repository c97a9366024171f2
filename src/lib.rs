//! pitchside library
//!
//! Read-through cache in front of API-Football: cache-key scheme, TTL policy,
//! cache-aside service and the normalizers that flatten upstream payloads.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod logging;
pub mod request;
pub mod service;

pub use request::{ResourceKind, ResourceParams, ResourceRequest};
pub use service::{ApiResponse, Cached, Origin, ServiceError, StatsService};
