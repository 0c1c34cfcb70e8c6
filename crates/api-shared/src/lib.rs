//! # API Shared
//!
//! Shared utilities and definitions for the Carebook API.
//!
//! Contains:
//! - Request/response DTOs with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//! - Session-token header utilities
//!
//! Used by `api-rest` and the run binary for common functionality.

pub mod auth;
pub mod dto;
pub mod health;

pub use health::HealthService;
