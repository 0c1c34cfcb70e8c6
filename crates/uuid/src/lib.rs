//! Identifier and sharded-path utilities.
//!
//! Carebook stores every document collection under sharded directories derived
//! from a UUID, using a *canonical* representation for storage identifiers:
//! **32 lowercase hexadecimal characters** (no hyphens).
//!
//! This crate provides:
//! - [`ShardableUuid`], a wrapper that guarantees the canonical format once
//!   constructed and derives sharded directory paths.
//! - [`TimestampId`], a millisecond-precision timestamp identifier used to
//!   prefix stored attachment file names (`<timestamp>-<filename>`), with a
//!   monotonicity guarantee so two uploads of the same file never collide.
//!
//! ## Canonical UUID form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! This is the value `Uuid::new_v4().simple().to_string()` produces.
//! Externally supplied identifiers (API or CLI input) must already be in
//! canonical form; use [`ShardableUuid::parse`] to validate them.
//!
//! ## Sharded directory layout
//! For a canonical UUID `u`, records live under
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`, for example
//! `care_data/appointments/55/0e/550e8400e29b41d4a716446655440000/`.
//! Sharding keeps per-directory fan-out small as collections grow.

mod service;

pub use service::{ShardableUuid, TimestampId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
