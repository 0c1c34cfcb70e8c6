//! Repository services over the sharded document store.
//!
//! One service per collection. Each service is cheap to construct and clone:
//! it holds only the shared [`crate::CoreConfig`]. All I/O happens per
//! operation; nothing is cached between calls.

pub mod appointments;
pub mod caregivers;
pub mod measures;
pub mod users;
