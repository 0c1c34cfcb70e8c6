//! # Carebook Core
//!
//! Core business logic for the Carebook appointment system.
//!
//! This crate contains pure data operations and file/folder management:
//! - User accounts, profiles and doctor approval under sharded storage
//! - The appointment lifecycle (request, approve, decline, complete, cancel)
//!   and its attachment bookkeeping
//! - Caregiver requests and links
//! - Daily measures keyed by date
//! - Session management and the role-based access guard
//!
//! **No API concerns**: HTTP servers, DTOs, or OpenAPI schemas belong in
//! `api-rest` and `api-shared`.

pub mod config;
pub mod constants;
pub mod error;
pub mod guard;
pub mod repositories;
pub mod sessions;
pub mod store;

pub use carebook_types::{EmailAddress, NonEmptyText};
pub use carebook_uuid::ShardableUuid;
pub use config::CoreConfig;
pub use constants::DEFAULT_CARE_DATA_DIR;
pub use error::{CareError, CareResult};
pub use guard::{AccessDecision, SessionUser};
pub use records::Role;
pub use repositories::appointments::AppointmentService;
pub use repositories::caregivers::CaregiverService;
pub use repositories::measures::MeasureService;
pub use repositories::users::UserService;
pub use sessions::SessionService;
