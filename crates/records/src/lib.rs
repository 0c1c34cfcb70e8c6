//! Wire/boundary support for Carebook's stored documents.
//!
//! This crate provides **wire models** and **format/translation helpers** for
//! the on-disk YAML documents the document store holds:
//! - user accounts with role-specific profile sections
//! - appointments with their status lifecycle and attachment list
//! - caregiver requests and links
//! - daily measure entries
//!
//! The crate focuses on:
//! - strict serialisation/deserialisation (`deny_unknown_fields` everywhere)
//! - translation between domain primitives and wire structs
//! - the status enums and their legal transitions
//!
//! Transport concerns (HTTP, DTOs, OpenAPI schemas) live in `api-shared`;
//! storage concerns (paths, sharding, I/O) live in `carebook-core`.

pub mod appointment;
pub mod caregiver;
pub mod measures;
pub mod role;
pub mod user;

// Re-export facades
pub use appointment::Appointment;
pub use caregiver::CaregiverRequest;
pub use measures::DailyMeasure;
pub use user::User;

// Re-export public domain-level types
pub use appointment::{AppointmentData, AppointmentStatus, AttachmentEntry};
pub use caregiver::{CaregiverLinkData, CaregiverRequestData, LinkStatus};
pub use measures::{DailyMeasureData, Vitals};
pub use role::Role;
pub use user::{
    CaregiverProfile, DoctorProfile, PatientProfile, ProfileSection, UserData,
};

/// Errors returned by the `records` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// Type alias for Results that can fail with a [`RecordsError`].
pub type RecordsResult<T> = Result<T, RecordsError>;

/// Deserialise a wire struct from YAML, reporting the path to the failing
/// field on schema mismatch.
pub(crate) fn parse_wire<T>(yaml_text: &str, what: &str) -> RecordsResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

    match serde_path_to_error::deserialize::<_, T>(deserializer) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() {
                "<root>"
            } else {
                path.as_str()
            };
            Err(RecordsError::Translation(format!(
                "{what} schema mismatch at {path}: {source}"
            )))
        }
    }
}

/// Parse a canonical UUID field, naming the field on failure.
pub(crate) fn parse_uuid_field(
    value: &str,
    field: &str,
) -> RecordsResult<carebook_uuid::ShardableUuid> {
    carebook_uuid::ShardableUuid::parse(value)
        .map_err(|_| RecordsError::InvalidUuid(format!("Invalid UUID in {field}: {value}")))
}
