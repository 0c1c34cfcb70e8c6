//! Carebook attachment storage.
//!
//! This crate stores and manages the files attached to appointments.
//!
//! ## Design principles
//!
//! - Appointment records and file bytes are deliberately separated: the
//!   record holds metadata entries, this crate holds the content
//! - Stored file names are prefixed with a millisecond timestamp, so
//!   uploading the same file name twice produces two distinct objects
//! - References to files are explicit and auditable
//! - Records remain valid even when stored files are absent
//! - No global or cross-appointment file namespace exists
//!
//! ## Storage model
//!
//! Each appointment stores its own files alongside its record:
//!
//! ```text
//! appointments/
//! └── <s1>/<s2>/<appointment_id>/
//!     ├── appointment.yaml
//!     └── files/
//!         └── 20260302T101500.000Z-scan.pdf
//! ```
//!
//! ## Example usage
//!
//! ```no_run
//! use carebook_files::AttachmentStore;
//! use carebook_uuid::ShardableUuid;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root = Path::new("care_data/appointments");
//! let appointment_id = ShardableUuid::parse("550e8400e29b41d4a716446655440000")?;
//!
//! let store = AttachmentStore::new(root, appointment_id)?;
//! let metadata = store.store("scan.pdf", b"%PDF-1.7 ...")?;
//! # Ok(())
//! # }
//! ```

mod constants;
mod files;

pub use constants::FILES_FOLDER_NAME;
pub use files::{AttachmentMetadata, AttachmentStore};
pub use carebook_uuid::ShardableUuid;

/// Errors that can occur during attachment operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Root directory does not exist or is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// Appointment directory does not exist
    #[error("Appointment not found: {0}")]
    AppointmentNotFound(String),

    /// Path validation failed (potential directory traversal or unsafe path)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Unusable uploaded file name (empty after sanitisation)
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// Requested stored file does not exist
    #[error("Stored file not found: {0}")]
    NotFound(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UUID error from carebook-uuid crate
    #[error("UUID error: {0}")]
    Uuid(#[from] carebook_uuid::UuidError),
}
