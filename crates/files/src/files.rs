//! Appointment-scoped attachment storage implementation.
//!
//! [`AttachmentStore`] manages the binary files attached to a single
//! appointment. The appointment record (managed elsewhere) holds metadata
//! entries pointing into this store; the store itself never touches records.
//!
//! # Storage layout
//!
//! ```text
//! <appointments_root>/           # sharded appointments collection
//! └── <s1>/<s2>/<appointment_id>/
//!     ├── appointment.yaml       # owned by the record layer
//!     └── files/                 # owned by this store
//!         └── <timestamp>-<sanitised filename>
//! ```
//!
//! # Naming
//!
//! Stored names are `<timestamp>-<filename>` where the timestamp is
//! millisecond-precision UTC ([`carebook_uuid::TimestampId`]). Timestamps are
//! monotonic within one appointment: a new upload always sorts after every
//! existing file, and re-uploading the same file name yields a distinct
//! object. No deduplication is performed.
//!
//! # Security model
//!
//! - The appointments root is canonicalised at construction
//! - Uploaded file names are sanitised to a single path component
//! - Removal validates that the target resolves inside this appointment's
//!   `files/` directory

use crate::{FilesError, FILES_FOLDER_NAME};
use carebook_uuid::{ShardableUuid, TimestampId};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Metadata for a stored attachment
///
/// Everything the record layer and the API need to reference a stored file:
/// the original and stored names, a serving URL, the storage path relative to
/// the appointments root, and integrity/detection data.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct AttachmentMetadata {
    /// Original file name as uploaded
    pub file_name: String,

    /// Name of the stored object (`<timestamp>-<sanitised filename>`)
    pub stored_name: String,

    /// URL the content is served from
    pub file_url: String,

    /// Path relative to the appointments root
    pub storage_path: String,

    /// UTC timestamp when the file was stored
    pub uploaded_at: DateTime<Utc>,

    /// Size of the file in bytes
    pub size_bytes: u64,

    /// Detected media type (MIME type), if available
    ///
    /// Best-effort detection from content; not authoritative.
    pub media_type: Option<String>,

    /// Hexadecimal SHA-256 digest of the content
    pub sha256: String,
}

/// Storage for the files attached to one appointment
///
/// # Design
///
/// - Appointment-scoped: each instance is bound to one appointment
/// - Timestamp-named: stored objects never collide, even for equal inputs
/// - Defensive: all paths are validated to prevent directory traversal
#[derive(Debug)]
pub struct AttachmentStore {
    /// Canonicalised root of the appointments collection
    appointments_root: PathBuf,

    /// Appointment identifier
    appointment_id: ShardableUuid,
}

impl AttachmentStore {
    /// Creates a new `AttachmentStore` for a specific appointment
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - The appointments root does not exist or is not a directory
    /// - The appointment directory does not exist
    /// - Path canonicalisation fails
    pub fn new(
        appointments_root: &Path,
        appointment_id: ShardableUuid,
    ) -> Result<Self, FilesError> {
        if !appointments_root.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Not an existing directory: {}",
                appointments_root.display()
            )));
        }

        let appointments_root = appointments_root.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                appointments_root.display(),
                e
            ))
        })?;

        let appointment_dir = appointment_id.sharded_dir(&appointments_root);
        if !appointment_dir.is_dir() {
            return Err(FilesError::AppointmentNotFound(format!(
                "Appointment directory does not exist: {}",
                appointment_dir.display()
            )));
        }

        Ok(Self {
            appointments_root,
            appointment_id,
        })
    }

    /// Stores uploaded bytes as a new attachment object
    ///
    /// The stored name is `<timestamp>-<sanitised filename>`; the timestamp
    /// is strictly greater than any already present in this appointment's
    /// files directory, so repeated uploads of the same file name never
    /// collide and sort in upload order.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - The file name sanitises to nothing usable
    /// - The files directory cannot be created (I/O)
    /// - The write fails (I/O)
    pub fn store(&self, file_name: &str, bytes: &[u8]) -> Result<AttachmentMetadata, FilesError> {
        let safe_name = sanitise_file_name(file_name)?;

        let files_dir = self.files_dir();
        fs::create_dir_all(&files_dir).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create files directory {}: {}", files_dir.display(), e),
            ))
        })?;

        let timestamp = TimestampId::generate(self.latest_timestamp(&files_dir).as_ref());
        let stored_name = format!("{timestamp}-{safe_name}");
        let target = files_dir.join(&stored_name);

        fs::write(&target, bytes).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write file to {}: {}", target.display(), e),
            ))
        })?;

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let sha256 = hex::encode(hasher.finalize());

        // Best-effort media type detection from content
        let media_type = infer::get(bytes).map(|kind| kind.mime_type().to_string());

        Ok(AttachmentMetadata {
            file_name: file_name.to_string(),
            file_url: format!(
                "/appointments/{}/attachments/{}",
                self.appointment_id, stored_name
            ),
            storage_path: self.relative_path(&stored_name),
            stored_name,
            uploaded_at: timestamp.timestamp(),
            size_bytes: bytes.len() as u64,
            media_type,
            sha256,
        })
    }

    /// Reads a stored attachment by its stored name
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if the name is not a plain file name, the file
    /// does not exist, or the read fails.
    pub fn read(&self, stored_name: &str) -> Result<Vec<u8>, FilesError> {
        if stored_name.is_empty() || stored_name.contains(['/', '\\']) || stored_name == ".." {
            return Err(FilesError::InvalidPath(format!(
                "Stored name must be a plain file name: '{stored_name}'"
            )));
        }

        let target = self.files_dir().join(stored_name);
        if !target.is_file() {
            return Err(FilesError::NotFound(stored_name.to_string()));
        }

        fs::read(&target).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read file from {}: {}", target.display(), e),
            ))
        })
    }

    /// Removes a stored attachment by its storage path
    ///
    /// `storage_path` is the record's stored value, relative to the
    /// appointments root. The resolved path must land inside this
    /// appointment's `files/` directory.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if the path escapes the files directory, the
    /// file does not exist, or deletion fails.
    pub fn remove(&self, storage_path: &str) -> Result<(), FilesError> {
        let candidate = self.appointments_root.join(storage_path);

        // Reject traversal before touching the filesystem
        let files_dir = self.files_dir();
        let normal: PathBuf = candidate.components().collect();
        if !normal.starts_with(&files_dir) || candidate.components().any(|c| {
            matches!(c, std::path::Component::ParentDir)
        }) {
            return Err(FilesError::InvalidPath(format!(
                "Storage path escapes the appointment files directory: '{storage_path}'"
            )));
        }

        if !normal.is_file() {
            return Err(FilesError::NotFound(storage_path.to_string()));
        }

        fs::remove_file(&normal).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to remove file {}: {}", normal.display(), e),
            ))
        })
    }

    /// Lists stored object names in this appointment's files directory,
    /// sorted ascending (upload order, given the timestamp prefix).
    pub fn list(&self) -> Result<Vec<String>, FilesError> {
        let files_dir = self.files_dir();
        if !files_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&files_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Path to this appointment's files directory (may not exist yet).
    fn files_dir(&self) -> PathBuf {
        self.appointment_id
            .sharded_dir(&self.appointments_root)
            .join(FILES_FOLDER_NAME)
    }

    /// Storage path of a stored object, relative to the appointments root.
    fn relative_path(&self, stored_name: &str) -> String {
        let canonical = self.appointment_id.to_string();
        format!(
            "{}/{}/{}/{}/{}",
            &canonical[0..2],
            &canonical[2..4],
            canonical,
            FILES_FOLDER_NAME,
            stored_name
        )
    }

    /// Greatest timestamp prefix already present, if any.
    ///
    /// Unparseable names are skipped; they cannot collide with generated
    /// names anyway.
    fn latest_timestamp(&self, files_dir: &Path) -> Option<TimestampId> {
        let entries = fs::read_dir(files_dir).ok()?;

        entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name();
                let name = name.to_str()?;
                let prefix = name.split('-').next()?;
                TimestampId::from_str(prefix).ok()
            })
            .max()
    }
}

/// Reduces an uploaded file name to a single safe path component.
///
/// Anything after the last path separator is kept; characters outside
/// `[A-Za-z0-9._-]` become `_`. Names that sanitise to nothing, or to only
/// dots, are rejected.
fn sanitise_file_name(file_name: &str) -> Result<String, FilesError> {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();

    let safe: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if safe.is_empty() || safe.chars().all(|c| c == '.') {
        return Err(FilesError::InvalidFileName(file_name.to_string()));
    }

    Ok(safe)
}
