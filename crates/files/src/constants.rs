//! Constants shared across the attachment storage crate.

/// Name of the per-appointment directory holding stored files.
pub const FILES_FOLDER_NAME: &str = "files";
