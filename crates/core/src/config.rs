//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! core services. This avoids reading process-wide environment variables
//! during request handling, which leads to inconsistent behaviour in
//! multi-threaded runtimes and test harnesses.

use crate::constants::{APPOINTMENTS_DIR_NAME, CAREGIVERS_DIR_NAME, USERS_DIR_NAME};
use crate::{CareError, CareResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    care_data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The care data directory must already exist; collection
    /// subdirectories are created lazily as records are written.
    pub fn new(care_data_dir: PathBuf) -> CareResult<Self> {
        if !care_data_dir.is_dir() {
            return Err(CareError::InvalidInput(format!(
                "care data directory does not exist: {}",
                care_data_dir.display()
            )));
        }

        Ok(Self { care_data_dir })
    }

    pub fn care_data_dir(&self) -> &Path {
        &self.care_data_dir
    }

    pub fn users_dir(&self) -> PathBuf {
        self.care_data_dir.join(USERS_DIR_NAME)
    }

    pub fn appointments_dir(&self) -> PathBuf {
        self.care_data_dir.join(APPOINTMENTS_DIR_NAME)
    }

    pub fn caregivers_dir(&self) -> PathBuf {
        self.care_data_dir.join(CAREGIVERS_DIR_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_directory() {
        let result = CoreConfig::new(PathBuf::from("/no/such/carebook/dir"));
        assert!(matches!(result, Err(CareError::InvalidInput(_))));
    }

    #[test]
    fn derives_collection_dirs() {
        let temp = tempfile::TempDir::new().unwrap();
        let cfg = CoreConfig::new(temp.path().to_path_buf()).expect("should accept");

        assert!(cfg.users_dir().ends_with("users"));
        assert!(cfg.appointments_dir().ends_with("appointments"));
        assert!(cfg.caregivers_dir().ends_with("caregivers"));
    }
}
