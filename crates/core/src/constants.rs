//! Storage layout constants.

/// Default root for all collections when `CARE_DATA_DIR` is not set.
pub const DEFAULT_CARE_DATA_DIR: &str = "/care_data";

/// Collection directory names under the care data root.
pub const USERS_DIR_NAME: &str = "users";
pub const APPOINTMENTS_DIR_NAME: &str = "appointments";
pub const CAREGIVERS_DIR_NAME: &str = "caregivers";

/// Record file names within a record directory.
pub const USER_FILE_NAME: &str = "user.yaml";
pub const APPOINTMENT_FILE_NAME: &str = "appointment.yaml";

/// Per-user subdirectory holding daily measure documents.
pub const MEASURES_DIR_NAME: &str = "daily_measures";

/// Per-caregiver subdirectories.
pub const REQUESTS_DIR_NAME: &str = "requests";
pub const LINKED_PATIENTS_DIR_NAME: &str = "patients";
