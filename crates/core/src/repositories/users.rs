//! User account management.
//!
//! Handles registration, authentication, profile completion, listing,
//! doctor approval and account removal. Accounts are stored one per sharded
//! directory under `users/`:
//!
//! ```text
//! users/
//!   <s1>/<s2>/<uuid>/
//!     user.yaml           # account record
//!     daily_measures/     # patient accounts only, managed by MeasureService
//! ```
//!
//! Email uniqueness is enforced by scanning the collection at registration
//! time; the store is the single source of truth and there is no separate
//! index to drift out of date.

use crate::config::CoreConfig;
use crate::constants::USER_FILE_NAME;
use crate::error::{CareError, CareResult};
use crate::guard::SessionUser;
use crate::sessions::{hash_password, verify_password};
use crate::store::{create_unique_record_dir, read_record, walk_record_dirs, write_record};
use carebook_types::{EmailAddress, NonEmptyText};
use carebook_uuid::ShardableUuid;
use chrono::Utc;
use records::{ProfileSection, Role, User, UserData};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Service for managing user accounts.
#[derive(Clone, Debug)]
pub struct UserService {
    cfg: Arc<CoreConfig>,
}

impl UserService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Registers a new patient, doctor or caregiver account.
    ///
    /// Doctors start unapproved; every role starts with an incomplete
    /// profile. Admin accounts cannot be self-registered — see
    /// [`UserService::create_admin`].
    ///
    /// # Errors
    ///
    /// Returns `CareError` if:
    /// - the role is `Admin`,
    /// - an account already exists for the email,
    /// - the password is empty or hashing fails,
    /// - the record cannot be written.
    pub fn register(
        &self,
        email: EmailAddress,
        password: &str,
        display_name: NonEmptyText,
        role: Role,
    ) -> CareResult<UserData> {
        if role == Role::Admin {
            return Err(CareError::InvalidInput(
                "admin accounts are created from the command line, not registration".into(),
            ));
        }

        self.create_account(email, password, display_name, role)
    }

    /// Creates an admin account (CLI entry point).
    ///
    /// Admins have no onboarding flow, so the profile is considered
    /// complete from creation.
    pub fn create_admin(
        &self,
        email: EmailAddress,
        password: &str,
        display_name: NonEmptyText,
    ) -> CareResult<UserData> {
        self.create_account(email, password, display_name, Role::Admin)
    }

    fn create_account(
        &self,
        email: EmailAddress,
        password: &str,
        display_name: NonEmptyText,
        role: Role,
    ) -> CareResult<UserData> {
        if self.find_by_email(&email)?.is_some() {
            return Err(CareError::EmailAlreadyRegistered(email.to_string()));
        }

        let password_hash = hash_password(password)?;
        let (id, record_dir) = create_unique_record_dir(&self.cfg.users_dir())?;
        let now = Utc::now();

        let data = UserData {
            id,
            email,
            password_hash,
            display_name: display_name.into_string(),
            role,
            profile_completed: role == Role::Admin,
            approved: (role == Role::Doctor).then_some(false),
            profile: None,
            created_at: now,
            updated_at: now,
        };

        write_record(&record_dir.join(USER_FILE_NAME), &User::render(&data)?)?;

        tracing::info!(user = %data.id, role = %role, "registered account");
        Ok(data)
    }

    /// Verifies credentials and returns the account.
    ///
    /// # Errors
    ///
    /// Returns `CareError::InvalidCredentials` when no account exists for
    /// the email or the password does not verify. The two cases are not
    /// distinguished.
    pub fn authenticate(&self, email: &EmailAddress, password: &str) -> CareResult<UserData> {
        let user = self
            .find_by_email(email)?
            .ok_or(CareError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(CareError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Loads an account by identifier.
    pub fn get(&self, id: &ShardableUuid) -> CareResult<UserData> {
        let path = self.record_path(id);
        if !path.is_file() {
            return Err(CareError::UserNotFound(id.to_string()));
        }

        Ok(User::parse(&read_record(&path)?)?)
    }

    /// Finds an account by normalised email, scanning the collection.
    pub fn find_by_email(&self, email: &EmailAddress) -> CareResult<Option<UserData>> {
        for (_, dir) in walk_record_dirs(&self.cfg.users_dir()) {
            let path = dir.join(USER_FILE_NAME);
            if !path.is_file() {
                continue;
            }

            match User::parse(&read_record(&path)?) {
                Ok(user) if &user.email == email => return Ok(Some(user)),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("failed to parse user record {}: {e}", path.display());
                }
            }
        }

        Ok(None)
    }

    /// Lists accounts, optionally filtered by role, ordered by creation
    /// time.
    pub fn list(&self, role: Option<Role>) -> CareResult<Vec<UserData>> {
        let mut users = Vec::new();

        for (_, dir) in walk_record_dirs(&self.cfg.users_dir()) {
            let path = dir.join(USER_FILE_NAME);
            if !path.is_file() {
                continue;
            }

            match User::parse(&read_record(&path)?) {
                Ok(user) => {
                    if role.is_none() || role == Some(user.role) {
                        users.push(user);
                    }
                }
                Err(e) => {
                    tracing::warn!("failed to parse user record {}: {e}", path.display());
                }
            }
        }

        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    /// Writes the role-specific profile section and marks the profile
    /// complete.
    ///
    /// # Errors
    ///
    /// Returns `CareError::InvalidInput` when the section does not match
    /// the account's role.
    pub fn complete_profile(
        &self,
        id: &ShardableUuid,
        profile: ProfileSection,
    ) -> CareResult<UserData> {
        let mut user = self.get(id)?;

        if profile.role() != user.role {
            return Err(CareError::InvalidInput(format!(
                "a {} profile cannot be attached to a {} account",
                profile.role(),
                user.role
            )));
        }

        user.profile = Some(profile);
        user.profile_completed = true;
        user.updated_at = Utc::now();

        self.write(&user)?;
        Ok(user)
    }

    /// Marks a doctor as approved.
    ///
    /// # Errors
    ///
    /// Returns `CareError::InvalidInput` when the account is not a doctor.
    pub fn approve_doctor(&self, id: &ShardableUuid) -> CareResult<UserData> {
        let mut user = self.get(id)?;

        if user.role != Role::Doctor {
            return Err(CareError::InvalidInput(format!(
                "cannot approve a {} account as a doctor",
                user.role
            )));
        }

        user.approved = Some(true);
        user.updated_at = Utc::now();

        self.write(&user)?;
        tracing::info!(doctor = %user.id, "doctor approved");
        Ok(user)
    }

    /// Removes an account and everything stored under its record directory
    /// (including a patient's daily measures).
    pub fn remove(&self, id: &ShardableUuid) -> CareResult<()> {
        let dir = id.sharded_dir(&self.cfg.users_dir());
        if !dir.is_dir() {
            return Err(CareError::UserNotFound(id.to_string()));
        }

        fs::remove_dir_all(&dir).map_err(CareError::RecordRemoval)?;
        tracing::info!(user = %id, "account removed");
        Ok(())
    }

    /// Projects an account onto the identity facts the access guard needs.
    pub fn session_user(user: &UserData) -> SessionUser {
        SessionUser {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            profile_completed: user.profile_completed,
            approved: user.approved,
        }
    }

    fn record_path(&self, id: &ShardableUuid) -> PathBuf {
        id.sharded_dir(&self.cfg.users_dir()).join(USER_FILE_NAME)
    }

    fn write(&self, user: &UserData) -> CareResult<()> {
        write_record(&self.record_path(&user.id), &User::render(user)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use records::PatientProfile;
    use tempfile::TempDir;

    fn service() -> (TempDir, UserService) {
        let temp = TempDir::new().unwrap();
        let cfg = Arc::new(CoreConfig::new(temp.path().to_path_buf()).unwrap());
        (temp, UserService::new(cfg))
    }

    fn email(s: &str) -> EmailAddress {
        EmailAddress::new(s).unwrap()
    }

    fn name(s: &str) -> NonEmptyText {
        NonEmptyText::new(s).unwrap()
    }

    #[test]
    fn register_and_load_patient() {
        let (_temp, users) = service();

        let created = users
            .register(email("maria@example.com"), "s3cret-pw", name("Maria Keane"), Role::Patient)
            .expect("register");

        assert_eq!(created.role, Role::Patient);
        assert!(!created.profile_completed);
        assert!(created.approved.is_none());

        let loaded = users.get(&created.id).expect("load");
        assert_eq!(loaded.email, created.email);
        assert_ne!(loaded.password_hash, "s3cret-pw");
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (_temp, users) = service();

        users
            .register(email("dup@example.com"), "pw-one", name("First"), Role::Patient)
            .expect("first registration");

        let err = users
            .register(email("DUP@example.com"), "pw-two", name("Second"), Role::Caregiver)
            .expect_err("should reject duplicate");
        assert!(matches!(err, CareError::EmailAlreadyRegistered(_)));
    }

    #[test]
    fn admin_role_cannot_self_register() {
        let (_temp, users) = service();

        let err = users
            .register(email("boss@example.com"), "pw", name("Boss"), Role::Admin)
            .expect_err("should reject");
        assert!(matches!(err, CareError::InvalidInput(_)));

        let admin = users
            .create_admin(email("boss@example.com"), "pw", name("Boss"))
            .expect("create via CLI path");
        assert_eq!(admin.role, Role::Admin);
        assert!(admin.profile_completed);
    }

    #[test]
    fn authenticate_checks_password() {
        let (_temp, users) = service();

        let created = users
            .register(email("ann@example.com"), "right-pw", name("Ann"), Role::Patient)
            .unwrap();

        let ok = users
            .authenticate(&email("ann@example.com"), "right-pw")
            .expect("should authenticate");
        assert_eq!(ok.id, created.id);

        assert!(matches!(
            users.authenticate(&email("ann@example.com"), "wrong-pw"),
            Err(CareError::InvalidCredentials)
        ));
        assert!(matches!(
            users.authenticate(&email("nobody@example.com"), "right-pw"),
            Err(CareError::InvalidCredentials)
        ));
    }

    #[test]
    fn doctor_registration_and_approval() {
        let (_temp, users) = service();

        let doctor = users
            .register(email("doc@example.com"), "pw", name("Dr Doyle"), Role::Doctor)
            .unwrap();
        assert_eq!(doctor.approved, Some(false));

        let approved = users.approve_doctor(&doctor.id).expect("approve");
        assert_eq!(approved.approved, Some(true));

        let patient = users
            .register(email("pat@example.com"), "pw", name("Pat"), Role::Patient)
            .unwrap();
        assert!(matches!(
            users.approve_doctor(&patient.id),
            Err(CareError::InvalidInput(_))
        ));
    }

    #[test]
    fn complete_profile_enforces_role_match() {
        let (_temp, users) = service();

        let patient = users
            .register(email("p@example.com"), "pw", name("P"), Role::Patient)
            .unwrap();

        let profile = ProfileSection::Patient(PatientProfile {
            date_of_birth: "1985-06-14".into(),
            gender: "female".into(),
            phone: "+353 87 111 2222".into(),
            address: "4 Harbour Row, Cork".into(),
        });

        let updated = users.complete_profile(&patient.id, profile).expect("complete");
        assert!(updated.profile_completed);

        let doctor_profile = ProfileSection::Doctor(records::DoctorProfile {
            speciality: "cardiology".into(),
            qualifications: "MB BCh".into(),
            experience_years: 9,
            phone: "+353 86 000 1111".into(),
        });
        assert!(matches!(
            users.complete_profile(&patient.id, doctor_profile),
            Err(CareError::InvalidInput(_))
        ));
    }

    #[test]
    fn list_filters_by_role() {
        let (_temp, users) = service();

        users
            .register(email("p1@example.com"), "pw", name("P1"), Role::Patient)
            .unwrap();
        users
            .register(email("p2@example.com"), "pw", name("P2"), Role::Patient)
            .unwrap();
        users
            .register(email("d1@example.com"), "pw", name("D1"), Role::Doctor)
            .unwrap();

        assert_eq!(users.list(None).unwrap().len(), 3);
        assert_eq!(users.list(Some(Role::Patient)).unwrap().len(), 2);
        assert_eq!(users.list(Some(Role::Admin)).unwrap().len(), 0);
    }

    #[test]
    fn remove_deletes_account() {
        let (_temp, users) = service();

        let user = users
            .register(email("gone@example.com"), "pw", name("Gone"), Role::Patient)
            .unwrap();

        users.remove(&user.id).expect("remove");
        assert!(matches!(
            users.get(&user.id),
            Err(CareError::UserNotFound(_))
        ));
        assert!(matches!(
            users.remove(&user.id),
            Err(CareError::UserNotFound(_))
        ));
    }
}
