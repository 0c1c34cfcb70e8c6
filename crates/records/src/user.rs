//! User account wire models and translation helpers.
//!
//! Responsibilities:
//! - Define the public domain-level user types, including the role-specific
//!   profile sections
//! - Define a strict wire model for serialisation/deserialisation
//! - Enforce the role/profile pairing: a record may only carry the profile
//!   section matching its role
//!
//! Notes:
//! - The user file is mutable and overwriteable
//! - `approved` is only present on doctor records; other roles never carry it

use crate::role::Role;
use crate::{parse_uuid_field, parse_wire, RecordsError, RecordsResult};
use carebook_types::EmailAddress;
use carebook_uuid::ShardableUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Public domain-level types
// ============================================================================

/// Patient onboarding data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientProfile {
    /// ISO 8601 date of birth (YYYY-MM-DD).
    pub date_of_birth: String,
    pub gender: String,
    pub phone: String,
    pub address: String,
}

/// Doctor onboarding data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DoctorProfile {
    pub speciality: String,
    pub qualifications: String,
    pub experience_years: u32,
    pub phone: String,
}

/// Caregiver onboarding data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaregiverProfile {
    pub phone: String,
    /// Relationship to the patients cared for (for example "daughter").
    pub relationship: String,
}

/// The role-specific profile section of a user record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileSection {
    Patient(PatientProfile),
    Doctor(DoctorProfile),
    Caregiver(CaregiverProfile),
}

impl ProfileSection {
    /// The role this section belongs to.
    pub fn role(&self) -> Role {
        match self {
            ProfileSection::Patient(_) => Role::Patient,
            ProfileSection::Doctor(_) => Role::Doctor,
            ProfileSection::Caregiver(_) => Role::Caregiver,
        }
    }
}

/// Domain-level carrier for a user account record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserData {
    /// Unique identifier for this account.
    pub id: ShardableUuid,

    /// Normalised login email; unique across the users collection.
    pub email: EmailAddress,

    /// PBKDF2 password hash in PHC string format.
    pub password_hash: String,

    /// Name shown in dashboards and listings.
    pub display_name: String,

    /// Account role, fixed at creation.
    pub role: Role,

    /// Whether role-specific onboarding has been completed.
    pub profile_completed: bool,

    /// Doctor approval flag; `None` for every other role.
    pub approved: Option<bool>,

    /// Role-specific onboarding data, present once the profile is completed.
    pub profile: Option<ProfileSection>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Public User operations
// ============================================================================

/// User record operations.
///
/// Zero-sized type used for namespacing; all methods are associated
/// functions.
pub struct User;

impl User {
    /// Parse a user record from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError`] if:
    /// - the YAML does not match the wire schema (unknown keys, wrong types),
    /// - the id is not a canonical UUID,
    /// - a profile section is present that does not match the role,
    /// - `approved` appears on a non-doctor record.
    pub fn parse(yaml_text: &str) -> RecordsResult<UserData> {
        let wire: UserWire = parse_wire(yaml_text, "User record")?;
        wire_to_domain(wire)
    }

    /// Render a user record as YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError`] if serialisation fails.
    pub fn render(data: &UserData) -> RecordsResult<String> {
        let wire = domain_to_wire(data);
        serde_yaml::to_string(&wire)
            .map_err(|e| RecordsError::Translation(format!("Failed to serialise user record: {e}")))
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of a user record for on-disk YAML.
///
/// At most one of the profile sections may be present, and it must match
/// `role`; this is validated during translation rather than by serde.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct UserWire {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: Role,
    pub profile_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_profile: Option<PatientProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_profile: Option<DoctorProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caregiver_profile: Option<CaregiverProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: UserWire) -> RecordsResult<UserData> {
    let id = parse_uuid_field(&wire.id, "id")?;

    let email = EmailAddress::new(&wire.email)
        .map_err(|e| RecordsError::Translation(format!("Invalid email in user record: {e}")))?;

    if wire.role != Role::Doctor && wire.approved.is_some() {
        return Err(RecordsError::Translation(format!(
            "approved flag is only valid on doctor records, found on role '{}'",
            wire.role
        )));
    }

    let sections = [
        wire.patient_profile.clone().map(ProfileSection::Patient),
        wire.doctor_profile.clone().map(ProfileSection::Doctor),
        wire.caregiver_profile.clone().map(ProfileSection::Caregiver),
    ];
    let mut present = sections.into_iter().flatten();
    let profile = present.next();
    if present.next().is_some() {
        return Err(RecordsError::Translation(
            "User record carries more than one profile section".into(),
        ));
    }

    if let Some(section) = &profile {
        if section.role() != wire.role {
            return Err(RecordsError::Translation(format!(
                "Profile section for role '{}' does not match record role '{}'",
                section.role(),
                wire.role
            )));
        }
    }

    Ok(UserData {
        id,
        email,
        password_hash: wire.password_hash,
        display_name: wire.display_name,
        role: wire.role,
        profile_completed: wire.profile_completed,
        approved: wire.approved,
        profile,
        created_at: wire.created_at,
        updated_at: wire.updated_at,
    })
}

fn domain_to_wire(data: &UserData) -> UserWire {
    let (patient_profile, doctor_profile, caregiver_profile) = match &data.profile {
        Some(ProfileSection::Patient(p)) => (Some(p.clone()), None, None),
        Some(ProfileSection::Doctor(d)) => (None, Some(d.clone()), None),
        Some(ProfileSection::Caregiver(c)) => (None, None, Some(c.clone())),
        None => (None, None, None),
    };

    UserWire {
        id: data.id.to_string(),
        email: data.email.to_string(),
        password_hash: data.password_hash.clone(),
        display_name: data.display_name.clone(),
        role: data.role,
        profile_completed: data.profile_completed,
        approved: data.approved,
        patient_profile,
        doctor_profile,
        caregiver_profile,
        created_at: data.created_at,
        updated_at: data.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"id: "a4f91c6d3b2e4c5f9d7a1e8b6c0a9f12"
email: "maria@example.com"
password_hash: "$pbkdf2-sha256$i=600000,l=32$abc$def"
display_name: "Maria Keane"
role: patient
profile_completed: false
created_at: "2026-02-01T08:00:00Z"
updated_at: "2026-02-01T08:00:00Z"
"#;

    #[test]
    fn round_trips_sample_yaml() {
        let data = User::parse(SAMPLE).expect("parse yaml");
        let output = User::render(&data).expect("render record");
        let reparsed = User::parse(&output).expect("reparse yaml");
        assert_eq!(data, reparsed);
    }

    #[test]
    fn parses_completed_patient_profile() {
        let input = format!(
            "{}patient_profile:\n  date_of_birth: \"1985-06-14\"\n  gender: female\n  phone: \"+353 87 111 2222\"\n  address: \"4 Harbour Row, Cork\"\n",
            SAMPLE.replace("profile_completed: false", "profile_completed: true")
        );

        let data = User::parse(&input).expect("should parse");
        assert!(data.profile_completed);
        match data.profile {
            Some(ProfileSection::Patient(p)) => assert_eq!(p.date_of_birth, "1985-06-14"),
            other => panic!("expected patient profile, got {other:?}"),
        }
    }

    #[test]
    fn rejects_profile_section_for_wrong_role() {
        let input = format!(
            "{}doctor_profile:\n  speciality: cardiology\n  qualifications: \"MB BCh\"\n  experience_years: 9\n  phone: \"+353 86 000 1111\"\n",
            SAMPLE
        );

        let err = User::parse(&input).expect_err("should reject doctor profile on patient");
        match err {
            RecordsError::Translation(msg) => assert!(msg.contains("does not match")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_approved_flag_on_non_doctor() {
        let input = format!("{SAMPLE}approved: true\n");
        let err = User::parse(&input).expect_err("should reject approved on patient");
        match err {
            RecordsError::Translation(msg) => assert!(msg.contains("doctor")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_unapproved_doctor() {
        let input = SAMPLE
            .replace("role: patient", "role: doctor")
            .replace("profile_completed: false", "profile_completed: false\napproved: false");

        let data = User::parse(&input).expect("should parse doctor");
        assert_eq!(data.role, Role::Doctor);
        assert_eq!(data.approved, Some(false));
    }

    #[test]
    fn strict_validation_rejects_unknown_keys() {
        let input = format!("{SAMPLE}favourite_colour: blue\n");
        let err = User::parse(&input).expect_err("should reject unknown key");
        match err {
            RecordsError::Translation(msg) => assert!(msg.contains("favourite_colour")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_email() {
        let input = SAMPLE.replace("maria@example.com", "not-an-email");
        let err = User::parse(&input).expect_err("should reject bad email");
        assert!(matches!(err, RecordsError::Translation(_)));
    }
}
