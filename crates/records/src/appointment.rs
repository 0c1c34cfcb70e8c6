//! Appointment wire models, status lifecycle and translation helpers.
//!
//! Responsibilities:
//! - Define the public domain-level appointment types
//! - Define the status enum and its legal transitions
//! - Define a strict wire model for serialisation/deserialisation
//! - Validate appointment structure and enforce required fields
//!
//! Notes:
//! - The appointment file is mutable and overwriteable; status changes are
//!   whole-file rewrites
//! - Attachment entries are append-only in normal operation; removal rewrites
//!   the list minus the removed entry

use crate::role::Role;
use crate::{parse_uuid_field, parse_wire, RecordsError, RecordsResult};
use carebook_uuid::ShardableUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Public domain-level types
// ============================================================================

/// Lifecycle status of an appointment.
///
/// Transitions are monotonic: `pending -> {approved | declined}` and
/// `approved -> completed`. `declined` and `completed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    /// Requested by the patient, awaiting the doctor's decision.
    Pending,
    /// Accepted by the doctor, awaiting the consultation.
    Approved,
    /// Turned down by the doctor. Terminal.
    Declined,
    /// Consultation held; notes and attachments recorded. Terminal.
    Completed,
}

impl AppointmentStatus {
    /// All statuses legally reachable from this one.
    pub fn valid_transitions(self) -> &'static [AppointmentStatus] {
        match self {
            AppointmentStatus::Pending => {
                &[AppointmentStatus::Approved, AppointmentStatus::Declined]
            }
            AppointmentStatus::Approved => &[AppointmentStatus::Completed],
            // Terminal states
            AppointmentStatus::Declined | AppointmentStatus::Completed => &[],
        }
    }

    /// Whether moving from this status to `next` is legal.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    /// Wire format string, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Approved => "approved",
            AppointmentStatus::Declined => "declined",
            AppointmentStatus::Completed => "completed",
        }
    }

    /// Whether attachments may be added while in this status.
    ///
    /// Files are staged while the appointment is approved and may still be
    /// appended once completed; they are never attached to pending or
    /// declined requests.
    pub fn accepts_attachments(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Approved | AppointmentStatus::Completed
        )
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A file attached to an appointment.
///
/// Points at externally stored content; the appointment record itself never
/// holds file bytes. `storage_path` is relative to the appointments
/// collection root and may be absent for entries imported from systems that
/// only recorded a URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttachmentEntry {
    /// Original file name as uploaded.
    pub file_name: String,

    /// URL the content can be fetched from.
    pub file_url: String,

    /// Storage location relative to the appointments root, when known.
    pub storage_path: Option<String>,

    /// UTC timestamp of the upload.
    pub uploaded_at: DateTime<Utc>,
}

/// Domain-level carrier for an appointment record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppointmentData {
    /// Unique identifier for this appointment.
    pub id: ShardableUuid,

    /// The requesting patient.
    pub patient_id: ShardableUuid,

    /// The doctor the appointment is with.
    pub doctor_id: ShardableUuid,

    /// When the consultation is scheduled for.
    pub scheduled_at: DateTime<Utc>,

    /// The patient's stated reason for the visit.
    pub reason: String,

    /// Current lifecycle status.
    pub status: AppointmentStatus,

    /// Doctor's notes, set at completion.
    pub notes: Option<String>,

    /// Attached files, in upload order.
    pub attachments: Vec<AttachmentEntry>,

    /// When the request was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,
}

impl AppointmentData {
    /// The role expected to act next on this appointment, if any.
    ///
    /// Pending requests await the doctor's decision; approved appointments
    /// await the doctor's completion. Terminal states have no next actor.
    pub fn awaiting_role(&self) -> Option<Role> {
        match self.status {
            AppointmentStatus::Pending | AppointmentStatus::Approved => Some(Role::Doctor),
            AppointmentStatus::Declined | AppointmentStatus::Completed => None,
        }
    }
}

// ============================================================================
// Public Appointment operations
// ============================================================================

/// Appointment record operations.
///
/// Zero-sized type used for namespacing; all methods are associated
/// functions.
pub struct Appointment;

impl Appointment {
    /// Parse an appointment record from YAML text.
    ///
    /// Uses `serde_path_to_error` to surface a best-effort path (for example
    /// `attachments.0.file_url`) to the failing field when the YAML does not
    /// match the wire schema.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError`] if:
    /// - the YAML does not represent a valid appointment record,
    /// - any field has an unexpected type,
    /// - any unknown keys are present,
    /// - any identifier is not a canonical UUID.
    pub fn parse(yaml_text: &str) -> RecordsResult<AppointmentData> {
        let wire: AppointmentWire = parse_wire(yaml_text, "Appointment record")?;
        wire_to_domain(wire)
    }

    /// Render an appointment record as YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError`] if serialisation fails.
    pub fn render(data: &AppointmentData) -> RecordsResult<String> {
        let wire = domain_to_wire(data);
        serde_yaml::to_string(&wire).map_err(|e| {
            RecordsError::Translation(format!("Failed to serialise appointment record: {e}"))
        })
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of an appointment record for on-disk YAML.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct AppointmentWire {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub reason: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: AppointmentWire) -> RecordsResult<AppointmentData> {
    let id = parse_uuid_field(&wire.id, "id")?;
    let patient_id = parse_uuid_field(&wire.patient_id, "patient_id")?;
    let doctor_id = parse_uuid_field(&wire.doctor_id, "doctor_id")?;

    if wire.reason.trim().is_empty() {
        return Err(RecordsError::InvalidInput(
            "Appointment reason cannot be empty".into(),
        ));
    }

    Ok(AppointmentData {
        id,
        patient_id,
        doctor_id,
        scheduled_at: wire.scheduled_at,
        reason: wire.reason,
        status: wire.status,
        notes: wire.notes,
        attachments: wire.attachments,
        created_at: wire.created_at,
        updated_at: wire.updated_at,
    })
}

fn domain_to_wire(data: &AppointmentData) -> AppointmentWire {
    AppointmentWire {
        id: data.id.to_string(),
        patient_id: data.patient_id.to_string(),
        doctor_id: data.doctor_id.to_string(),
        scheduled_at: data.scheduled_at,
        reason: data.reason.clone(),
        status: data.status,
        notes: data.notes.clone(),
        attachments: data.attachments.clone(),
        created_at: data.created_at,
        updated_at: data.updated_at,
    }
}
