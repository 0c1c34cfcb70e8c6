//! Request and response bodies for the REST API.
//!
//! Timestamps travel as RFC 3339 strings and identifiers as canonical
//! 32-hex UUID strings; roles and statuses use their lowercase wire form.
//! Translation to and from domain types happens in the handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Health
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Generic acknowledgement for operations with no payload to return.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct OkRes {
    pub success: bool,
}

// ============================================================================
// Accounts and sessions
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterReq {
    pub email: String,
    pub password: String,
    pub display_name: String,
    /// One of `patient`, `doctor`, `caregiver`.
    pub role: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRes {
    /// Opaque session token; send back in the `x-session-token` header.
    pub token: String,
    pub user: UserRes,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientProfileDto {
    pub date_of_birth: String,
    pub gender: String,
    pub phone: String,
    pub address: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DoctorProfileDto {
    pub speciality: String,
    pub qualifications: String,
    pub experience_years: u32,
    pub phone: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CaregiverProfileDto {
    pub phone: String,
    pub relationship: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UserRes {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub profile_completed: bool,
    /// Present for doctors only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_profile: Option<PatientProfileDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_profile: Option<DoctorProfileDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caregiver_profile: Option<CaregiverProfileDto>,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListUsersRes {
    pub users: Vec<UserRes>,
}

/// Role-specific onboarding data; exactly one section must be present and it
/// must match the caller's role.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CompleteProfileReq {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_profile: Option<PatientProfileDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_profile: Option<DoctorProfileDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caregiver_profile: Option<CaregiverProfileDto>,
}

/// Outcome of an access-guard evaluation.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessRes {
    pub authorized: bool,
    /// Where to send the caller when not authorised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

// ============================================================================
// Appointments
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAppointmentReq {
    pub doctor_id: String,
    /// RFC 3339 timestamp of the requested slot.
    pub scheduled_at: String,
    pub reason: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AttachmentRes {
    pub file_name: String,
    pub file_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    pub uploaded_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AppointmentRes {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub scheduled_at: String,
    pub reason: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub attachments: Vec<AttachmentRes>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListAppointmentsRes {
    pub appointments: Vec<AppointmentRes>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CompleteAppointmentReq {
    /// Doctor's notes; must not be empty.
    pub notes: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AddAttachmentReq {
    pub file_name: String,
    /// File content, standard base64.
    pub content_base64: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StoredAttachmentRes {
    pub file_name: String,
    pub stored_name: String,
    pub file_url: String,
    pub storage_path: String,
    pub uploaded_at: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    pub sha256: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AddAttachmentRes {
    pub appointment: AppointmentRes,
    pub attachment: StoredAttachmentRes,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RemoveAttachmentReq {
    /// URL of the attachment entry to remove, as stored on the record.
    pub file_url: String,
}

// ============================================================================
// Caregivers
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CaregiverRequestReq {
    pub caregiver_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CaregiverRequestRes {
    pub patient_id: String,
    pub caregiver_id: String,
    pub status: String,
    pub requested_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListCaregiverRequestsRes {
    pub requests: Vec<CaregiverRequestRes>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CaregiverLinkRes {
    pub patient_id: String,
    pub caregiver_id: String,
    pub linked_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListCaregiverPatientsRes {
    pub patients: Vec<CaregiverLinkRes>,
}

// ============================================================================
// Daily measures
// ============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct VitalsDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic_bp: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diastolic_bp: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_glucose: Option<f32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordMeasureReq {
    pub vitals: VitalsDto,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MeasureRes {
    /// Calendar date key, `YYYY-MM-DD`.
    pub date: String,
    pub vitals: VitalsDto,
    pub added_by: String,
    pub recorded_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListMeasuresRes {
    pub measures: Vec<MeasureRes>,
}
