//! Translation between domain types and API DTOs.
//!
//! Identifiers become canonical UUID strings, timestamps become RFC 3339
//! strings, enums use their lowercase wire form.

use api_shared::dto;
use carebook_files::AttachmentMetadata;
use records::{
    AppointmentData, AttachmentEntry, CaregiverLinkData, CaregiverRequestData, DailyMeasureData,
    ProfileSection, UserData, Vitals,
};

pub(crate) fn user_res(user: &UserData) -> dto::UserRes {
    let (patient_profile, doctor_profile, caregiver_profile) = match &user.profile {
        Some(ProfileSection::Patient(p)) => (
            Some(dto::PatientProfileDto {
                date_of_birth: p.date_of_birth.clone(),
                gender: p.gender.clone(),
                phone: p.phone.clone(),
                address: p.address.clone(),
            }),
            None,
            None,
        ),
        Some(ProfileSection::Doctor(d)) => (
            None,
            Some(dto::DoctorProfileDto {
                speciality: d.speciality.clone(),
                qualifications: d.qualifications.clone(),
                experience_years: d.experience_years,
                phone: d.phone.clone(),
            }),
            None,
        ),
        Some(ProfileSection::Caregiver(c)) => (
            None,
            None,
            Some(dto::CaregiverProfileDto {
                phone: c.phone.clone(),
                relationship: c.relationship.clone(),
            }),
        ),
        None => (None, None, None),
    };

    dto::UserRes {
        id: user.id.to_string(),
        email: user.email.to_string(),
        display_name: user.display_name.clone(),
        role: user.role.as_str().to_string(),
        profile_completed: user.profile_completed,
        approved: user.approved,
        patient_profile,
        doctor_profile,
        caregiver_profile,
        created_at: user.created_at.to_rfc3339(),
    }
}

pub(crate) fn attachment_res(entry: &AttachmentEntry) -> dto::AttachmentRes {
    dto::AttachmentRes {
        file_name: entry.file_name.clone(),
        file_url: entry.file_url.clone(),
        storage_path: entry.storage_path.clone(),
        uploaded_at: entry.uploaded_at.to_rfc3339(),
    }
}

pub(crate) fn appointment_res(appointment: &AppointmentData) -> dto::AppointmentRes {
    dto::AppointmentRes {
        id: appointment.id.to_string(),
        patient_id: appointment.patient_id.to_string(),
        doctor_id: appointment.doctor_id.to_string(),
        scheduled_at: appointment.scheduled_at.to_rfc3339(),
        reason: appointment.reason.clone(),
        status: appointment.status.as_str().to_string(),
        notes: appointment.notes.clone(),
        attachments: appointment.attachments.iter().map(attachment_res).collect(),
        created_at: appointment.created_at.to_rfc3339(),
        updated_at: appointment.updated_at.to_rfc3339(),
    }
}

pub(crate) fn stored_attachment_res(metadata: &AttachmentMetadata) -> dto::StoredAttachmentRes {
    dto::StoredAttachmentRes {
        file_name: metadata.file_name.clone(),
        stored_name: metadata.stored_name.clone(),
        file_url: metadata.file_url.clone(),
        storage_path: metadata.storage_path.clone(),
        uploaded_at: metadata.uploaded_at.to_rfc3339(),
        size_bytes: metadata.size_bytes,
        media_type: metadata.media_type.clone(),
        sha256: metadata.sha256.clone(),
    }
}

pub(crate) fn caregiver_request_res(request: &CaregiverRequestData) -> dto::CaregiverRequestRes {
    dto::CaregiverRequestRes {
        patient_id: request.patient_id.to_string(),
        caregiver_id: request.caregiver_id.to_string(),
        status: request.status.as_str().to_string(),
        requested_at: request.requested_at.to_rfc3339(),
        decided_at: request.decided_at.map(|t| t.to_rfc3339()),
    }
}

pub(crate) fn caregiver_link_res(link: &CaregiverLinkData) -> dto::CaregiverLinkRes {
    dto::CaregiverLinkRes {
        patient_id: link.patient_id.to_string(),
        caregiver_id: link.caregiver_id.to_string(),
        linked_at: link.linked_at.to_rfc3339(),
    }
}

pub(crate) fn vitals_from_dto(vitals: &dto::VitalsDto) -> Vitals {
    Vitals {
        systolic_bp: vitals.systolic_bp,
        diastolic_bp: vitals.diastolic_bp,
        heart_rate: vitals.heart_rate,
        temperature_c: vitals.temperature_c,
        weight_kg: vitals.weight_kg,
        blood_glucose: vitals.blood_glucose,
    }
}

pub(crate) fn vitals_dto(vitals: &Vitals) -> dto::VitalsDto {
    dto::VitalsDto {
        systolic_bp: vitals.systolic_bp,
        diastolic_bp: vitals.diastolic_bp,
        heart_rate: vitals.heart_rate,
        temperature_c: vitals.temperature_c,
        weight_kg: vitals.weight_kg,
        blood_glucose: vitals.blood_glucose,
    }
}

pub(crate) fn measure_res(measure: &DailyMeasureData) -> dto::MeasureRes {
    dto::MeasureRes {
        date: measure.date.format("%Y-%m-%d").to_string(),
        vitals: vitals_dto(&measure.vitals),
        added_by: measure.added_by.to_string(),
        recorded_at: measure.recorded_at.to_rfc3339(),
    }
}
