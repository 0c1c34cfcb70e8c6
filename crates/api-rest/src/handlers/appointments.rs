//! Appointment lifecycle and attachment endpoints.
//!
//! Lifecycle rules are enforced in `carebook-core`; this layer adds the
//! actor checks: patients operate on their own appointments, doctors on
//! appointments addressed to them, admins may read everything.

use crate::handlers::{current_user, require_area};
use crate::translate::{appointment_res, stored_attachment_res};
use crate::{fail, AppState};
use api_shared::dto::{
    AddAttachmentReq, AddAttachmentRes, AppointmentRes, CompleteAppointmentReq,
    CreateAppointmentReq, ListAppointmentsRes, OkRes, RemoveAttachmentReq,
};
use axum::extract::{Path as AxumPath, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use carebook_core::{NonEmptyText, Role};
use carebook_uuid::ShardableUuid;
use chrono::{DateTime, Utc};
use records::{AppointmentData, UserData};

fn parse_id(id: &str) -> Result<ShardableUuid, (StatusCode, &'static str)> {
    ShardableUuid::parse(id).map_err(|e| {
        tracing::error!("Invalid appointment UUID: {:?}", e);
        (StatusCode::BAD_REQUEST, "Invalid appointment UUID")
    })
}

/// The caller must be a party to the appointment (or an admin, for reads).
fn require_party(
    user: &UserData,
    appointment: &AppointmentData,
    allow_admin: bool,
) -> Result<(), (StatusCode, &'static str)> {
    let is_party = appointment.patient_id == user.id || appointment.doctor_id == user.id;
    let is_admin = allow_admin && user.role == Role::Admin;

    if is_party || is_admin {
        Ok(())
    } else {
        Err((StatusCode::FORBIDDEN, "Forbidden"))
    }
}

#[utoipa::path(
    post,
    path = "/appointments",
    request_body = CreateAppointmentReq,
    responses(
        (status = 201, description = "Appointment requested", body = AppointmentRes),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Not an onboarded patient"),
        (status = 500, description = "Internal server error")
    )
)]
/// Request an appointment with a doctor
///
/// The caller becomes the appointment's patient; the record starts in the
/// `pending` state awaiting the doctor's decision.
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateAppointmentReq>,
) -> Result<(StatusCode, Json<AppointmentRes>), (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    require_area(&user, Role::Patient)?;

    let doctor_id = ShardableUuid::parse(&req.doctor_id)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid doctor UUID"))?;
    let scheduled_at = DateTime::parse_from_rfc3339(&req.scheduled_at)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| (StatusCode::BAD_REQUEST, "scheduled_at must be RFC 3339"))?;
    let reason = NonEmptyText::new(&req.reason)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Reason cannot be empty"))?;

    match state
        .appointments
        .request(&user.id, &doctor_id, scheduled_at, reason)
    {
        Ok(appointment) => Ok((StatusCode::CREATED, Json(appointment_res(&appointment)))),
        Err(e) => Err(fail("Create appointment", e)),
    }
}

#[utoipa::path(
    get,
    path = "/appointments",
    responses(
        (status = 200, description = "Appointments visible to the caller", body = ListAppointmentsRes),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Role has no appointment listing"),
        (status = 500, description = "Internal server error")
    )
)]
/// List appointments scoped to the caller's role
///
/// Patients see their own requests, doctors their own schedule, admins
/// everything. Results are ordered soonest first.
#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ListAppointmentsRes>, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;

    let listing = match user.role {
        Role::Patient => {
            require_area(&user, Role::Patient)?;
            state.appointments.list_for_patient(&user.id)
        }
        Role::Doctor => {
            require_area(&user, Role::Doctor)?;
            state.appointments.list_for_doctor(&user.id)
        }
        Role::Admin => state.appointments.list_all(),
        Role::Caregiver => return Err((StatusCode::FORBIDDEN, "Forbidden")),
    };

    match listing {
        Ok(appointments) => Ok(Json(ListAppointmentsRes {
            appointments: appointments.iter().map(appointment_res).collect(),
        })),
        Err(e) => Err(fail("List appointments", e)),
    }
}

#[utoipa::path(
    get,
    path = "/appointments/{id}",
    responses(
        (status = 200, description = "Appointment", body = AppointmentRes),
        (status = 403, description = "Not a party to this appointment"),
        (status = 404, description = "Not found")
    )
)]
/// Fetch one appointment
#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<AppointmentRes>, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    let id = parse_id(&id)?;

    let appointment = state
        .appointments
        .get(&id)
        .map_err(|e| fail("Get appointment", e))?;
    require_party(&user, &appointment, true)?;

    Ok(Json(appointment_res(&appointment)))
}

#[utoipa::path(
    post,
    path = "/appointments/{id}/approve",
    responses(
        (status = 200, description = "Appointment approved", body = AppointmentRes),
        (status = 403, description = "Not this appointment's doctor"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Not pending"),
        (status = 500, description = "Internal server error")
    )
)]
/// Approve a pending appointment (doctor)
#[axum::debug_handler]
pub async fn approve_appointment(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<AppointmentRes>, (StatusCode, &'static str)> {
    let (id, _) = doctor_and_appointment(&state, &headers, &id)?;

    match state.appointments.approve(&id) {
        Ok(appointment) => Ok(Json(appointment_res(&appointment))),
        Err(e) => Err(fail("Approve appointment", e)),
    }
}

#[utoipa::path(
    post,
    path = "/appointments/{id}/decline",
    responses(
        (status = 200, description = "Appointment declined", body = AppointmentRes),
        (status = 403, description = "Not this appointment's doctor"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Not pending"),
        (status = 500, description = "Internal server error")
    )
)]
/// Decline a pending appointment (doctor)
#[axum::debug_handler]
pub async fn decline_appointment(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<AppointmentRes>, (StatusCode, &'static str)> {
    let (id, _) = doctor_and_appointment(&state, &headers, &id)?;

    match state.appointments.decline(&id) {
        Ok(appointment) => Ok(Json(appointment_res(&appointment))),
        Err(e) => Err(fail("Decline appointment", e)),
    }
}

#[utoipa::path(
    post,
    path = "/appointments/{id}/complete",
    request_body = CompleteAppointmentReq,
    responses(
        (status = 200, description = "Appointment completed", body = AppointmentRes),
        (status = 400, description = "Notes are required"),
        (status = 403, description = "Not this appointment's doctor"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Not approved"),
        (status = 500, description = "Internal server error")
    )
)]
/// Complete an approved appointment with consultation notes (doctor)
///
/// Empty notes are rejected before anything is written.
#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<CompleteAppointmentReq>,
) -> Result<Json<AppointmentRes>, (StatusCode, &'static str)> {
    let (id, _) = doctor_and_appointment(&state, &headers, &id)?;

    let notes = NonEmptyText::new(&req.notes)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Notes cannot be empty"))?;

    match state.appointments.complete(&id, notes) {
        Ok(appointment) => Ok(Json(appointment_res(&appointment))),
        Err(e) => Err(fail("Complete appointment", e)),
    }
}

#[utoipa::path(
    delete,
    path = "/appointments/{id}",
    responses(
        (status = 200, description = "Appointment cancelled", body = OkRes),
        (status = 403, description = "Not this appointment's patient"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Only pending appointments can be cancelled"),
        (status = 500, description = "Internal server error")
    )
)]
/// Cancel a pending appointment request (patient)
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<OkRes>, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    require_area(&user, Role::Patient)?;
    let id = parse_id(&id)?;

    let appointment = state
        .appointments
        .get(&id)
        .map_err(|e| fail("Cancel appointment", e))?;
    if appointment.patient_id != user.id {
        return Err((StatusCode::FORBIDDEN, "Forbidden"));
    }

    match state.appointments.cancel(&id) {
        Ok(()) => Ok(Json(OkRes { success: true })),
        Err(e) => Err(fail("Cancel appointment", e)),
    }
}

#[utoipa::path(
    post,
    path = "/appointments/{id}/attachments",
    request_body = AddAttachmentReq,
    responses(
        (status = 201, description = "Attachment stored", body = AddAttachmentRes),
        (status = 400, description = "Bad file name or content"),
        (status = 403, description = "Not this appointment's doctor"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Appointment does not accept attachments"),
        (status = 500, description = "Internal server error")
    )
)]
/// Upload a file and append it to the appointment (doctor)
///
/// Allowed once the appointment is approved; the new entry is appended
/// after any existing attachments.
#[axum::debug_handler]
pub async fn add_attachment(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<AddAttachmentReq>,
) -> Result<(StatusCode, Json<AddAttachmentRes>), (StatusCode, &'static str)> {
    let (id, _) = doctor_and_appointment(&state, &headers, &id)?;

    let bytes = BASE64
        .decode(req.content_base64.as_bytes())
        .map_err(|_| (StatusCode::BAD_REQUEST, "content_base64 is not valid base64"))?;

    match state.appointments.add_attachment(&id, &req.file_name, &bytes) {
        Ok((appointment, metadata)) => Ok((
            StatusCode::CREATED,
            Json(AddAttachmentRes {
                appointment: appointment_res(&appointment),
                attachment: stored_attachment_res(&metadata),
            }),
        )),
        Err(e) => Err(fail("Add attachment", e)),
    }
}

#[utoipa::path(
    delete,
    path = "/appointments/{id}/attachments",
    request_body = RemoveAttachmentReq,
    responses(
        (status = 200, description = "Attachment removed", body = AppointmentRes),
        (status = 403, description = "Not this appointment's doctor"),
        (status = 404, description = "No attachment with that URL"),
        (status = 500, description = "Internal server error")
    )
)]
/// Remove an attachment entry by its URL (doctor)
///
/// Deletes the stored file when the entry carries a storage path;
/// otherwise only the metadata entry is removed.
#[axum::debug_handler]
pub async fn remove_attachment(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<RemoveAttachmentReq>,
) -> Result<Json<AppointmentRes>, (StatusCode, &'static str)> {
    let (id, _) = doctor_and_appointment(&state, &headers, &id)?;

    match state.appointments.remove_attachment(&id, &req.file_url) {
        Ok(appointment) => Ok(Json(appointment_res(&appointment))),
        Err(e) => Err(fail("Remove attachment", e)),
    }
}

#[utoipa::path(
    get,
    path = "/appointments/{id}/attachments/{name}",
    responses(
        (status = 200, description = "Attachment content", body = Vec<u8>),
        (status = 403, description = "Not a party to this appointment"),
        (status = 404, description = "Not found")
    )
)]
/// Download a stored attachment by its stored name
#[axum::debug_handler]
pub async fn download_attachment(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath((id, name)): AxumPath<(String, String)>,
) -> Result<Response, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    let id = parse_id(&id)?;

    let appointment = state
        .appointments
        .get(&id)
        .map_err(|e| fail("Download attachment", e))?;
    require_party(&user, &appointment, true)?;

    match state.appointments.read_attachment(&id, &name) {
        Ok(bytes) => Ok((
            [(header::CONTENT_TYPE, "application/octet-stream")],
            bytes,
        )
            .into_response()),
        Err(e) => Err(fail("Download attachment", e)),
    }
}

/// Resolves the caller as the doctor of the given appointment.
fn doctor_and_appointment(
    state: &AppState,
    headers: &HeaderMap,
    raw_id: &str,
) -> Result<(ShardableUuid, AppointmentData), (StatusCode, &'static str)> {
    let user = current_user(state, headers)?;
    require_area(&user, Role::Doctor)?;
    let id = parse_id(raw_id)?;

    let appointment = state
        .appointments
        .get(&id)
        .map_err(|e| fail("Load appointment", e))?;
    if appointment.doctor_id != user.id {
        return Err((StatusCode::FORBIDDEN, "Forbidden"));
    }

    Ok((id, appointment))
}
