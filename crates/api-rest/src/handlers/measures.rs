//! Daily measure endpoints.
//!
//! A patient reads and writes their own measures; a caregiver holding an
//! approved link does the same on the patient's behalf (the link check
//! itself lives in `carebook-core`); admins may read.

use crate::handlers::{current_user, require_area};
use crate::translate::{measure_res, vitals_from_dto};
use crate::{fail, AppState};
use api_shared::dto::{ListMeasuresRes, MeasureRes, RecordMeasureReq};
use axum::extract::{Path as AxumPath, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use carebook_core::Role;
use carebook_uuid::ShardableUuid;
use chrono::NaiveDate;
use records::UserData;

fn parse_patient_id(raw: &str) -> Result<ShardableUuid, (StatusCode, &'static str)> {
    ShardableUuid::parse(raw).map_err(|_| (StatusCode::BAD_REQUEST, "Invalid patient UUID"))
}

fn parse_date(raw: &str) -> Result<NaiveDate, (StatusCode, &'static str)> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| (StatusCode::BAD_REQUEST, "Date must be YYYY-MM-DD"))
}

/// Writers: the patient themselves, or an onboarded caregiver (the link is
/// verified against the store in core when recording).
fn require_writer(
    user: &UserData,
    patient_id: &ShardableUuid,
) -> Result<(), (StatusCode, &'static str)> {
    match user.role {
        Role::Patient if &user.id == patient_id => require_area(user, Role::Patient),
        Role::Caregiver => require_area(user, Role::Caregiver),
        _ => Err((StatusCode::FORBIDDEN, "Forbidden")),
    }
}

/// Readers: writers plus admins; caregivers must hold an approved link.
fn require_reader(
    state: &AppState,
    user: &UserData,
    patient_id: &ShardableUuid,
) -> Result<(), (StatusCode, &'static str)> {
    if user.role == Role::Admin {
        return Ok(());
    }
    if user.role == Role::Caregiver && !state.caregivers.is_linked(&user.id, patient_id) {
        return Err((StatusCode::FORBIDDEN, "Forbidden"));
    }
    require_writer(user, patient_id)
}

#[utoipa::path(
    put,
    path = "/patients/{id}/measures/{date}",
    request_body = RecordMeasureReq,
    responses(
        (status = 200, description = "Measure recorded", body = MeasureRes),
        (status = 400, description = "Bad date or empty vitals"),
        (status = 403, description = "Caller may not record for this patient"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Record (or replace) a day's vitals for a patient
#[axum::debug_handler]
pub async fn record_measure(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath((patient_id, date)): AxumPath<(String, String)>,
    Json(req): Json<RecordMeasureReq>,
) -> Result<Json<MeasureRes>, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    let patient_id = parse_patient_id(&patient_id)?;
    let date = parse_date(&date)?;
    require_writer(&user, &patient_id)?;

    match state
        .measures
        .record(&patient_id, date, vitals_from_dto(&req.vitals), &user.id)
    {
        Ok(measure) => Ok(Json(measure_res(&measure))),
        Err(e) => Err(fail("Record measure", e)),
    }
}

#[utoipa::path(
    get,
    path = "/patients/{id}/measures/{date}",
    responses(
        (status = 200, description = "The day's measures", body = MeasureRes),
        (status = 403, description = "Caller may not read this patient"),
        (status = 404, description = "No entry for that date")
    )
)]
/// Fetch one day's vitals
#[axum::debug_handler]
pub async fn get_measure(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath((patient_id, date)): AxumPath<(String, String)>,
) -> Result<Json<MeasureRes>, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    let patient_id = parse_patient_id(&patient_id)?;
    let date = parse_date(&date)?;
    require_reader(&state, &user, &patient_id)?;

    match state.measures.get(&patient_id, date) {
        Ok(Some(measure)) => Ok(Json(measure_res(&measure))),
        Ok(None) => Err((StatusCode::NOT_FOUND, "No entry for that date")),
        Err(e) => Err(fail("Get measure", e)),
    }
}

#[utoipa::path(
    get,
    path = "/patients/{id}/measures",
    responses(
        (status = 200, description = "All recorded days, oldest first", body = ListMeasuresRes),
        (status = 403, description = "Caller may not read this patient"),
        (status = 500, description = "Internal server error")
    )
)]
/// List every recorded day for a patient
#[axum::debug_handler]
pub async fn list_measures(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(patient_id): AxumPath<String>,
) -> Result<Json<ListMeasuresRes>, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    let patient_id = parse_patient_id(&patient_id)?;
    require_reader(&state, &user, &patient_id)?;

    match state.measures.list(&patient_id) {
        Ok(measures) => Ok(Json(ListMeasuresRes {
            measures: measures.iter().map(measure_res).collect(),
        })),
        Err(e) => Err(fail("List measures", e)),
    }
}
