//! Caregiver request and link endpoints.

use crate::handlers::{current_user, require_area};
use crate::translate::{caregiver_link_res, caregiver_request_res};
use crate::{fail, AppState};
use api_shared::dto::{
    CaregiverRequestReq, CaregiverRequestRes, ListCaregiverPatientsRes, ListCaregiverRequestsRes,
};
use axum::extract::{Path as AxumPath, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use carebook_core::Role;
use carebook_uuid::ShardableUuid;

#[utoipa::path(
    post,
    path = "/caregivers/requests",
    request_body = CaregiverRequestReq,
    responses(
        (status = 201, description = "Request created", body = CaregiverRequestRes),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Not an onboarded patient"),
        (status = 500, description = "Internal server error")
    )
)]
/// Ask a caregiver to be linked to the calling patient
#[axum::debug_handler]
pub async fn request_caregiver(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CaregiverRequestReq>,
) -> Result<(StatusCode, Json<CaregiverRequestRes>), (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    require_area(&user, Role::Patient)?;

    let caregiver_id = ShardableUuid::parse(&req.caregiver_id)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid caregiver UUID"))?;

    match state.caregivers.request_link(&user.id, &caregiver_id) {
        Ok(request) => Ok((StatusCode::CREATED, Json(caregiver_request_res(&request)))),
        Err(e) => Err(fail("Request caregiver", e)),
    }
}

#[utoipa::path(
    get,
    path = "/caregivers/requests",
    responses(
        (status = 200, description = "Requests addressed to the caller", body = ListCaregiverRequestsRes),
        (status = 403, description = "Not an onboarded caregiver"),
        (status = 500, description = "Internal server error")
    )
)]
/// List requests addressed to the calling caregiver, newest first
#[axum::debug_handler]
pub async fn list_caregiver_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ListCaregiverRequestsRes>, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    require_area(&user, Role::Caregiver)?;

    match state.caregivers.list_requests(&user.id) {
        Ok(requests) => Ok(Json(ListCaregiverRequestsRes {
            requests: requests.iter().map(caregiver_request_res).collect(),
        })),
        Err(e) => Err(fail("List caregiver requests", e)),
    }
}

#[utoipa::path(
    post,
    path = "/caregivers/requests/{patient_id}/approve",
    responses(
        (status = 200, description = "Request approved, link created", body = CaregiverRequestRes),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Not an onboarded caregiver"),
        (status = 404, description = "No request from that patient"),
        (status = 500, description = "Internal server error")
    )
)]
/// Approve a pending request, granting access to the patient's measures
#[axum::debug_handler]
pub async fn approve_caregiver_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(patient_id): AxumPath<String>,
) -> Result<Json<CaregiverRequestRes>, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    require_area(&user, Role::Caregiver)?;

    let patient_id = ShardableUuid::parse(&patient_id)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid patient UUID"))?;

    match state.caregivers.approve(&user.id, &patient_id) {
        Ok(request) => Ok(Json(caregiver_request_res(&request))),
        Err(e) => Err(fail("Approve caregiver request", e)),
    }
}

#[utoipa::path(
    post,
    path = "/caregivers/requests/{patient_id}/reject",
    responses(
        (status = 200, description = "Request rejected", body = CaregiverRequestRes),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Not an onboarded caregiver"),
        (status = 404, description = "No request from that patient"),
        (status = 500, description = "Internal server error")
    )
)]
/// Reject a pending request
#[axum::debug_handler]
pub async fn reject_caregiver_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(patient_id): AxumPath<String>,
) -> Result<Json<CaregiverRequestRes>, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    require_area(&user, Role::Caregiver)?;

    let patient_id = ShardableUuid::parse(&patient_id)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid patient UUID"))?;

    match state.caregivers.reject(&user.id, &patient_id) {
        Ok(request) => Ok(Json(caregiver_request_res(&request))),
        Err(e) => Err(fail("Reject caregiver request", e)),
    }
}

#[utoipa::path(
    get,
    path = "/caregivers/patients",
    responses(
        (status = 200, description = "Patients linked to the caller", body = ListCaregiverPatientsRes),
        (status = 403, description = "Not an onboarded caregiver"),
        (status = 500, description = "Internal server error")
    )
)]
/// List the patients linked to the calling caregiver
#[axum::debug_handler]
pub async fn list_caregiver_patients(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ListCaregiverPatientsRes>, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    require_area(&user, Role::Caregiver)?;

    match state.caregivers.list_patients(&user.id) {
        Ok(links) => Ok(Json(ListCaregiverPatientsRes {
            patients: links.iter().map(caregiver_link_res).collect(),
        })),
        Err(e) => Err(fail("List caregiver patients", e)),
    }
}
