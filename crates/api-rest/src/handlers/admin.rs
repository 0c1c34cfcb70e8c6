//! Admin surface: account listing, doctor approval, account removal.

use crate::handlers::{current_user, require_area};
use crate::translate::user_res;
use crate::{fail, AppState};
use api_shared::dto::{ListUsersRes, OkRes, UserRes};
use axum::extract::{Path as AxumPath, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use carebook_core::Role;
use carebook_uuid::ShardableUuid;
use serde::Deserialize;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListUsersParams {
    /// Restrict to one role (`patient`, `doctor`, `caregiver`, `admin`).
    #[serde(default)]
    pub role: Option<String>,
}

#[utoipa::path(
    get,
    path = "/admin/users",
    params(ListUsersParams),
    responses(
        (status = 200, description = "Accounts, oldest first", body = ListUsersRes),
        (status = 400, description = "Unknown role filter"),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Internal server error")
    )
)]
/// List accounts, optionally filtered by role
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<ListUsersRes>, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    require_area(&user, Role::Admin)?;

    let role = match params.role.as_deref() {
        None => None,
        Some(raw) => match Role::from_wire(raw) {
            Some(role) => Some(role),
            None => return Err((StatusCode::BAD_REQUEST, "Unknown role filter")),
        },
    };

    match state.users.list(role) {
        Ok(users) => Ok(Json(ListUsersRes {
            users: users.iter().map(user_res).collect(),
        })),
        Err(e) => Err(fail("List users", e)),
    }
}

#[utoipa::path(
    post,
    path = "/admin/doctors/{id}/approve",
    responses(
        (status = 200, description = "Doctor approved", body = UserRes),
        (status = 400, description = "Not a doctor account"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "No such account"),
        (status = 500, description = "Internal server error")
    )
)]
/// Approve a doctor, unlocking the doctor dashboard for them
#[axum::debug_handler]
pub async fn approve_doctor(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<UserRes>, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    require_area(&user, Role::Admin)?;

    let id = ShardableUuid::parse(&id)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid user UUID"))?;

    match state.users.approve_doctor(&id) {
        Ok(doctor) => Ok(Json(user_res(&doctor))),
        Err(e) => Err(fail("Approve doctor", e)),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    responses(
        (status = 200, description = "Account removed", body = OkRes),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "No such account"),
        (status = 500, description = "Internal server error")
    )
)]
/// Remove an account and its stored documents
#[axum::debug_handler]
pub async fn remove_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<OkRes>, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    require_area(&user, Role::Admin)?;

    let id = ShardableUuid::parse(&id)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid user UUID"))?;

    if id == user.id {
        return Err((StatusCode::BAD_REQUEST, "An admin cannot remove itself"));
    }

    match state.users.remove(&id) {
        Ok(()) => Ok(Json(OkRes { success: true })),
        Err(e) => Err(fail("Remove user", e)),
    }
}
