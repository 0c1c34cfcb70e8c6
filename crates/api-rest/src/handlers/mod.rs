//! Request handlers, grouped by surface.

pub mod admin;
pub mod appointments;
pub mod auth;
pub mod caregivers;
pub mod measures;
pub mod profile;

use crate::{fail, AppState};
use api_shared::dto::{self, HealthRes};
use api_shared::HealthService;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use carebook_core::guard::{evaluate, AccessDecision};
use carebook_core::{CareError, Role, UserService};
use records::UserData;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks; requires no
/// session.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<dto::HealthRes> {
    Json(HealthService::check_health())
}

/// Resolves the caller's account from the session token header.
///
/// Any failure along the way (missing header, unknown token, account since
/// removed) collapses to `401 Unauthorized`.
pub(crate) fn current_user(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<UserData, (StatusCode, &'static str)> {
    let token = api_shared::auth::session_token(headers)?;

    let user_id = state
        .sessions
        .resolve(token)
        .ok_or((StatusCode::UNAUTHORIZED, "Invalid or expired session"))?;

    match state.users.get(&user_id) {
        Ok(user) => Ok(user),
        Err(CareError::UserNotFound(_)) => {
            Err((StatusCode::UNAUTHORIZED, "Invalid or expired session"))
        }
        Err(e) => Err(fail("Resolve session user", e)),
    }
}

/// Requires the caller to be authorised for a role's dashboard area.
///
/// Mirrors the page-level guard: the failure message names the redirect the
/// UI would perform, but over the API it is a hard `403`.
pub(crate) fn require_area(
    user: &UserData,
    area: Role,
) -> Result<(), (StatusCode, &'static str)> {
    match evaluate(Some(&UserService::session_user(user)), area) {
        AccessDecision::Authorized => Ok(()),
        AccessDecision::ToProfileSetup => Err((StatusCode::FORBIDDEN, "Profile setup required")),
        AccessDecision::ToAwaitingApproval => {
            Err((StatusCode::FORBIDDEN, "Awaiting admin approval"))
        }
        AccessDecision::ToLogin | AccessDecision::ToOwnDashboard(_) => {
            Err((StatusCode::FORBIDDEN, "Forbidden"))
        }
    }
}
