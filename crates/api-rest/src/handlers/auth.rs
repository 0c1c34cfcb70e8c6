//! Account registration, sessions and the access-guard endpoint.

use crate::handlers::current_user;
use crate::translate::user_res;
use crate::{fail, AppState};
use api_shared::dto::{AccessRes, LoginReq, LoginRes, OkRes, RegisterReq, UserRes};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use carebook_core::guard::evaluate;
use carebook_core::{EmailAddress, NonEmptyText, Role, UserService};
use serde::Deserialize;

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Account created", body = UserRes),
        (status = 400, description = "Bad request"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
/// Register a patient, doctor or caregiver account
///
/// Doctors start unapproved and must be approved by an admin before they
/// can use the doctor dashboard. Admin accounts cannot be registered here.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterReq>,
) -> Result<(StatusCode, Json<UserRes>), (StatusCode, &'static str)> {
    let Some(role) = Role::from_wire(&req.role) else {
        return Err((StatusCode::BAD_REQUEST, "Unknown role"));
    };

    let email = EmailAddress::new(&req.email)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid email address"))?;
    let display_name = NonEmptyText::new(&req.display_name)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Display name cannot be empty"))?;

    match state.users.register(email, &req.password, display_name, role) {
        Ok(user) => Ok((StatusCode::CREATED, Json(user_res(&user)))),
        Err(e) => Err(fail("Register", e)),
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Session issued", body = LoginRes),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal server error")
    )
)]
/// Log in and obtain a session token
///
/// The returned token is sent back in the `x-session-token` header on
/// subsequent requests.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> Result<Json<LoginRes>, (StatusCode, &'static str)> {
    let email = EmailAddress::new(&req.email)
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid email or password"))?;

    match state.users.authenticate(&email, &req.password) {
        Ok(user) => {
            let token = state.sessions.issue(user.id.clone());
            Ok(Json(LoginRes {
                token,
                user: user_res(&user),
            }))
        }
        Err(e) => Err(fail("Login", e)),
    }
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session revoked", body = OkRes),
        (status = 401, description = "Missing session token")
    )
)]
/// Log out, invalidating the session token
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OkRes>, (StatusCode, &'static str)> {
    let token = api_shared::auth::session_token(&headers)?;
    let revoked = state.sessions.revoke(token);
    Ok(Json(OkRes { success: revoked }))
}

#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Current account", body = UserRes),
        (status = 401, description = "No valid session")
    )
)]
/// Return the account behind the current session
///
/// Exposes the identity facts the client routes on: role, profile
/// completion, and (for doctors) the approval flag.
#[axum::debug_handler]
pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserRes>, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    Ok(Json(user_res(&user)))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct AccessParams {
    /// Dashboard area to evaluate: `patient`, `doctor`, `caregiver` or
    /// `admin`.
    pub area: String,
}

#[utoipa::path(
    get,
    path = "/access",
    params(AccessParams),
    responses(
        (status = 200, description = "Guard decision", body = AccessRes),
        (status = 400, description = "Unknown area")
    )
)]
/// Evaluate the role-based access guard for the caller
///
/// Runs the same fixed-order checks the dashboards use: session present,
/// role matches the area, profile completed, doctor approved. The response
/// carries the redirect target instead of performing it.
#[axum::debug_handler]
pub async fn access(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AccessParams>,
) -> Result<Json<AccessRes>, (StatusCode, &'static str)> {
    let Some(area) = Role::from_wire(&params.area) else {
        return Err((StatusCode::BAD_REQUEST, "Unknown area"));
    };

    let session_user = match current_user(&state, &headers) {
        Ok(user) => Some(UserService::session_user(&user)),
        Err(_) => None,
    };

    let decision = evaluate(session_user.as_ref(), area);
    Ok(Json(AccessRes {
        authorized: decision.is_authorized(),
        redirect_to: decision.redirect_path().map(str::to_string),
    }))
}
