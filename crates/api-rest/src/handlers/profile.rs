//! Profile onboarding and retrieval.

use crate::handlers::current_user;
use crate::translate::user_res;
use crate::{fail, AppState};
use api_shared::dto::{CompleteProfileReq, UserRes};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use carebook_core::Role;
use records::{CaregiverProfile, DoctorProfile, PatientProfile, ProfileSection};

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Current account with profile", body = UserRes),
        (status = 401, description = "No valid session")
    )
)]
/// Fetch the caller's account including any profile section
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserRes>, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;
    Ok(Json(user_res(&user)))
}

#[utoipa::path(
    put,
    path = "/profile",
    request_body = CompleteProfileReq,
    responses(
        (status = 200, description = "Profile saved", body = UserRes),
        (status = 400, description = "Missing or mismatched profile section"),
        (status = 401, description = "No valid session"),
        (status = 500, description = "Internal server error")
    )
)]
/// Complete (or update) the caller's role-specific profile
///
/// The request must carry exactly the section matching the caller's role;
/// saving it marks the profile complete, which unlocks the role's
/// dashboard.
#[axum::debug_handler]
pub async fn complete_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CompleteProfileReq>,
) -> Result<Json<UserRes>, (StatusCode, &'static str)> {
    let user = current_user(&state, &headers)?;

    let section = match user.role {
        Role::Patient => req.patient_profile.map(|p| {
            ProfileSection::Patient(PatientProfile {
                date_of_birth: p.date_of_birth,
                gender: p.gender,
                phone: p.phone,
                address: p.address,
            })
        }),
        Role::Doctor => req.doctor_profile.map(|d| {
            ProfileSection::Doctor(DoctorProfile {
                speciality: d.speciality,
                qualifications: d.qualifications,
                experience_years: d.experience_years,
                phone: d.phone,
            })
        }),
        Role::Caregiver => req.caregiver_profile.map(|c| {
            ProfileSection::Caregiver(CaregiverProfile {
                phone: c.phone,
                relationship: c.relationship,
            })
        }),
        Role::Admin => {
            return Err((StatusCode::BAD_REQUEST, "Admin accounts have no profile"));
        }
    };

    let Some(section) = section else {
        return Err((
            StatusCode::BAD_REQUEST,
            "Profile section does not match the account role",
        ));
    };

    match state.users.complete_profile(&user.id, section) {
        Ok(updated) => Ok(Json(user_res(&updated))),
        Err(e) => Err(fail("Complete profile", e)),
    }
}
