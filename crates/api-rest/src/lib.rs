//! Carebook REST API.
//!
//! Exposes the appointment system over HTTP with OpenAPI documentation:
//! accounts and sessions, the role-gated dashboards' access checks,
//! appointment lifecycle operations, attachment upload/download/removal,
//! caregiver requests and daily measures, plus the admin surface.
//!
//! The router is assembled by [`router`]; the `carebook-api-rest` binary and
//! the workspace's `carebook-run` binary both serve it.

use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::Router;
use carebook_core::{
    AppointmentService, CareError, CaregiverService, CoreConfig, MeasureService, SessionService,
    UserService,
};
use carebook_files::FilesError;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod handlers;
mod translate;

use api_shared::dto;

/// Application state shared across REST API handlers.
///
/// Every service is a thin handle over the shared [`CoreConfig`]; cloning
/// the state per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionService,
    pub users: UserService,
    pub appointments: AppointmentService,
    pub caregivers: CaregiverService,
    pub measures: MeasureService,
}

impl AppState {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self {
            sessions: SessionService::new(),
            users: UserService::new(cfg.clone()),
            appointments: AppointmentService::new(cfg.clone()),
            caregivers: CaregiverService::new(cfg.clone()),
            measures: MeasureService::new(cfg),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::session,
        handlers::auth::access,
        handlers::profile::get_profile,
        handlers::profile::complete_profile,
        handlers::appointments::create_appointment,
        handlers::appointments::list_appointments,
        handlers::appointments::get_appointment,
        handlers::appointments::approve_appointment,
        handlers::appointments::decline_appointment,
        handlers::appointments::complete_appointment,
        handlers::appointments::cancel_appointment,
        handlers::appointments::add_attachment,
        handlers::appointments::remove_attachment,
        handlers::appointments::download_attachment,
        handlers::caregivers::request_caregiver,
        handlers::caregivers::list_caregiver_requests,
        handlers::caregivers::approve_caregiver_request,
        handlers::caregivers::reject_caregiver_request,
        handlers::caregivers::list_caregiver_patients,
        handlers::measures::record_measure,
        handlers::measures::get_measure,
        handlers::measures::list_measures,
        handlers::admin::list_users,
        handlers::admin::approve_doctor,
        handlers::admin::remove_user,
    ),
    components(schemas(
        dto::HealthRes,
        dto::OkRes,
        dto::RegisterReq,
        dto::LoginReq,
        dto::LoginRes,
        dto::UserRes,
        dto::ListUsersRes,
        dto::PatientProfileDto,
        dto::DoctorProfileDto,
        dto::CaregiverProfileDto,
        dto::CompleteProfileReq,
        dto::AccessRes,
        dto::CreateAppointmentReq,
        dto::AppointmentRes,
        dto::ListAppointmentsRes,
        dto::AttachmentRes,
        dto::CompleteAppointmentReq,
        dto::AddAttachmentReq,
        dto::AddAttachmentRes,
        dto::StoredAttachmentRes,
        dto::RemoveAttachmentReq,
        dto::CaregiverRequestReq,
        dto::CaregiverRequestRes,
        dto::ListCaregiverRequestsRes,
        dto::CaregiverLinkRes,
        dto::ListCaregiverPatientsRes,
        dto::VitalsDto,
        dto::RecordMeasureReq,
        dto::MeasureRes,
        dto::ListMeasuresRes,
    ))
)]
struct ApiDoc;

/// Builds the full application router, including Swagger UI and CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/session", get(handlers::auth::session))
        .route("/access", get(handlers::auth::access))
        .route("/profile", get(handlers::profile::get_profile))
        .route("/profile", put(handlers::profile::complete_profile))
        .route(
            "/appointments",
            post(handlers::appointments::create_appointment)
                .get(handlers::appointments::list_appointments),
        )
        .route(
            "/appointments/:id",
            get(handlers::appointments::get_appointment)
                .delete(handlers::appointments::cancel_appointment),
        )
        .route(
            "/appointments/:id/approve",
            post(handlers::appointments::approve_appointment),
        )
        .route(
            "/appointments/:id/decline",
            post(handlers::appointments::decline_appointment),
        )
        .route(
            "/appointments/:id/complete",
            post(handlers::appointments::complete_appointment),
        )
        .route(
            "/appointments/:id/attachments",
            post(handlers::appointments::add_attachment)
                .delete(handlers::appointments::remove_attachment),
        )
        .route(
            "/appointments/:id/attachments/:name",
            get(handlers::appointments::download_attachment),
        )
        .route(
            "/caregivers/requests",
            post(handlers::caregivers::request_caregiver)
                .get(handlers::caregivers::list_caregiver_requests),
        )
        .route(
            "/caregivers/requests/:patient_id/approve",
            post(handlers::caregivers::approve_caregiver_request),
        )
        .route(
            "/caregivers/requests/:patient_id/reject",
            post(handlers::caregivers::reject_caregiver_request),
        )
        .route(
            "/caregivers/patients",
            get(handlers::caregivers::list_caregiver_patients),
        )
        .route(
            "/patients/:id/measures",
            get(handlers::measures::list_measures),
        )
        .route(
            "/patients/:id/measures/:date",
            put(handlers::measures::record_measure).get(handlers::measures::get_measure),
        )
        .route("/admin/users", get(handlers::admin::list_users))
        .route(
            "/admin/doctors/:id/approve",
            post(handlers::admin::approve_doctor),
        )
        .route("/admin/users/:id", delete(handlers::admin::remove_user))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the router on `addr` until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

/// Maps a core error onto an HTTP response pair.
///
/// The mapping is deliberately coarse; the precise cause is logged at the
/// call site and never leaks to the client.
pub(crate) fn error_response(err: &CareError) -> (StatusCode, &'static str) {
    match err {
        CareError::UserNotFound(_)
        | CareError::AppointmentNotFound(_)
        | CareError::RequestNotFound(_)
        | CareError::AttachmentNotFound(_)
        | CareError::Files(FilesError::NotFound(_)) => (StatusCode::NOT_FOUND, "Not found"),
        CareError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid email or password"),
        CareError::EmailAlreadyRegistered(_) => (StatusCode::CONFLICT, "Email already registered"),
        CareError::InvalidStatusTransition { .. }
        | CareError::NotCancellable
        | CareError::AttachmentsNotAllowed(_) => {
            (StatusCode::CONFLICT, "Conflicting appointment state")
        }
        CareError::NotAuthorised(_) => (StatusCode::FORBIDDEN, "Forbidden"),
        CareError::InvalidInput(_)
        | CareError::Records(_)
        | CareError::Uuid(_)
        | CareError::Text(_)
        | CareError::Files(FilesError::InvalidPath(_))
        | CareError::Files(FilesError::InvalidFileName(_)) => {
            (StatusCode::BAD_REQUEST, "Invalid request")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
    }
}

/// Logs a failed operation and converts it for the response.
pub(crate) fn fail(operation: &str, err: CareError) -> (StatusCode, &'static str) {
    tracing::error!("{operation} error: {err:?}");
    error_response(&err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestApp {
        _temp: TempDir,
        state: AppState,
        app: Router,
    }

    fn test_app() -> TestApp {
        let temp = TempDir::new().unwrap();
        let cfg = Arc::new(CoreConfig::new(temp.path().to_path_buf()).unwrap());
        let state = AppState::new(cfg);
        let app = router(state.clone());
        TestApp {
            _temp: temp,
            state,
            app,
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.expect("request");
        let status = response.status();
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header("x-session-token", token);
        }
        builder.body(Body::from(body.to_string())).expect("request")
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("x-session-token", token);
        }
        builder.body(Body::empty()).expect("request")
    }

    /// Registers an account via the API and returns (id, token).
    async fn register_and_login(app: &Router, email: &str, role: &str) -> (String, String) {
        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/auth/register",
                None,
                json!({
                    "email": email,
                    "password": "pw-123456",
                    "display_name": "Test User",
                    "role": role,
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let id = body["id"].as_str().expect("user id").to_string();

        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/auth/login",
                None,
                json!({"email": email, "password": "pw-123456"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        let token = body["token"].as_str().expect("token").to_string();

        (id, token)
    }

    #[tokio::test]
    async fn health_is_open() {
        let t = test_app();
        let (status, body) = send(&t.app, get_request("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(true));
    }

    #[tokio::test]
    async fn register_login_session_flow() {
        let t = test_app();
        let (id, token) = register_and_login(&t.app, "flow@example.com", "patient").await;

        let (status, body) = send(&t.app, get_request("/auth/session", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], json!(id));
        assert_eq!(body["role"], json!("patient"));
        assert_eq!(body["profile_completed"], json!(false));

        // No token, bad token
        let (status, _) = send(&t.app, get_request("/auth/session", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) =
            send(&t.app, get_request("/auth/session", Some("not-a-token"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Logout invalidates the token
        let (status, _) = send(
            &t.app,
            json_request("POST", "/auth/logout", Some(&token), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&t.app, get_request("/auth/session", Some(&token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorised() {
        let t = test_app();
        register_and_login(&t.app, "pw@example.com", "patient").await;

        let (status, _) = send(
            &t.app,
            json_request(
                "POST",
                "/auth/login",
                None,
                json!({"email": "pw@example.com", "password": "wrong"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn access_endpoint_reports_guard_decisions() {
        let t = test_app();
        let (_, token) = register_and_login(&t.app, "guard@example.com", "doctor").await;

        // Doctor without a completed profile: profile setup comes first
        let (status, body) = send(&t.app, get_request("/access?area=doctor", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["authorized"], json!(false));
        assert_eq!(body["redirect_to"], json!("/setup-profile"));

        // Complete the profile; approval is still missing
        let (status, _) = send(
            &t.app,
            json_request(
                "PUT",
                "/profile",
                Some(&token),
                json!({"doctor_profile": {
                    "speciality": "cardiology",
                    "qualifications": "MB BCh",
                    "experience_years": 9,
                    "phone": "+353 86 000 1111",
                }}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&t.app, get_request("/access?area=doctor", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["authorized"], json!(false));
        assert_eq!(body["redirect_to"], json!("/doctor/awaiting-approval"));

        // Unauthenticated: to login
        let (status, body) = send(&t.app, get_request("/access?area=doctor", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["redirect_to"], json!("/login"));
    }

    #[tokio::test]
    async fn unapproved_doctor_cannot_list_appointments() {
        let t = test_app();
        let (_, token) = register_and_login(&t.app, "doc@example.com", "doctor").await;

        let (status, _) = send(
            &t.app,
            json_request(
                "PUT",
                "/profile",
                Some(&token),
                json!({"doctor_profile": {
                    "speciality": "gp",
                    "qualifications": "MB",
                    "experience_years": 3,
                    "phone": "1",
                }}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&t.app, get_request("/appointments", Some(&token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    /// The full scenario: request -> approve -> complete with notes and one
    /// attachment.
    #[tokio::test]
    async fn appointment_lifecycle_over_rest() {
        let t = test_app();

        let (patient_id, patient_token) =
            register_and_login(&t.app, "pat@example.com", "patient").await;
        let (doctor_id, doctor_token) =
            register_and_login(&t.app, "doc@example.com", "doctor").await;

        // Onboarding via core services; approval via the admin path
        let patient_uuid = carebook_uuid::ShardableUuid::parse(&patient_id).unwrap();
        let doctor_uuid = carebook_uuid::ShardableUuid::parse(&doctor_id).unwrap();
        t.state
            .users
            .complete_profile(
                &patient_uuid,
                records::ProfileSection::Patient(records::PatientProfile {
                    date_of_birth: "1985-06-14".into(),
                    gender: "female".into(),
                    phone: "1".into(),
                    address: "a".into(),
                }),
            )
            .unwrap();
        t.state
            .users
            .complete_profile(
                &doctor_uuid,
                records::ProfileSection::Doctor(records::DoctorProfile {
                    speciality: "gp".into(),
                    qualifications: "MB".into(),
                    experience_years: 3,
                    phone: "1".into(),
                }),
            )
            .unwrap();
        t.state.users.approve_doctor(&doctor_uuid).unwrap();

        // Patient requests
        let (status, body) = send(
            &t.app,
            json_request(
                "POST",
                "/appointments",
                Some(&patient_token),
                json!({
                    "doctor_id": doctor_id,
                    "scheduled_at": "2026-09-01T09:30:00Z",
                    "reason": "Persistent headaches",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        assert_eq!(body["status"], json!("pending"));
        let appointment_id = body["id"].as_str().unwrap().to_string();

        // Doctor approves
        let (status, body) = send(
            &t.app,
            json_request(
                "POST",
                &format!("/appointments/{appointment_id}/approve"),
                Some(&doctor_token),
                json!({}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "approve failed: {body}");
        assert_eq!(body["status"], json!("approved"));

        // Second approval is a conflict
        let (status, _) = send(
            &t.app,
            json_request(
                "POST",
                &format!("/appointments/{appointment_id}/approve"),
                Some(&doctor_token),
                json!({}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        // Doctor uploads one file
        let (status, body) = send(
            &t.app,
            json_request(
                "POST",
                &format!("/appointments/{appointment_id}/attachments"),
                Some(&doctor_token),
                json!({
                    "file_name": "scan.pdf",
                    "content_base64": "JVBERi0xLjc=",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "attach failed: {body}");
        let stored_name = body["attachment"]["stored_name"].as_str().unwrap().to_string();

        // Empty notes are rejected and nothing persists
        let (status, _) = send(
            &t.app,
            json_request(
                "POST",
                &format!("/appointments/{appointment_id}/complete"),
                Some(&doctor_token),
                json!({"notes": "  "}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (_, body) = send(
            &t.app,
            get_request(&format!("/appointments/{appointment_id}"), Some(&doctor_token)),
        )
        .await;
        assert_eq!(body["status"], json!("approved"));

        // Complete with notes
        let (status, body) = send(
            &t.app,
            json_request(
                "POST",
                &format!("/appointments/{appointment_id}/complete"),
                Some(&doctor_token),
                json!({"notes": "N/A"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "complete failed: {body}");
        assert_eq!(body["status"], json!("completed"));
        assert_eq!(body["notes"], json!("N/A"));
        assert_eq!(body["attachments"].as_array().unwrap().len(), 1);

        // Patient sees the completed appointment and downloads the file
        let (status, body) = send(&t.app, get_request("/appointments", Some(&patient_token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["appointments"].as_array().unwrap().len(), 1);

        let download = get_request(
            &format!("/appointments/{appointment_id}/attachments/{stored_name}"),
            Some(&patient_token),
        );
        let response = t.app.clone().oneshot(download).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"%PDF-1.7");
    }

    #[tokio::test]
    async fn patient_cancels_only_pending() {
        let t = test_app();

        let (patient_id, patient_token) =
            register_and_login(&t.app, "pat2@example.com", "patient").await;
        let (doctor_id, _) = register_and_login(&t.app, "doc2@example.com", "doctor").await;

        let patient_uuid = carebook_uuid::ShardableUuid::parse(&patient_id).unwrap();
        let doctor_uuid = carebook_uuid::ShardableUuid::parse(&doctor_id).unwrap();
        t.state
            .users
            .complete_profile(
                &patient_uuid,
                records::ProfileSection::Patient(records::PatientProfile {
                    date_of_birth: "1990-01-01".into(),
                    gender: "male".into(),
                    phone: "1".into(),
                    address: "a".into(),
                }),
            )
            .unwrap();
        t.state.users.approve_doctor(&doctor_uuid).unwrap();

        let (_, body) = send(
            &t.app,
            json_request(
                "POST",
                "/appointments",
                Some(&patient_token),
                json!({
                    "doctor_id": doctor_id,
                    "scheduled_at": "2026-09-01T09:30:00Z",
                    "reason": "X",
                }),
            ),
        )
        .await;
        let appointment_id = body["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &t.app,
            json_request(
                "DELETE",
                &format!("/appointments/{appointment_id}"),
                Some(&patient_token),
                json!({}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &t.app,
            get_request(&format!("/appointments/{appointment_id}"), Some(&patient_token)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
