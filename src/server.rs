use axum::async_trait;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::{self, Action, Credentials, Role};
use crate::config::Config;
use crate::data::{GeneratedSchedule, SubjectCatalog};
use crate::error::{AuthError, ExportError};
use crate::{export, render, solver};

pub const USERNAME_HEADER: &str = "x-timetable-username";
pub const PASSWORD_HEADER: &str = "x-timetable-password";
pub const ROLE_HEADER: &str = "x-timetable-role";

/// Shared between handlers; holds the most recent generation.
#[derive(Debug, Clone)]
pub struct AppState {
    output_dir: Arc<PathBuf>,
    latest: Arc<RwLock<Option<GeneratedSchedule>>>,
}

impl AppState {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir: Arc::new(output_dir),
            latest: Arc::new(RwLock::new(None)),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, error) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
        };
        (status, Json(ErrorBody { error, code })).into_response()
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ExportError::InvalidName(_) => ApiError::BadRequest(err.to_string()),
            ExportError::Pdf { .. } | ExportError::Io { .. } => {
                error!("{}", err);
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Forbidden { .. } => ApiError::Forbidden(err.to_string()),
            AuthError::InvalidCredentials | AuthError::UnknownRole(_) => {
                ApiError::Unauthorized(err.to_string())
            }
        }
    }
}

/// Role of the caller, checked against the fixed credentials on every request.
#[derive(Debug, Clone, Copy)]
struct Caller(Role);

impl Caller {
    fn require(self, action: Action) -> Result<(), ApiError> {
        Ok(self.0.require(action)?)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let (Some(username), Some(password)) = (header(USERNAME_HEADER), header(PASSWORD_HEADER))
        else {
            return Err(ApiError::Unauthorized("missing credentials".to_string()));
        };
        let role = match header(ROLE_HEADER) {
            Some(role) => role.parse::<Role>()?,
            None => Role::Admin,
        };
        let role = auth::authenticate(&Credentials {
            username,
            password,
            role,
        })?;
        Ok(Caller(role))
    }
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    role: Role,
    actions: &'static [Action],
}

#[derive(Debug, Serialize)]
struct ExportResponse {
    path: String,
}

// std::fs work runs off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ExportError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("export task failed: {e}")))?
        .map_err(ApiError::from)
}

async fn login_handler(Json(credentials): Json<Credentials>) -> Result<Json<LoginResponse>, ApiError> {
    let role = auth::authenticate(&credentials)?;
    info!("{} logged in", role.as_str());
    Ok(Json(LoginResponse {
        role,
        actions: role.dashboard(),
    }))
}

async fn generate_handler(
    caller: Caller,
    State(state): State<AppState>,
    Json(catalog): Json<SubjectCatalog>,
) -> Result<Json<GeneratedSchedule>, ApiError> {
    caller.require(Action::GenerateTimetable)?;

    // held until the schedule is stored so the file and state always agree
    let mut latest = state.latest.write().await;
    let schedule = solver::generate_random(&catalog);
    let text = render::render_timetable(&schedule);
    let dir = Arc::clone(&state.output_dir);
    run_blocking(move || export::save_timetable(&dir, &text)).await?;
    *latest = Some(schedule.clone());
    Ok(Json(schedule))
}

async fn timetable_handler(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<GeneratedSchedule>, ApiError> {
    caller.require(Action::ViewTimetable)?;
    state
        .latest
        .read()
        .await
        .clone()
        .map(Json)
        .ok_or_else(not_generated)
}

async fn timetable_text_handler(caller: Caller, State(state): State<AppState>) -> Result<String, ApiError> {
    caller.require(Action::ViewTimetableFile)?;
    let dir = Arc::clone(&state.output_dir);
    run_blocking(move || export::load_timetable(&dir)).await
}

async fn timetable_pdf_handler(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<ExportResponse>, ApiError> {
    caller.require(Action::DownloadTimetable)?;
    let dir = Arc::clone(&state.output_dir);
    let path = run_blocking(move || export::save_timetable_pdf(&dir)).await?;
    Ok(Json(ExportResponse {
        path: path.display().to_string(),
    }))
}

async fn teacher_schedule_handler(
    caller: Caller,
    State(state): State<AppState>,
    Path(teacher): Path<String>,
) -> Result<String, ApiError> {
    caller.require(Action::ViewTeacherSchedule)?;
    let latest = state.latest.read().await;
    let schedule = latest.as_ref().ok_or_else(not_generated)?;
    if schedule.teacher_schedule(&teacher).is_none() {
        return Err(ApiError::NotFound(format!("no schedule found for '{teacher}'")));
    }
    Ok(render::render_teacher_schedule(schedule, &teacher))
}

async fn export_teacher_handler(
    caller: Caller,
    State(state): State<AppState>,
    Path(teacher): Path<String>,
) -> Result<Json<ExportResponse>, ApiError> {
    caller.require(Action::ExportTeacherSchedule)?;
    let text = {
        let latest = state.latest.read().await;
        let schedule = latest.as_ref().ok_or_else(not_generated)?;
        render::render_teacher_schedule(schedule, &teacher)
    };
    let dir = Arc::clone(&state.output_dir);
    let path = run_blocking(move || export::save_teacher_schedule(&dir, &teacher, &text)).await?;
    Ok(Json(ExportResponse {
        path: path.display().to_string(),
    }))
}

async fn teacher_file_handler(
    caller: Caller,
    State(state): State<AppState>,
    Path(teacher): Path<String>,
) -> Result<String, ApiError> {
    caller.require(Action::ViewTeacherScheduleFile)?;
    let dir = Arc::clone(&state.output_dir);
    run_blocking(move || export::load_teacher_schedule(&dir, &teacher)).await
}

async fn all_teachers_handler(caller: Caller, State(state): State<AppState>) -> Result<String, ApiError> {
    caller.require(Action::ViewTeacherSchedule)?;
    let latest = state.latest.read().await;
    let schedule = latest.as_ref().ok_or_else(not_generated)?;
    Ok(render::render_all_teacher_schedules(schedule))
}

fn not_generated() -> ApiError {
    ApiError::NotFound("no timetable has been generated yet".to_string())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/login", post(login_handler))
        .route("/v1/timetable/generate", post(generate_handler))
        .route("/v1/timetable", get(timetable_handler))
        .route("/v1/timetable/text", get(timetable_text_handler))
        .route("/v1/timetable/pdf", post(timetable_pdf_handler))
        .route("/v1/teachers/schedules", get(all_teachers_handler))
        .route("/v1/teachers/:name/schedule", get(teacher_schedule_handler))
        .route("/v1/teachers/:name/schedule/export", post(export_teacher_handler))
        .route("/v1/teachers/:name/schedule/file", get(teacher_file_handler))
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let app = router(AppState::new(config.output_dir.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    info!(
        "Server running at http://{}, writing exports to {}",
        listener.local_addr()?,
        config.output_dir.display()
    );

    axum::serve(listener, app).await
}
