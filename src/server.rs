use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use serde::Deserialize;

use crate::config::PlanningRules;
use crate::data::{Day, Lesson, ReplacementPlan, ReplacementRequest, TeacherId};
use crate::display::write_plan_csv;
use crate::error::PlanError;
use crate::solver;
use crate::timetable::{ClassLabel, Timetable};

/// Read-only state shared by every request; each plan owns its own run state.
pub struct AppState {
    pub timetable: Timetable,
    pub rules: PlanningRules,
}

type ApiError = (StatusCode, String);

#[derive(Debug, Deserialize)]
pub struct DayFilter {
    day: Option<Day>,
}

fn plan_error(e: PlanError) -> ApiError {
    warn!("Rejected request: {}", e);
    (StatusCode::BAD_REQUEST, e.to_string())
}

async fn plan_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReplacementRequest>,
) -> Result<Json<ReplacementPlan>, ApiError> {
    solver::generate_plan(&state.timetable, &request, &state.rules)
        .map(Json)
        .map_err(plan_error)
}

async fn plan_csv_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReplacementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let plan = solver::generate_plan(&state.timetable, &request, &state.rules).map_err(plan_error)?;
    let mut body = Vec::new();
    write_plan_csv(&plan, &mut body)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body))
}

async fn teachers_handler(State(state): State<Arc<AppState>>) -> Json<Vec<TeacherId>> {
    Json(state.timetable.teachers().to_vec())
}

async fn teacher_view_handler(
    State(state): State<Arc<AppState>>,
    Path(teacher): Path<String>,
    Query(filter): Query<DayFilter>,
) -> Result<Json<Vec<Lesson>>, ApiError> {
    state
        .timetable
        .teacher_view(&teacher, filter.day)
        .map(|lessons| Json(lessons.into_iter().cloned().collect()))
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))
}

async fn class_view_handler(
    State(state): State<Arc<AppState>>,
    Path(class): Path<String>,
    Query(filter): Query<DayFilter>,
) -> Result<Json<Vec<Lesson>>, ApiError> {
    let label = ClassLabel::parse(&class);
    let lessons = state.timetable.class_view(&label, filter.day);
    if lessons.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            format!("no timetable rows for class '{}'", class),
        ));
    }
    Ok(Json(lessons.into_iter().cloned().collect()))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/replacement/plan", post(plan_handler))
        .route("/v1/replacement/plan.csv", post(plan_csv_handler))
        .route("/v1/teachers", get(teachers_handler))
        .route("/v1/timetable/teachers/:teacher", get(teacher_view_handler))
        .route("/v1/timetable/classes/:class", get(class_view_handler))
        .with_state(state)
}

pub async fn run_server(state: Arc<AppState>, bind_addr: &str) -> std::io::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
