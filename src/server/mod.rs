use crate::data::configuration::Configuration;
use crate::data::dbconnector::SQLConnector;
use crate::entity::helpers::{self, DinnerChanges, NewDinner, NewPerson, PersonChanges};
use crate::entity::{dinners, people};
use crate::error::RotationError;
use crate::rotation::{self, overview, rules};
pub mod types;
use anyhow::Context;
use axum::extract::Path;
use axum::extract::rejection::FormRejection;
use axum::response::Redirect;
use axum::routing::patch;
use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use log::{debug, info, warn};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use types::{
    AssignForm, AttendanceResponse, CreateDinnerRequest, CreatePersonRequest, CreatedResponse,
    DeadlineResponse, HostRankingResponse, RecordAttendanceRequest, UpdateDinnerRequest,
    UpdatePersonRequest,
};

type HandlerError = (StatusCode, String);

#[derive(Clone)]
pub struct ServerConfig {
    pub database_connection: Arc<SQLConnector>,
    pub history_limit: u64,
}

impl ServerConfig {
    fn db(&self) -> Result<&DatabaseConnection, HandlerError> {
        self.database_connection
            .connection()
            .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
    }
}

pub fn router(state: ServerConfig) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/dashboard", get(dashboard))
        .route("/assign", post(assign_next_host))
        .route("/people", get(list_people).post(create_person))
        .route("/people/{id}", patch(update_person).delete(delete_person))
        .route("/dinners", get(list_dinners).post(create_dinner))
        .route("/dinners/{id}", patch(update_dinner).delete(delete_dinner))
        .route(
            "/dinners/{id}/attendance",
            get(list_attendance).post(record_attendance),
        )
        .route("/rotation/next", get(next_host))
        .route("/rotation/deadline", get(deadline))
        .with_state(state)
}

pub async fn run(
    config: Configuration,
    database_connection: SQLConnector,
    port: u16,
) -> anyhow::Result<()> {
    debug!("Starting server on port {}", port);

    let state = ServerConfig {
        database_connection: Arc::new(database_connection),
        history_limit: config.rotation.history_limit,
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .await
        .context("server stopped unexpectedly")?;
    Ok(())
}

/// The one place the HTTP surface reads the clock.
fn today() -> NaiveDate {
    rotation::current_day()
}

fn reject(e: RotationError) -> HandlerError {
    let status = match &e {
        RotationError::PersonNotFound { .. } | RotationError::DinnerNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        RotationError::HostInUse { .. }
        | RotationError::DuplicateAttendance { .. }
        | RotationError::PlaceholderExists => StatusCode::CONFLICT,
        RotationError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RotationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!("Request failed: {e}");
    }
    (status, e.to_string())
}

async fn home(
    State(state): State<ServerConfig>,
) -> Result<Json<rotation::HomeOverview>, HandlerError> {
    let overview = rotation::home_overview(state.db()?, today())
        .await
        .map_err(reject)?;
    Ok(Json(overview))
}

async fn dashboard(
    State(state): State<ServerConfig>,
) -> Result<Json<rotation::DashboardOverview>, HandlerError> {
    let overview = rotation::dashboard_overview(state.db()?, today(), state.history_limit)
        .await
        .map_err(reject)?;
    Ok(Json(overview))
}

async fn assign_next_host(
    State(state): State<ServerConfig>,
    form: Result<Form<AssignForm>, FormRejection>,
) -> Result<Redirect, HandlerError> {
    let person_id = form.ok().and_then(|Form(form)| form.person_id);
    let outcome = rotation::assign_next_host(state.db()?, person_id.as_deref())
        .await
        .map_err(reject)?;
    Ok(Redirect::to(outcome.destination().path()))
}

async fn list_people(
    State(state): State<ServerConfig>,
) -> Result<Json<Vec<people::Model>>, HandlerError> {
    let people = helpers::list_people(state.db()?).await.map_err(reject)?;
    Ok(Json(people))
}

async fn create_person(
    State(state): State<ServerConfig>,
    Json(payload): Json<CreatePersonRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), HandlerError> {
    let person = helpers::create_person(
        state.db()?,
        NewPerson {
            name: payload.name,
            nickname: payload.nickname,
            birthday: payload.birthday,
            reliability: payload.reliability.unwrap_or(1.0),
        },
    )
    .await
    .map_err(reject)?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id: person.id })))
}

async fn update_person(
    State(state): State<ServerConfig>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePersonRequest>,
) -> Result<Json<people::Model>, HandlerError> {
    let changes = PersonChanges {
        name: payload.name,
        nickname: payload.nickname,
        birthday: payload.birthday,
        reliability: payload.reliability,
        is_active: payload.is_active,
    };
    let person = helpers::update_person(state.db()?, id, changes)
        .await
        .map_err(reject)?;
    Ok(Json(person))
}

async fn delete_person(
    State(state): State<ServerConfig>,
    Path(id): Path<i32>,
) -> Result<StatusCode, HandlerError> {
    helpers::delete_person(state.db()?, id)
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_dinners(
    State(state): State<ServerConfig>,
) -> Result<Json<Vec<dinners::Model>>, HandlerError> {
    let dinners = helpers::list_dinners(state.db()?).await.map_err(reject)?;
    Ok(Json(dinners))
}

async fn create_dinner(
    State(state): State<ServerConfig>,
    Json(payload): Json<CreateDinnerRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), HandlerError> {
    let dinner = helpers::create_dinner(
        state.db()?,
        NewDinner {
            date: payload.date,
            restaurant: payload.restaurant,
            host_id: payload.host_id,
        },
    )
    .await
    .map_err(reject)?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id: dinner.id })))
}

async fn update_dinner(
    State(state): State<ServerConfig>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateDinnerRequest>,
) -> Result<Json<dinners::Model>, HandlerError> {
    let changes = DinnerChanges {
        date: payload.date,
        restaurant: payload.restaurant,
        host_id: payload.host_id,
    };
    let dinner = helpers::update_dinner(state.db()?, id, changes)
        .await
        .map_err(reject)?;
    Ok(Json(dinner))
}

async fn delete_dinner(
    State(state): State<ServerConfig>,
    Path(id): Path<i32>,
) -> Result<StatusCode, HandlerError> {
    helpers::delete_dinner(state.db()?, id)
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_attendance(
    State(state): State<ServerConfig>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<AttendanceResponse>>, HandlerError> {
    let db = state.db()?;
    if helpers::get_dinner(db, id).await.map_err(reject)?.is_none() {
        return Err(reject(RotationError::DinnerNotFound { id }));
    }
    let records = helpers::attendance_for_dinner(db, id)
        .await
        .map_err(reject)?
        .into_iter()
        .map(|(record, person)| AttendanceResponse {
            id: record.id,
            person_id: person.id,
            name: person.name,
            status: record.status,
        })
        .collect();
    Ok(Json(records))
}

async fn record_attendance(
    State(state): State<ServerConfig>,
    Path(id): Path<i32>,
    Json(payload): Json<RecordAttendanceRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), HandlerError> {
    let record = helpers::record_attendance(state.db()?, id, payload.person_id, payload.status)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: record.id })))
}

async fn next_host(
    State(state): State<ServerConfig>,
) -> Result<Json<HostRankingResponse>, HandlerError> {
    let ranking = overview::load_host_ranking(state.db()?, today())
        .await
        .map_err(reject)?;
    Ok(Json(HostRankingResponse {
        recommended: rules::pick_next_host(&ranking).cloned(),
        ranking,
    }))
}

async fn deadline(
    State(state): State<ServerConfig>,
) -> Result<Json<DeadlineResponse>, HandlerError> {
    let db = state.db()?;
    let today = today();
    let cycle = overview::load_cycle_countdown(db, today)
        .await
        .map_err(reject)?;
    let placeholder = overview::load_placeholder_countdown(db, today)
        .await
        .map_err(reject)?;
    Ok(Json(DeadlineResponse { cycle, placeholder }))
}
