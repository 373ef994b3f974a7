use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{RegistrationRequest, RegistrationResponse, UnregisterAllResponse, UnregisterResponse},
    services::{self, RegistrationOutcome},
};
use crate::{auth::extractors::AuthUser, error::AppError, links, state::AppState};

pub fn registration_routes() -> Router<AppState> {
    Router::new()
        .route("/meeting/registration", post(register))
        .route("/meeting/registration/:id", delete(unregister_self))
        .route("/meeting/registration/:id/all", delete(unregister_all))
}

/// 201 for a new registration, 409 with the same body shape when the pair exists.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegistrationResponse>), AppError> {
    let Json(payload) = payload?;
    let reg = services::register(&state, payload.meeting_id, payload.user_id).await?;

    let (status, message) = match reg.outcome {
        RegistrationOutcome::Registered => (
            StatusCode::CREATED,
            "User successfully registered for meeting",
        ),
        RegistrationOutcome::AlreadyRegistered => (
            StatusCode::CONFLICT,
            "User is already registered for the meeting",
        ),
    };
    let unregister = links::unregister(reg.meeting.id);
    Ok((
        status,
        Json(RegistrationResponse {
            message,
            meeting: reg.meeting,
            user: reg.user,
            unregister,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn unregister_self(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<UnregisterResponse>, AppError> {
    let Path(id) = id?;
    let (meeting, user) = services::unregister_self(&state, id, user_id).await?;
    Ok(Json(UnregisterResponse {
        message: "User successfully unregistered for meeting",
        meeting,
        user,
        register: links::register(),
    }))
}

#[instrument(skip(state))]
pub async fn unregister_all(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<UnregisterAllResponse>, AppError> {
    let Path(id) = id?;
    let (meeting, removed) = services::unregister_all(&state, id, user_id).await?;
    Ok(Json(UnregisterAllResponse {
        message: "All users unregistered for meeting",
        meeting,
        removed,
        register: links::register(),
    }))
}
