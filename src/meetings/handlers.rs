use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{
        DeletedMeetingResponse, MeetingDetails, MeetingDetailsResponse, MeetingListResponse,
        MeetingRequest, MeetingResponse, MeetingView,
    },
    services,
};
use crate::{auth::extractors::AuthUser, error::AppError, links, state::AppState};

pub fn meeting_routes() -> Router<AppState> {
    Router::new()
        .route("/meeting", get(list_meetings).post(create_meeting))
        .route(
            "/meeting/:id",
            get(get_meeting)
                .put(update_meeting)
                .patch(update_meeting)
                .delete(delete_meeting),
        )
}

#[instrument(skip(state))]
pub async fn list_meetings(
    State(state): State<AppState>,
) -> Result<Json<MeetingListResponse>, AppError> {
    let meetings = services::list_meetings(&state).await?;
    Ok(Json(MeetingListResponse {
        message: "List of all meetings",
        meetings: meetings.into_iter().map(MeetingView::from).collect(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_meeting(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<MeetingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MeetingResponse>), AppError> {
    let Json(payload) = payload?;
    let meeting = services::create_meeting(&state, user_id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MeetingResponse {
            message: "Meeting successfully created",
            meeting: meeting.into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_meeting(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MeetingDetailsResponse>, AppError> {
    let Path(id) = id?;
    let (meeting, users) = services::get_meeting(&state, id).await?;
    Ok(Json(MeetingDetailsResponse {
        message: "Meeting information",
        meeting: MeetingDetails {
            meeting,
            users,
            view_meetings: links::view_meetings(),
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_meeting(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<MeetingRequest>, JsonRejection>,
) -> Result<Json<MeetingResponse>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let meeting = services::update_meeting(&state, id, user_id, &payload).await?;
    Ok(Json(MeetingResponse {
        message: "Meeting successfully updated",
        meeting: meeting.into(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_meeting(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<DeletedMeetingResponse>, AppError> {
    let Path(id) = id?;
    let meeting = services::delete_meeting(&state, id, user_id).await?;
    Ok(Json(DeletedMeetingResponse {
        message: "Meeting deleted",
        meeting,
        create_meeting: links::create_meeting(),
    }))
}
