use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{RegisterRequest, RegisterResponse, SigninRequest, SigninResponse, UserView},
    services,
};
use crate::{error::AppError, links, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(register))
        .route("/user/signin", post(signin))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let Json(payload) = payload?;
    let user =
        services::register_user(&state, &payload.name, &payload.email, &payload.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User successfully created.",
            user: UserView {
                user,
                sign_in: links::sign_in(),
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> Result<Json<SigninResponse>, AppError> {
    let Json(payload) = payload?;
    let token = services::sign_in(&state, &payload.email, &payload.password).await?;

    Ok(Json(SigninResponse {
        message: "User signed in.",
        token,
        token_type: "Bearer",
    }))
}
