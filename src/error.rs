use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

/// A single failed field rule, e.g. `email` / "The email must be a valid email address."
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    Conflict(String),
    /// Missing, invalid or unresolvable caller identity.
    #[error("{0}")]
    Auth(String),
    /// Known caller, but not registered for the meeting being touched.
    #[error("{0}")]
    Authorization(String),
    #[error("{0}")]
    NotFound(String),
    #[error("token issuance failed: {0}")]
    TokenIssuance(String),
    /// Bearer token could not be checked because the signing backend is down.
    #[error("token verification unavailable: {0}")]
    TokenUnavailable(String),
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: bool,
    error_message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldError>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Auth(_) | AppError::Authorization(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TokenIssuance(_) | AppError::TokenUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn user_not_found() -> Self {
        AppError::Auth("User not found".into())
    }

    pub fn meeting_not_found() -> Self {
        AppError::NotFound("Meeting not found".into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_message, fields) = match self {
            AppError::Validation(fields) => {
                let message = fields
                    .iter()
                    .map(|f| f.message.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                (message, fields)
            }
            AppError::Persistence(e) => {
                error!(error = %e, "persistence failure");
                ("Failed to access the database.".to_string(), Vec::new())
            }
            AppError::TokenIssuance(e) => {
                error!(error = %e, "token issuance failure");
                ("Could not create token.".to_string(), Vec::new())
            }
            AppError::TokenUnavailable(e) => {
                error!(error = %e, "token verification failure");
                ("Could not verify token.".to_string(), Vec::new())
            }
            other => (other.to_string(), Vec::new()),
        };
        if status.is_client_error() {
            debug!(%status, %error_message, "request rejected");
        }
        let body = ErrorBody {
            error: true,
            error_message,
            fields,
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![FieldError {
            field: "body",
            message: rejection.body_text(),
        }])
    }
}

/// Path ids that do not parse cannot name an existing resource.
impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::NotFound("Resource not found".into())
    }
}
