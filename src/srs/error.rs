use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use diesel::result::Error as DieselError;
use serde_json::json;
use thiserror::Error;

use super::session::SessionError;

/// Failures of the review subsystem. Validation problems are rejected at the
/// call boundary; persistence problems always reach the caller as a typed
/// error instead of a silently dropped review.
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("not logged in")]
    Unauthorized,
    #[error("quality grade {0} is outside 0-5")]
    InvalidQuality(i32),
    #[error("a rating or quality grade is required")]
    MissingRating,
    #[error("limit {0} is outside 1-100")]
    InvalidLimit(i64),
    #[error("answer must not be empty")]
    EmptyAnswer,
    #[error("unknown item {0}")]
    UnknownItem(i32),
    #[error("no study session in progress")]
    NoActiveSession,
    #[error(transparent)]
    BadTransition(#[from] SessionError),
    #[error("review for user {user_id} item {item_id} was modified concurrently")]
    WriteConflict { user_id: i32, item_id: i32 },
    #[error("database error")]
    Database(#[from] DieselError),
    #[error("database unavailable")]
    Unavailable(String),
    #[error("session error: {0}")]
    Session(String),
}

impl From<tower_sessions::session::Error> for ReviewError {
    fn from(err: tower_sessions::session::Error) -> Self {
        ReviewError::Session(err.to_string())
    }
}

impl IntoResponse for ReviewError {
    fn into_response(self) -> Response {
        let status = match &self {
            ReviewError::Unauthorized => StatusCode::UNAUTHORIZED,
            ReviewError::InvalidQuality(_)
            | ReviewError::MissingRating
            | ReviewError::InvalidLimit(_)
            | ReviewError::EmptyAnswer => StatusCode::BAD_REQUEST,
            ReviewError::UnknownItem(_) => StatusCode::NOT_FOUND,
            ReviewError::NoActiveSession
            | ReviewError::BadTransition(_)
            | ReviewError::WriteConflict { .. } => StatusCode::CONFLICT,
            ReviewError::Database(e) => {
                log::error!("review database error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ReviewError::Unavailable(e) => {
                log::error!("database unavailable: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ReviewError::Session(e) => {
                log::error!("session store error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = json!({
            "error": self.to_string(),
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}
