//! Error responses for the HTTP API: a single JSON shape plus status-code
//! mappings for every error the handlers can surface.

use bluffpoker_engine::errors::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

use crate::session::SessionError;
use crate::users::UserError;

/// Standard error response format for all API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "session_not_found")
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn into_response(self, status: StatusCode) -> Response {
        reply::with_status(reply::json(&self), status).into_response()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Conversion from domain errors to HTTP responses with proper logging.
pub trait IntoErrorResponse {
    fn status_code(&self) -> StatusCode;

    fn error_code(&self) -> &'static str;

    fn error_message(&self) -> String;

    fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.error_code(), self.error_message())
    }

    fn into_http_response(self) -> Response
    where
        Self: Sized,
    {
        let status = self.status_code();
        let error_response = self.to_error_response();

        if status.is_server_error() {
            tracing::error!(error = %error_response, "server error");
        } else {
            tracing::info!(error = %error_response, "client error");
        }

        error_response.into_response(status)
    }
}

impl IntoErrorResponse for SessionError {
    fn status_code(&self) -> StatusCode {
        match self {
            SessionError::NotFound(_) => StatusCode::NOT_FOUND,
            SessionError::Expired(_) => StatusCode::GONE,
            SessionError::StoragePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
            SessionError::Hand(_) => StatusCode::BAD_REQUEST,
            SessionError::Rule(game) => match game {
                GameError::RoomFull | GameError::GameInProgress | GameError::NotEnoughPlayers => {
                    StatusCode::CONFLICT
                }
                GameError::UnknownPlayer(_) => StatusCode::NOT_FOUND,
                GameError::DeckExhausted => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::CONFLICT,
            },
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SessionError::NotFound(_) => "session_not_found",
            SessionError::Expired(_) => "session_expired",
            SessionError::StoragePoisoned => "internal_error",
            SessionError::Hand(_) => "invalid_hand",
            SessionError::Rule(game) => match game {
                GameError::RoomFull => "room_full",
                GameError::GameInProgress => "game_in_progress",
                GameError::NotEnoughPlayers => "not_enough_players",
                GameError::UnknownPlayer(_) => "unknown_player",
                GameError::DeckExhausted => "internal_error",
                _ => "rule_violation",
            },
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }
}

impl IntoErrorResponse for UserError {
    fn status_code(&self) -> StatusCode {
        match self {
            UserError::EmptyUsername | UserError::UsernameTooLong => StatusCode::BAD_REQUEST,
            UserError::UsernameOnline => StatusCode::CONFLICT,
            UserError::StoragePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            UserError::EmptyUsername | UserError::UsernameTooLong => "invalid_username",
            UserError::UsernameOnline => "username_taken",
            UserError::StoragePoisoned => "internal_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }
}
