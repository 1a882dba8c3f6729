// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::db::DbError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

/// User repository operation, used to annotate failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchUser,
    UpdateUser,
    FetchUserPosts,
    FetchUsers,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            Operation::FetchUser => "fetching user",
            Operation::UpdateUser => "creating/updating user",
            Operation::FetchUserPosts => "fetching user threads",
            Operation::FetchUsers => "fetching users",
        };
        f.write_str(action)
    }
}

/// A failed repository operation. The underlying cause is kept as `source()`.
#[derive(Debug, thiserror::Error)]
#[error("Error {operation}: {cause}")]
pub struct RepositoryError {
    pub operation: Operation,
    #[source]
    pub cause: DbError,
}

impl RepositoryError {
    pub fn new(operation: Operation, cause: DbError) -> Self {
        Self { operation, cause }
    }

    /// True when the caller supplied parameters the query policy rejects.
    pub fn is_invalid_query(&self) -> bool {
        matches!(self.cause, DbError::InvalidQuery(_))
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Repository(err) if err.is_invalid_query() => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                Some(err.cause.to_string()),
            ),
            AppError::Repository(err) => {
                tracing::error!(error = %err, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
