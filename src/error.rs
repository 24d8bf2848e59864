// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types with consistent user-facing messages.

use crate::lifecycle::TripAction;
use crate::models::UserRole;
use crate::services::TripView;
use reqwest::StatusCode;

/// Error type returned by every client operation.
///
/// HTTP failures keep the `"<status> <reason>: <body>"` message the server
/// produced so it can be shown inline as-is.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered 401. The stored token has already been discarded.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error(
        "Request timeout. The server may be starting up; open {base_url}/health and try again."
    )]
    Timeout { base_url: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Only {required} accounts can do this (logged in as {actual})")]
    WrongRole { required: UserRole, actual: UserRole },

    #[error("Cannot {action} trip #{trip_id} in its current state")]
    ActionNotAvailable { action: TripAction, trip_id: i64 },

    /// The server refused a trip action. `view` is the trip as reloaded
    /// right after the refusal.
    #[error("Could not {action} trip #{trip_id}: {error}")]
    Rejected {
        action: TripAction,
        trip_id: i64,
        error: Box<ClientError>,
        view: Box<TripView>,
    },

    #[error("Session storage error: {0}")]
    Session(String),
}

impl ClientError {
    /// Build the error for a non-success HTTP response.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = format!(
            "{} {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            body
        );
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            _ => ClientError::Http { status, message },
        }
    }

    /// HTTP status behind this error, if it came from the server.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            ClientError::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            ClientError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Rejected { error, .. } => error.status(),
            _ => None,
        }
    }

    /// True when the user has to (re-)authenticate before retrying.
    pub fn requires_login(&self) -> bool {
        match self {
            ClientError::Rejected { error, .. } => error.requires_login(),
            _ => matches!(self, ClientError::Unauthorized(_) | ClientError::NotLoggedIn),
        }
    }

    /// Trip state reloaded after a rejected action.
    pub fn refreshed(&self) -> Option<&TripView> {
        match self {
            ClientError::Rejected { view, .. } => Some(view.as_ref()),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let detail = errs
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .next()
                    .unwrap_or_else(|| "invalid".to_string());
                format!("{field}: {detail}")
            })
            .collect();
        fields.sort();
        ClientError::Validation(fields.join(", "))
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
