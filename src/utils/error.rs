use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::models::event::Event;
use crate::utils::response::{error as error_response, Destination};
use crate::utils::validation::{FieldErrors, NON_FIELD_ERRORS};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(FieldErrors),

    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    /// Authenticated but not allowed to touch this event. Rendered as a
    /// redirect back to the event, carrying it unchanged.
    #[error("Forbidden: {message}")]
    Forbidden { message: String, event: Box<Event> },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::SEE_OTHER,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::Forbidden { .. } => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(errors) => {
                debug!(errors = %errors, "Validation failed");
            }
            AppError::Unauthenticated(msg) | AppError::NotFound(msg) => {
                debug!(error = ?self, message = %msg, "Request rejected");
            }
            AppError::Forbidden { message, event } => {
                warn!(event_id = %event.id, message = %message, "Permission denied");
            }
            AppError::InternalServerError(msg) => {
                error!(error = ?self, message = %msg, "Application error");
            }
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
        }
    }
}

/// A body that is not the expected JSON is a form error, reported in the
/// usual envelope.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(FieldErrors::single(
            NON_FIELD_ERRORS,
            rejection.body_text(),
        ))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        match self {
            AppError::ValidationError(errors) => error_response(
                code,
                "Please correct the errors below.",
                serde_json::to_value(&errors).ok(),
                status,
            ),
            AppError::Unauthenticated(msg) => error_response(
                code,
                msg,
                Some(json!({ "redirect_to": Destination::Login.path() })),
                status,
            ),
            AppError::Forbidden { message, event } => {
                let location = Destination::Detail(event.id).path();
                let details = json!({ "redirect_to": location, "event": event });
                let mut response = error_response(code, message, Some(details), status);
                if let Ok(value) = HeaderValue::from_str(&location) {
                    response.headers_mut().insert(header::LOCATION, value);
                }
                response
            }
            AppError::NotFound(msg) => error_response(code, msg, None, status),
            // Do not expose internal details in the API response
            AppError::DatabaseError(_) => {
                error_response(code, "A database error occurred", None, status)
            }
            AppError::InternalServerError(_) => {
                error_response(code, "An internal error occurred", None, status)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn sample_event() -> Event {
        Event {
            id: Uuid::new_v4(),
            title: "Concert".to_string(),
            description: "Live music".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            location: "Park".to_string(),
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::ValidationError(FieldErrors::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthenticated("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InternalServerError("x".into()).code(),
            "INTERNAL_SERVER_ERROR"
        );
    }

    #[test]
    fn test_forbidden_redirects_to_event() {
        let event = sample_event();
        let expected = format!("/events/{}", event.id);
        let response = AppError::Forbidden {
            message: "nope".to_string(),
            event: Box::new(event),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            expected.as_str()
        );
    }

    #[test]
    fn test_internal_message_is_hidden() {
        let response = AppError::InternalServerError("secret detail".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
