use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Named pages a client is sent to after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Index,
    Detail(Uuid),
    Login,
}

impl Destination {
    pub fn path(&self) -> String {
        match self {
            Destination::Index => "/".to_string(),
            Destination::Detail(id) => format!("/events/{}", id),
            Destination::Login => "/login".to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiErrorBody,
}

pub fn success<T>(data: T, message: impl Into<String>) -> impl IntoResponse
where
    T: Serialize,
{
    let body = ApiResponse {
        success: true,
        data: Some(data),
        message: Some(message.into()),
        redirect_to: None,
    };
    (StatusCode::OK, Json(body))
}

/// Result of a completed write: the user-facing message plus where the
/// client should go next.
pub fn completed<T>(
    status: StatusCode,
    data: Option<T>,
    message: impl Into<String>,
    destination: Destination,
) -> Response
where
    T: Serialize,
{
    let body = ApiResponse {
        success: true,
        data,
        message: Some(message.into()),
        redirect_to: Some(destination.path()),
    };
    (status, Json(body)).into_response()
}

pub fn error(
    code: &str,
    message: impl Into<String>,
    details: Option<Value>,
    status: StatusCode,
) -> Response {
    let body = ApiErrorResponse {
        success: false,
        error: ApiErrorBody {
            code: code.to_string(),
            message: message.into(),
            details,
        },
    };

    (status, Json(body)).into_response()
}
