use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::auth::CurrentActor;
use crate::models::EventPayload;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{completed, success, Destination};

/// Anything that is not a UUID cannot name an event.
fn parse_event_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::NotFound(format!("Event with id '{}' was not found", raw)))
}

/// Body problems are only reported once the caller is known to be allowed
/// to submit the form, so they travel inside the payload.
fn read_payload(body: Result<Json<EventPayload>, JsonRejection>) -> EventPayload {
    match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => EventPayload::unreadable(rejection.body_text()),
    }
}

/// GET / - All events by date
pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.events.list().await?;
    Ok(success(events, "Events retrieved").into_response())
}

/// GET /events/:id
pub async fn event_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let event = state.events.get(parse_event_id(&id)?).await?;
    Ok(success(event, "Event retrieved").into_response())
}

/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    body: Result<Json<EventPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let payload = read_payload(body);
    let outcome = state.events.create(&payload, actor.as_ref()).await?;
    let destination = Destination::Detail(outcome.value.id);
    Ok(completed(
        StatusCode::CREATED,
        Some(outcome.value),
        outcome.message,
        destination,
    ))
}

/// GET /events/:id/edit - Current values for the edit form
pub async fn edit_event_form(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let event = state
        .events
        .edit_form(parse_event_id(&id)?, actor.as_ref())
        .await?;
    Ok(success(event, "Event retrieved").into_response())
}

/// POST /events/:id/edit
pub async fn update_event(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    body: Result<Json<EventPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let id = parse_event_id(&id)?;
    let payload = read_payload(body);
    let outcome = state.events.update(id, &payload, actor.as_ref()).await?;
    Ok(completed(
        StatusCode::OK,
        Some(outcome.value),
        outcome.message,
        Destination::Detail(id),
    ))
}

/// GET /events/:id/delete - Confirmation step
pub async fn confirm_delete_event(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let event = state
        .events
        .confirm_delete(parse_event_id(&id)?, actor.as_ref())
        .await?;
    Ok(success(event, "Confirm deletion").into_response())
}

/// POST /events/:id/delete
pub async fn delete_event(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let outcome = state
        .events
        .delete(parse_event_id(&id)?, actor.as_ref())
        .await?;
    Ok(completed(
        StatusCode::OK,
        Some(outcome.value),
        outcome.message,
        Destination::Index,
    ))
}
