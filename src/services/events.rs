//! Event lifecycle: listing, detail, and creator-or-staff guarded writes.
//!
//! Every operation takes the acting identity explicitly. Reads are open to
//! anyone; writes require an actor, and changes to an existing event require
//! that actor to be its creator or staff.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::Outcome;
use crate::models::{Actor, Event, EventPayload, NewEvent};
use crate::store::EventStore;
use crate::utils::error::AppError;

pub const LOGIN_REQUIRED: &str = "Please log in to continue.";
pub const EVENT_CREATED: &str = "Event created successfully.";
pub const EVENT_UPDATED: &str = "Event updated successfully.";
pub const EVENT_DELETED: &str = "Event deleted successfully.";
pub const EDIT_DENIED: &str = "You do not have permission to edit this event.";
pub const DELETE_DENIED: &str = "You do not have permission to delete this event.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Edit,
    Delete,
}

impl Change {
    fn denied_message(self) -> &'static str {
        match self {
            Change::Edit => EDIT_DENIED,
            Change::Delete => DELETE_DENIED,
        }
    }
}

/// Creator or staff. Staff wins over an ownership mismatch.
pub fn can_modify(actor: Option<&Actor>, event: &Event) -> bool {
    actor.is_some_and(|actor| actor.id == event.created_by || actor.is_staff)
}

fn require_actor(actor: Option<&Actor>) -> Result<&Actor, AppError> {
    actor.ok_or_else(|| AppError::Unauthenticated(LOGIN_REQUIRED.to_string()))
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Event with id '{}' was not found", id))
}

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Event>, AppError> {
        self.store.list_ordered_by_date().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Event, AppError> {
        self.store.get_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn create(
        &self,
        payload: &EventPayload,
        actor: Option<&Actor>,
    ) -> Result<Outcome<Event>, AppError> {
        let actor = require_actor(actor)?;
        let fields = payload.validate().map_err(AppError::ValidationError)?;

        let event = self
            .store
            .insert(NewEvent {
                fields,
                created_by: actor.id,
                created_at: Utc::now(),
            })
            .await?;

        info!(event_id = %event.id, user = %actor.username, "Event created");
        Ok(Outcome::new(event, EVENT_CREATED))
    }

    /// Current state of an event the actor is allowed to edit.
    pub async fn edit_form(&self, id: Uuid, actor: Option<&Actor>) -> Result<Event, AppError> {
        self.load_for_change(id, actor, Change::Edit).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: &EventPayload,
        actor: Option<&Actor>,
    ) -> Result<Outcome<Event>, AppError> {
        self.load_for_change(id, actor, Change::Edit).await?;
        let fields = payload.validate().map_err(AppError::ValidationError)?;

        let event = self
            .store
            .update(id, fields)
            .await?
            .ok_or_else(|| not_found(id))?;

        info!(event_id = %event.id, "Event updated");
        Ok(Outcome::new(event, EVENT_UPDATED))
    }

    /// The event the actor is about to delete, for the confirmation step.
    pub async fn confirm_delete(
        &self,
        id: Uuid,
        actor: Option<&Actor>,
    ) -> Result<Event, AppError> {
        self.load_for_change(id, actor, Change::Delete).await
    }

    /// Removes the event permanently and hands back what was deleted.
    pub async fn delete(
        &self,
        id: Uuid,
        actor: Option<&Actor>,
    ) -> Result<Outcome<Event>, AppError> {
        let event = self.load_for_change(id, actor, Change::Delete).await?;

        if !self.store.delete_by_id(id).await? {
            return Err(not_found(id));
        }

        info!(event_id = %id, "Event deleted");
        Ok(Outcome::new(event, EVENT_DELETED))
    }

    async fn load_for_change(
        &self,
        id: Uuid,
        actor: Option<&Actor>,
        change: Change,
    ) -> Result<Event, AppError> {
        let actor = require_actor(actor)?;
        let event = self.get(id).await?;

        if !can_modify(Some(actor), &event) {
            warn!(
                event_id = %id,
                user = %actor.username,
                change = ?change,
                "Refusing change to another user's event"
            );
            return Err(AppError::Forbidden {
                message: change.denied_message().to_string(),
                event: Box::new(event),
            });
        }

        Ok(event)
    }
}
