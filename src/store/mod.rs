//! Persistence seams for events and identities.
//!
//! Services depend only on the traits here. [`postgres::PgStore`] backs a
//! deployed server, [`memory::InMemoryStore`] backs development runs
//! without a database and the test suite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Event, EventFields, NewEvent, NewUser, Session, User};
use crate::utils::error::AppError;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert(&self, event: NewEvent) -> Result<Event, AppError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Event>, AppError>;

    /// All events, ascending by date; ties by creation time, then id.
    async fn list_ordered_by_date(&self) -> Result<Vec<Event>, AppError>;

    /// Overwrites the editable fields. `None` when the event is gone.
    async fn update(&self, id: Uuid, fields: EventFields) -> Result<Option<Event>, AppError>;

    /// Returns whether a row was removed.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Fails with a `username` validation error when the name is taken,
    /// compared ignoring case.
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Whether a user exists whose name matches ignoring case.
    async fn username_taken(&self, username: &str) -> Result<bool, AppError>;

    async fn set_staff(&self, username: &str, is_staff: bool) -> Result<Option<User>, AppError>;

    async fn insert_session(&self, session: Session) -> Result<(), AppError>;

    async fn find_session(&self, token: &str) -> Result<Option<Session>, AppError>;

    async fn delete_session(&self, token: &str) -> Result<(), AppError>;

    /// Removes every session that expired at or before `now`; returns how many.
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}
