use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EventStore, IdentityStore, USERNAME_TAKEN};
use crate::models::{Event, EventFields, NewEvent, NewUser, Session, User};
use crate::utils::error::AppError;
use crate::utils::validation::FieldErrors;

/// HashMap-backed store. Data is lost when the process exits.
#[derive(Default)]
pub struct InMemoryStore {
    events: RwLock<HashMap<Uuid, Event>>,
    users: RwLock<HashMap<Uuid, User>>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn same_username(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn insert(&self, event: NewEvent) -> Result<Event, AppError> {
        let mut events = self.events.write().await;

        let mut id = Uuid::new_v4();
        while events.contains_key(&id) {
            id = Uuid::new_v4();
        }

        let NewEvent {
            fields,
            created_by,
            created_at,
        } = event;
        let event = Event {
            id,
            title: fields.title,
            description: fields.description,
            date: fields.date,
            location: fields.location,
            created_by,
            created_at,
        };
        events.insert(id, event.clone());
        Ok(event)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        Ok(self.events.read().await.get(&id).cloned())
    }

    async fn list_ordered_by_date(&self) -> Result<Vec<Event>, AppError> {
        let mut events: Vec<Event> = self.events.read().await.values().cloned().collect();
        events.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(events)
    }

    async fn update(&self, id: Uuid, fields: EventFields) -> Result<Option<Event>, AppError> {
        let mut events = self.events.write().await;
        Ok(events.get_mut(&id).map(|event| {
            event.title = fields.title;
            event.description = fields.description;
            event.date = fields.date;
            event.location = fields.location;
            event.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.events.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl IdentityStore for InMemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| same_username(&u.username, &user.username))
        {
            return Err(AppError::ValidationError(FieldErrors::single(
                "username",
                USERNAME_TAKEN,
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            is_staff: user.is_staff,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn username_taken(&self, username: &str) -> Result<bool, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|u| same_username(&u.username, username)))
    }

    async fn set_staff(&self, username: &str, is_staff: bool) -> Result<Option<User>, AppError> {
        let mut users = self.users.write().await;
        Ok(users
            .values_mut()
            .find(|u| u.username == username)
            .map(|user| {
                user.is_staff = is_staff;
                user.clone()
            }))
    }

    async fn insert_session(&self, session: Session) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session);
        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>, AppError> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn new_event(title: &str, date: (i32, u32, u32)) -> NewEvent {
        NewEvent {
            fields: EventFields {
                title: title.to_string(),
                description: "desc".to_string(),
                date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
                location: "Hall".to_string(),
            },
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_date() {
        let store = InMemoryStore::new();
        store.insert(new_event("late", (2025, 9, 1))).await.unwrap();
        store.insert(new_event("early", (2024, 1, 1))).await.unwrap();
        store.insert(new_event("mid", (2025, 1, 1))).await.unwrap();

        let titles: Vec<String> = store
            .list_ordered_by_date()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, ["early", "mid", "late"]);
    }

    #[tokio::test]
    async fn test_same_date_ties_break_on_creation_time() {
        let store = InMemoryStore::new();
        let mut second = new_event("second", (2025, 1, 1));
        second.created_at = Utc::now() + Duration::seconds(5);
        store.insert(second).await.unwrap();
        store.insert(new_event("first", (2025, 1, 1))).await.unwrap();

        let events = store.list_ordered_by_date().await.unwrap();
        assert_eq!(events[0].title, "first");
        assert_eq!(events[1].title, "second");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_event() {
        let store = InMemoryStore::new();
        let fields = new_event("x", (2025, 1, 1)).fields;

        assert!(store.update(Uuid::new_v4(), fields).await.unwrap().is_none());
        assert!(!store.delete_by_id(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = InMemoryStore::new();
        let user = NewUser {
            username: "ana".to_string(),
            password_hash: "h".to_string(),
            is_staff: false,
        };
        store.insert_user(user.clone()).await.unwrap();

        match store.insert_user(user).await {
            Err(AppError::ValidationError(errors)) => assert!(errors.contains("username")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_usernames_compare_ignoring_case() {
        let store = InMemoryStore::new();
        let user = |name: &str| NewUser {
            username: name.to_string(),
            password_hash: "h".to_string(),
            is_staff: false,
        };
        store.insert_user(user("ana")).await.unwrap();

        assert!(store.username_taken("ANA").await.unwrap());
        assert!(!store.username_taken("anab").await.unwrap());
        assert!(matches!(
            store.insert_user(user("Ana")).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_sessions_are_pruned() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        for (token, expires_at) in [
            ("old", now - Duration::hours(2)),
            ("edge", now),
            ("live", now + Duration::hours(1)),
        ] {
            store
                .insert_session(Session {
                    token: token.to_string(),
                    user_id: Uuid::new_v4(),
                    created_at: now - Duration::hours(3),
                    expires_at,
                })
                .await
                .unwrap();
        }

        assert_eq!(store.delete_expired_sessions(now).await.unwrap(), 2);
        assert_eq!(store.session_count().await, 1);
        assert!(store.find_session("live").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sessions_round_trip() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        store
            .insert_session(Session {
                token: "abc".to_string(),
                user_id: Uuid::new_v4(),
                created_at: now,
                expires_at: now + Duration::hours(1),
            })
            .await
            .unwrap();

        assert!(store.find_session("abc").await.unwrap().is_some());
        store.delete_session("abc").await.unwrap();
        assert!(store.find_session("abc").await.unwrap().is_none());
    }
}
