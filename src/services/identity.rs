use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::Outcome;
use crate::models::{Actor, LoginPayload, NewUser, RegistrationPayload, Session, User};
use crate::store::{IdentityStore, USERNAME_TAKEN};
use crate::utils::error::AppError;
use crate::utils::password::{hash_password_blocking, verify_password_blocking};
use crate::utils::validation::{max_chars, required, FieldErrors, REQUIRED};

pub const USERNAME_MAX_CHARS: usize = 150;
pub const PASSWORD_MIN_CHARS: usize = 8;

pub const REGISTERED: &str = "Registration successful. You are now logged in.";
pub const LOGGED_IN: &str = "You are now logged in.";
pub const LOGGED_OUT: &str = "You have been logged out.";
pub const INVALID_LOGIN: &str = "Please enter a correct username and password.";

const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, \
                                numbers, and @/./+/-/_ characters.";
const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
const PASSWORD_NUMERIC: &str = "This password is entirely numeric.";
const PASSWORD_COMMON: &str = "This password is too common.";
const PASSWORD_LIKE_USERNAME: &str = "The password is too similar to the username.";

/// Username pieces shorter than this are too common to compare against.
const SIMILARITY_MIN_CHARS: usize = 3;

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "passw0rd", "12345678", "123456789", "1234567890",
    "qwertyuiop", "qwerty123", "1qaz2wsx", "iloveyou", "sunshine", "princess",
    "football", "baseball", "superman", "trustno1", "welcome1", "letmein1",
    "abc12345", "11111111",
];

/// True when the password is the username, or contains the username or one
/// of its `@/./+/-/_` separated parts.
fn resembles_username(password: &str, username: &str) -> bool {
    let password = password.to_lowercase();
    let username = username.to_lowercase();
    if password == username {
        return true;
    }
    std::iter::once(username.as_str())
        .chain(username.split(|c: char| !c.is_alphanumeric()))
        .filter(|part| part.chars().count() >= SIMILARITY_MIN_CHARS)
        .any(|part| password.contains(part))
}

/// A freshly started session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionGrant {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

struct ValidRegistration {
    username: String,
    password: String,
}

fn validate_registration(payload: &RegistrationPayload) -> Result<ValidRegistration, FieldErrors> {
    let mut errors = FieldErrors::new();

    let username = required(&mut errors, "username", payload.username.as_deref());
    if let Some(username) = &username {
        max_chars(&mut errors, "username", username, USERNAME_MAX_CHARS);
        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            errors.add("username", INVALID_USERNAME);
        }
    }

    // Passwords are not trimmed.
    let password1 = payload.password1.clone().filter(|p| !p.is_empty());
    let password2 = payload.password2.clone().filter(|p| !p.is_empty());
    if password1.is_none() {
        errors.add("password1", REQUIRED);
    }
    if password2.is_none() {
        errors.add("password2", REQUIRED);
    }

    if let (Some(p1), Some(p2)) = (&password1, &password2) {
        if p1 != p2 {
            errors.add("password2", PASSWORD_MISMATCH);
        } else {
            if p1.chars().count() < PASSWORD_MIN_CHARS {
                errors.add(
                    "password2",
                    format!(
                        "This password is too short. \
                         It must contain at least {PASSWORD_MIN_CHARS} characters."
                    ),
                );
            }
            if COMMON_PASSWORDS.contains(&p1.to_lowercase().as_str()) {
                errors.add("password2", PASSWORD_COMMON);
            }
            if p1.chars().all(|c| c.is_ascii_digit()) {
                errors.add("password2", PASSWORD_NUMERIC);
            }
            if let Some(username) = &username {
                if resembles_username(p1, username) {
                    errors.add("password2", PASSWORD_LIKE_USERNAME);
                }
            }
        }
    }

    match (username, password1) {
        (Some(username), Some(password)) => {
            errors.into_result(ValidRegistration { username, password })
        }
        _ => Err(errors),
    }
}

fn new_session_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn IdentityStore>,
    session_ttl: Duration,
}

impl IdentityService {
    pub fn new(store: Arc<dyn IdentityStore>, session_ttl_hours: i64) -> Self {
        Self {
            store,
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    /// Creates a regular (non-staff) account and logs it in.
    pub async fn register(
        &self,
        payload: &RegistrationPayload,
    ) -> Result<Outcome<SessionGrant>, AppError> {
        let registration = validate_registration(payload).map_err(AppError::ValidationError)?;

        if self.store.username_taken(&registration.username).await? {
            return Err(AppError::ValidationError(FieldErrors::single(
                "username",
                USERNAME_TAKEN,
            )));
        }

        let password_hash = hash_password_blocking(registration.password).await?;
        let user = self
            .store
            .insert_user(NewUser {
                username: registration.username,
                password_hash,
                is_staff: false,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        let grant = self.start_session(user).await?;
        Ok(Outcome::new(grant, REGISTERED))
    }

    pub async fn login(&self, payload: &LoginPayload) -> Result<Outcome<SessionGrant>, AppError> {
        let (Some(username), Some(password)) = (
            payload.username.as_deref().map(str::trim),
            payload.password.clone(),
        ) else {
            return Err(AppError::Unauthenticated(INVALID_LOGIN.to_string()));
        };

        let Some(user) = self.store.find_user_by_username(username).await? else {
            warn!(username = %username, "Login attempt for unknown user");
            return Err(AppError::Unauthenticated(INVALID_LOGIN.to_string()));
        };

        if !verify_password_blocking(password, user.password_hash.clone()).await? {
            warn!(username = %username, "Login attempt with wrong password");
            return Err(AppError::Unauthenticated(INVALID_LOGIN.to_string()));
        }

        info!(user_id = %user.id, "User logged in");
        let grant = self.start_session(user).await?;
        Ok(Outcome::new(grant, LOGGED_IN))
    }

    /// Ends the session if there is one.
    pub async fn logout(&self, token: Option<&str>) -> Result<Outcome<()>, AppError> {
        if let Some(token) = token {
            self.store.delete_session(token).await?;
        }
        Ok(Outcome::new((), LOGGED_OUT))
    }

    /// Resolves a session token to the identity behind it.
    pub async fn current_identity(&self, token: &str) -> Result<Option<Actor>, AppError> {
        let Some(session) = self.store.find_session(token).await? else {
            return Ok(None);
        };

        if session.is_expired(Utc::now()) {
            self.store.delete_session(token).await?;
            return Ok(None);
        }

        Ok(self
            .store
            .get_user(session.user_id)
            .await?
            .as_ref()
            .map(Actor::from))
    }

    pub async fn set_staff(&self, username: &str, is_staff: bool) -> Result<User, AppError> {
        let user = self
            .store
            .set_staff(username, is_staff)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' was not found", username)))?;

        info!(username = %user.username, is_staff, "Staff flag changed");
        Ok(user)
    }

    /// Deletes sessions nobody can use any more.
    pub async fn clear_expired_sessions(&self) -> Result<u64, AppError> {
        let removed = self.store.delete_expired_sessions(Utc::now()).await?;
        if removed > 0 {
            info!(removed, "Expired sessions cleared");
        }
        Ok(removed)
    }

    async fn start_session(&self, user: User) -> Result<SessionGrant, AppError> {
        self.clear_expired_sessions().await?;

        let now = Utc::now();
        let session = Session {
            token: new_session_token(),
            user_id: user.id,
            created_at: now,
            expires_at: now + self.session_ttl,
        };
        let grant = SessionGrant {
            user,
            token: session.token.clone(),
            expires_at: session.expires_at,
        };
        self.store.insert_session(session).await?;
        Ok(grant)
    }
}
