pub mod event;
pub mod user;

pub use event::{Event, EventFields, EventPayload, NewEvent};
pub use user::{Actor, LoginPayload, NewUser, RegistrationPayload, Session, User};
