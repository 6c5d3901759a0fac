pub mod events;
pub mod identity;

pub use events::EventService;
pub use identity::IdentityService;

/// A completed write and the message to show the user.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub message: &'static str,
}

impl<T> Outcome<T> {
    pub fn new(value: T, message: &'static str) -> Self {
        Self { value, message }
    }
}
