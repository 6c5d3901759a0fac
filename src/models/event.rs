use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::validation::{max_chars, required, FieldErrors, NON_FIELD_ERRORS};

pub const TITLE_MAX_CHARS: usize = 200;
pub const LOCATION_MAX_CHARS: usize = 200;
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const INVALID_DATE: &str = "Enter a valid date.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub location: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// The editable part of an event, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub location: String,
}

/// An event ready to be inserted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub fields: EventFields,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Event form as submitted. Every field is optional here so that missing
/// values surface as field errors rather than deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Set when the request body could not be read as an event form.
    #[serde(skip)]
    pub unreadable: Option<String>,
}

impl EventPayload {
    /// A form whose body could not be decoded. Validating it reports
    /// `reason` instead of per-field errors.
    pub fn unreadable(reason: impl Into<String>) -> Self {
        Self {
            unreadable: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<EventFields, FieldErrors> {
        if let Some(reason) = &self.unreadable {
            return Err(FieldErrors::single(NON_FIELD_ERRORS, reason.as_str()));
        }

        let mut errors = FieldErrors::new();

        let title = required(&mut errors, "title", self.title.as_deref());
        if let Some(title) = &title {
            max_chars(&mut errors, "title", title, TITLE_MAX_CHARS);
        }

        let description = required(&mut errors, "description", self.description.as_deref());

        let date = required(&mut errors, "date", self.date.as_deref()).and_then(|raw| {
            match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add("date", INVALID_DATE);
                    None
                }
            }
        });

        let location = required(&mut errors, "location", self.location.as_deref());
        if let Some(location) = &location {
            max_chars(&mut errors, "location", location, LOCATION_MAX_CHARS);
        }

        match (title, description, date, location) {
            (Some(title), Some(description), Some(date), Some(location)) => {
                errors.into_result(EventFields {
                    title,
                    description,
                    date,
                    location,
                })
            }
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: &str, description: &str, date: &str, location: &str) -> EventPayload {
        EventPayload {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            date: Some(date.to_string()),
            location: Some(location.to_string()),
            unreadable: None,
        }
    }

    #[test]
    fn test_valid_payload() {
        let fields = payload(" Concert ", "Live music", "2025-06-01", "Park")
            .validate()
            .unwrap();

        assert_eq!(fields.title, "Concert");
        assert_eq!(fields.date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(fields.location, "Park");
    }

    #[test]
    fn test_empty_payload_reports_every_field() {
        let errors = EventPayload::default().validate().unwrap_err();

        for field in ["title", "description", "date", "location"] {
            assert!(errors.contains(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_blank_title_is_required() {
        let errors = payload("   ", "d", "2025-06-01", "Park")
            .validate()
            .unwrap_err();

        assert!(errors.contains("title"));
        assert!(!errors.contains("location"));
    }

    #[test]
    fn test_malformed_dates() {
        for raw in ["2025-13-01", "01/06/2025", "2025-02-30", "tomorrow"] {
            let errors = payload("t", "d", raw, "l").validate().unwrap_err();
            assert_eq!(errors.get("date"), Some(&[INVALID_DATE.to_string()][..]));
        }
    }

    #[test]
    fn test_past_dates_are_accepted() {
        assert!(payload("t", "d", "1999-12-31", "l").validate().is_ok());
    }

    #[test]
    fn test_length_limits() {
        let long = "x".repeat(TITLE_MAX_CHARS + 1);
        let errors = payload(&long, "d", "2025-06-01", &long)
            .validate()
            .unwrap_err();

        assert!(errors.contains("title"));
        assert!(errors.contains("location"));
    }

    #[test]
    fn test_unreadable_body_is_a_form_error() {
        let errors = EventPayload::unreadable("Expected a JSON object")
            .validate()
            .unwrap_err();

        assert_eq!(
            errors.get(NON_FIELD_ERRORS),
            Some(&["Expected a JSON object".to_string()][..])
        );
        assert!(!errors.contains("title"));
    }

    #[test]
    fn test_payload_accepts_missing_json_fields() {
        let payload: EventPayload = serde_json::from_str(r#"{"title":"Only"}"#).unwrap();
        assert_eq!(payload.title.as_deref(), Some("Only"));
        assert!(payload.date.is_none());
    }
}
