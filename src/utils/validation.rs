use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const REQUIRED: &str = "This field is required.";

/// Key for errors that concern the whole form rather than one field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Returns `value` when no errors were collected.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Trims a submitted value and records a "required" error when it is
/// missing or blank.
pub fn required(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.add(field, REQUIRED);
            None
        }
    }
}

/// Records an error when `value` is longer than `max` characters.
pub fn max_chars(errors: &mut FieldErrors, field: &str, value: &str, max: usize) -> bool {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        let mut errors = FieldErrors::new();
        assert_eq!(
            required(&mut errors, "title", Some("  Concert ")),
            Some("Concert".to_string())
        );
        assert!(errors.is_empty());

        assert_eq!(required(&mut errors, "title", Some("   ")), None);
        assert_eq!(required(&mut errors, "location", None), None);
        assert_eq!(errors.get("title"), Some(&[REQUIRED.to_string()][..]));
        assert!(errors.contains("location"));
    }

    #[test]
    fn test_max_chars_counts_characters_not_bytes() {
        let mut errors = FieldErrors::new();
        assert!(max_chars(&mut errors, "title", "ñandú", 5));
        assert!(!max_chars(&mut errors, "title", "abcdef", 5));
        assert_eq!(
            errors.get("title").unwrap()[0],
            "Ensure this value has at most 5 characters (it has 6)."
        );
    }

    #[test]
    fn test_serializes_as_field_map() {
        let mut errors = FieldErrors::new();
        errors.add("date", "Enter a valid date.");
        errors.add("date", "Another problem.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "date": ["Enter a valid date.", "Another problem."] })
        );
        assert_eq!(
            errors.to_string(),
            "date: Enter a valid date.; date: Another problem."
        );
    }
}
