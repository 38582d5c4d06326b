//! Payload validation.
//!
//! Every insert and update payload is checked before the optimistic patch is
//! applied. A failure is a map from field name to messages, ready to be shown
//! next to the offending inputs.

use optimistic_core::RecordId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Message for a required text field left blank
pub const REQUIRED: &str = "Required";

/// Field-level validation failure
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("invalid input: {}", describe(.fields))]
pub struct ValidationError {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    /// Creates an error for a single field
    #[must_use]
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut error = Self::default();
        error.push(field, message);
        error
    }

    /// Adds a message for `field`
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages for `field`, empty when the field is valid
    #[must_use]
    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All failing fields with their messages
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// Whether no field failed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn describe(fields: &BTreeMap<String, Vec<String>>) -> String {
    fields
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Anything that can be checked before it is sent to persistence
pub trait Validate {
    /// Checks every field
    ///
    /// # Errors
    ///
    /// Returns the failing fields with their messages.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Accumulates field failures
///
/// ```
/// use ticketing::validation::Validator;
///
/// let result = Validator::new()
///     .required("name", "  ")
///     .email("userMail", "guest@example.com")
///     .finish();
/// assert_eq!(result.unwrap_err().messages("name"), ["Required"]);
/// ```
#[derive(Debug, Default)]
#[must_use]
pub struct Validator {
    error: ValidationError,
}

impl Validator {
    /// Starts with no failures
    pub fn new() -> Self {
        Self::default()
    }

    /// Text that must not be blank
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.error.push(field, REQUIRED);
        }
        self
    }

    /// Optional text that, when present, must not be blank
    pub fn required_if_present(self, field: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.required(field, value),
            None => self,
        }
    }

    /// An email address with a local part and a dotted domain
    pub fn email(mut self, field: &str, value: &str) -> Self {
        let valid = value.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
        });
        if !valid {
            self.error.push(field, "Invalid email");
        }
        self
    }

    /// Optional email that, when present, must be valid
    pub fn email_if_present(self, field: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.email(field, value),
            None => self,
        }
    }

    /// Id of a related row: not blank and not a pending placeholder
    pub fn reference(mut self, field: &str, id: &RecordId) -> Self {
        if id.is_blank() {
            self.error.push(field, REQUIRED);
        } else if id.is_sentinel() {
            self.error.push(field, "Refers to a row that is still being saved");
        }
        self
    }

    /// Optional reference that, when present, must be valid
    pub fn reference_if_present(self, field: &str, id: Option<&RecordId>) -> Self {
        match id {
            Some(id) => self.reference(field, id),
            None => self,
        }
    }

    /// A count that must be at least one
    pub fn positive(mut self, field: &str, value: u32) -> Self {
        if value == 0 {
            self.error.push(field, "Must be at least 1");
        }
        self
    }

    /// Optional count that, when present, must be at least one
    pub fn positive_if_present(self, field: &str, value: Option<u32>) -> Self {
        match value {
            Some(value) => self.positive(field, value),
            None => self,
        }
    }

    /// Merges the failures of a nested check
    pub fn check(mut self, result: Result<(), ValidationError>) -> Self {
        if let Err(error) = result {
            for (field, messages) in error.fields {
                for message in messages {
                    self.error.push(&field, message);
                }
            }
        }
        self
    }

    /// Finishes validation
    ///
    /// # Errors
    ///
    /// Returns every accumulated failure.
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.error.is_empty() {
            Ok(())
        } else {
            Err(self.error)
        }
    }
}

/// Checks the id targeted by an update or delete
///
/// Rows still carrying a placeholder id cannot be edited until their
/// pending mutation resolves.
///
/// # Errors
///
/// Returns an `id` failure for blank or placeholder ids.
pub fn target_id(id: &RecordId) -> Result<(), ValidationError> {
    if id.is_blank() {
        Err(ValidationError::field("id", REQUIRED))
    } else if id.is_sentinel() {
        Err(ValidationError::field("id", "Still being saved, try again shortly"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_failing_field() {
        let error = Validator::new()
            .required("name", "")
            .email("userMail", "nope")
            .positive("quantity", 0)
            .finish()
            .unwrap_err();

        assert_eq!(error.fields().len(), 3);
        assert_eq!(error.messages("name"), ["Required"]);
        assert_eq!(error.messages("userMail"), ["Invalid email"]);
        assert!(error.messages("eventId").is_empty());
    }

    #[test]
    fn optional_fields_are_skipped_when_absent() {
        assert!(
            Validator::new()
                .required_if_present("name", None)
                .email_if_present("userMail", None)
                .reference_if_present("eventId", None)
                .positive_if_present("quantity", None)
                .finish()
                .is_ok()
        );
    }

    #[test]
    fn email_shapes() {
        for valid in ["a@b.co", "first.last@example.org"] {
            assert!(Validator::new().email("m", valid).finish().is_ok(), "{valid}");
        }
        for invalid in ["", "a", "a@", "@b.co", "a@b", "a@b..co", "a@b@c.co"] {
            assert!(Validator::new().email("m", invalid).finish().is_err(), "{invalid}");
        }
    }

    #[test]
    fn references_reject_placeholders() {
        let error = Validator::new()
            .reference("eventId", &RecordId::optimistic())
            .reference("sectionId", &RecordId::new(" "))
            .finish()
            .unwrap_err();
        assert_eq!(error.messages("sectionId"), ["Required"]);
        assert_eq!(error.messages("eventId").len(), 1);
    }

    #[test]
    fn target_ids() {
        assert!(target_id(&RecordId::new("abc")).is_ok());
        assert!(target_id(&RecordId::deleting()).is_err());
        assert!(target_id(&RecordId::new("")).is_err());
    }

    #[test]
    fn display_lists_fields() {
        let error = ValidationError::field("name", "Required");
        assert_eq!(error.to_string(), "invalid input: name: Required");
    }
}
