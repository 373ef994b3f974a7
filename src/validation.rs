use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, OffsetDateTime, PrimitiveDateTime};

use crate::error::{AppError, FieldError};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Meeting times travel as `YYYYMMDDhhmmss` and are read as UTC.
pub fn parse_meeting_time(raw: &str) -> Option<OffsetDateTime> {
    let format = format_description!("[year][month][day][hour][minute][second]");
    if raw.len() != 14 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    PrimitiveDateTime::parse(raw, format)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// Collects field-level rule failures so a request reports all of them at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &'static str, message: String) {
        self.errors.push(FieldError { field, message });
    }

    fn failed(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn required(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, format!("The {} field is required.", field));
        }
        self
    }

    pub fn email(&mut self, field: &'static str, value: &str) -> &mut Self {
        if !self.failed(field) && !is_valid_email(value) {
            self.fail(field, format!("The {} must be a valid email address.", field));
        }
        self
    }

    pub fn min_len(&mut self, field: &'static str, value: &str, min: usize) -> &mut Self {
        if !self.failed(field) && value.chars().count() < min {
            self.fail(
                field,
                format!("The {} must be at least {} characters.", field, min),
            );
        }
        self
    }

    pub fn meeting_time(&mut self, field: &'static str, value: &str) -> Option<OffsetDateTime> {
        if self.failed(field) {
            return None;
        }
        let parsed = parse_meeting_time(value);
        if parsed.is_none() {
            self.fail(
                field,
                format!("The {} does not match the format YYYYMMDDhhmmss.", field),
            );
        }
        parsed
    }

    pub fn finish(self) -> Result<(), AppError> {
        self.finish_with(Some(()))
    }

    /// Like `finish`, but hands back a value checked along the way. Every
    /// check that yields `None` has already recorded its field error.
    pub fn finish_with<T>(self, value: Option<T>) -> Result<T, AppError> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(AppError::Validation(self.errors)),
        }
    }
}
