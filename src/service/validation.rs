//! Entry validation: presence and type checks run before every write.

use crate::error::{AppError, FieldErrors};
use crate::model::{Entry, EntryChanges, EntryDraft};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

const BLANK: &str = "can't be blank";

pub struct EntryValidator;

impl EntryValidator {
    /// Validate a create payload. `name`, `date` and `value` must all be present.
    pub fn validate_new(changes: &EntryChanges) -> Result<EntryDraft, AppError> {
        resolve(None, changes)
    }

    /// Apply `changes` over `current` and validate the merged record as a whole.
    pub fn validate_merged(current: &Entry, changes: &EntryChanges) -> Result<EntryDraft, AppError> {
        resolve(Some(current), changes)
    }
}

fn resolve(base: Option<&Entry>, changes: &EntryChanges) -> Result<EntryDraft, AppError> {
    let mut errors = FieldErrors::new();

    let name = match &changes.name {
        Some(v) => parse_name(v, &mut errors),
        None => base.map(|e| e.name.clone()),
    };
    if name.is_none() && changes.name.is_none() {
        errors.add("name", BLANK);
    }

    let description = match &changes.description {
        Some(v) => parse_description(v, &mut errors),
        None => base.and_then(|e| e.description.clone()),
    };

    let date = match &changes.date {
        Some(v) => parse_date(v, &mut errors),
        None => base.map(|e| e.date),
    };
    if date.is_none() && changes.date.is_none() {
        errors.add("date", BLANK);
    }

    let value = match &changes.value {
        Some(v) => parse_value(v, &mut errors),
        None => base.map(|e| e.value),
    };
    if value.is_none() && changes.value.is_none() {
        errors.add("value", BLANK);
    }

    errors.into_result()?;
    match (name, date, value) {
        (Some(name), Some(date), Some(value)) => Ok(EntryDraft {
            name,
            description,
            date,
            value,
        }),
        _ => Err(AppError::BadRequest("incomplete entry".into())),
    }
}

fn parse_name(v: &Value, errors: &mut FieldErrors) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::String(_) | Value::Null => {
            errors.add("name", BLANK);
            None
        }
        _ => {
            errors.add("name", "must be a string");
            None
        }
    }
}

fn parse_description(v: &Value, errors: &mut FieldErrors) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        _ => {
            errors.add("description", "must be a string");
            None
        }
    }
}

fn parse_date(v: &Value, errors: &mut FieldErrors) -> Option<NaiveDate> {
    match v {
        Value::String(s) if s.trim().is_empty() => {
            errors.add("date", BLANK);
            None
        }
        Value::String(s) => match NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                errors.add("date", "must be a date in YYYY-MM-DD format");
                None
            }
        },
        Value::Null => {
            errors.add("date", BLANK);
            None
        }
        _ => {
            errors.add("date", "must be a date in YYYY-MM-DD format");
            None
        }
    }
}

fn parse_value(v: &Value, errors: &mut FieldErrors) -> Option<Decimal> {
    let parsed = match v {
        Value::Null => {
            errors.add("value", BLANK);
            return None;
        }
        Value::String(s) if s.trim().is_empty() => {
            errors.add("value", BLANK);
            return None;
        }
        Value::String(s) => parse_decimal(s.trim()),
        Value::Number(n) => parse_decimal(&n.to_string()),
        _ => None,
    };
    if parsed.is_none() {
        errors.add("value", "is not a number");
    }
    parsed
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}
