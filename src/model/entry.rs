//! Ledger entry record, its sortable columns and client-submitted changes.

use crate::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

pub type EntryId = i64;

/// A stored ledger line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub value: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated entry ready to be written. Only produced by `EntryValidator`.
#[derive(Clone, Debug, PartialEq)]
pub struct EntryDraft {
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub value: Decimal,
}

impl From<&Entry> for EntryDraft {
    fn from(entry: &Entry) -> Self {
        EntryDraft {
            name: entry.name.clone(),
            description: entry.description.clone(),
            date: entry.date,
            value: entry.value,
        }
    }
}

/// Columns a listing may be ordered by. Query input is matched against this set and never
/// interpolated into SQL.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryColumn {
    #[default]
    Id,
    Name,
    Description,
    Date,
    Value,
    CreatedAt,
    UpdatedAt,
}

impl EntryColumn {
    pub const ALL: [EntryColumn; 7] = [
        EntryColumn::Id,
        EntryColumn::Name,
        EntryColumn::Description,
        EntryColumn::Date,
        EntryColumn::Value,
        EntryColumn::CreatedAt,
        EntryColumn::UpdatedAt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntryColumn::Id => "id",
            EntryColumn::Name => "name",
            EntryColumn::Description => "description",
            EntryColumn::Date => "date",
            EntryColumn::Value => "value",
            EntryColumn::CreatedAt => "created_at",
            EntryColumn::UpdatedAt => "updated_at",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|c| c.as_str().eq_ignore_ascii_case(s))
    }
}

/// Raw per-field changes from a request body. `None` means the key was absent;
/// `Some(Value::Null)` means the client sent an explicit null.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryChanges {
    pub name: Option<Value>,
    pub description: Option<Value>,
    pub date: Option<Value>,
    pub value: Option<Value>,
}

impl EntryChanges {
    /// Accepts either a bare object or one wrapped as `{"entry": {...}}`. Keys outside the
    /// writable set (including `id` and timestamps) are ignored.
    pub fn from_body(body: Value) -> Result<Self, AppError> {
        let mut map = match body {
            Value::Object(m) => m,
            _ => return Err(AppError::BadRequest("body must be a JSON object".into())),
        };
        if let Some(inner) = map.remove("entry") {
            map = match inner {
                Value::Object(m) => m,
                _ => return Err(AppError::BadRequest("entry must be a JSON object".into())),
            };
        }
        Ok(EntryChanges {
            name: map.remove("name"),
            description: map.remove("description"),
            date: map.remove("date"),
            value: map.remove("value"),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.date.is_none() && self.value.is_none()
    }
}
