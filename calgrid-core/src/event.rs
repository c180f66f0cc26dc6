//! Calendar event types.
//!
//! Events are single-day entries. The store builds them from an `EventDraft`
//! (the fields a user supplies) plus a local id and timestamps; the remote
//! service later assigns a `RemoteId` that update and delete calls are keyed on.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CalGridError, CalGridResult};

/// Process-local event identifier, handed out by a store's creation counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier assigned by the remote service once an event is persisted.
///
/// Services differ in whether they hand out strings or numbers, so both are
/// accepted on the wire and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RemoteId(String);

impl RemoteId {
    pub fn new(id: impl Into<String>) -> Self {
        RemoteId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RemoteId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => RemoteId(s),
            Raw::Number(n) => RemoteId(n.to_string()),
        })
    }
}

/// The shape of an event. Only single-day events exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    #[default]
    Single,
}

/// User-supplied fields for creating or updating an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub date: NaiveDate,
    pub description: String,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, date: NaiveDate, description: impl Into<String>) -> Self {
        EventDraft {
            title: title.into(),
            date,
            description: description.into(),
        }
    }

    /// Reject drafts that would produce an event without a displayable title.
    pub fn validate(&self) -> CalGridResult<()> {
        if self.title.trim().is_empty() {
            return Err(CalGridError::InvalidEvent("title must not be empty".into()));
        }
        Ok(())
    }
}

/// A single-day calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: EventId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<RemoteId>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CalendarEvent {
    /// Build a new single-day event. Both timestamps are set to `now`.
    pub fn single(id: EventId, draft: EventDraft, now: DateTime<Utc>) -> Self {
        CalendarEvent {
            id,
            remote_id: None,
            kind: EventKind::Single,
            title: draft.title,
            description: draft.description,
            date: draft.date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Calendar-day equality: time of day plays no part.
    pub fn falls_on(&self, date: NaiveDate) -> bool {
        self.date == date
    }

    /// Overwrite the user-editable fields and bump `updated_at`.
    pub fn apply(&mut self, draft: &EventDraft, now: DateTime<Utc>) {
        self.title = draft.title.clone();
        self.date = draft.date;
        self.description = draft.description.clone();
        self.updated_at = now;
    }

    pub fn is_persisted(&self) -> bool {
        self.remote_id.is_some()
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.date.format("%Y-%m-%d"))
    }
}
