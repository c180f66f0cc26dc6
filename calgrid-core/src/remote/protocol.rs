//! Wire records exchanged with the remote event service.
//!
//! Mutations are wrapped in a `{ "calendarEvent": ... }` envelope. Listings
//! come back as a bare array of records whose dates are serialized strings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{CalGridError, CalGridResult};
use crate::event::{CalendarEvent, EventDraft, EventId, EventKind, RemoteId};

/// Request body wrapper used by create and update.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub calendar_event: T,
}

impl<T> Envelope<T> {
    pub fn new(calendar_event: T) -> Self {
        Envelope { calendar_event }
    }
}

/// Body of a create request: the full locally built event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEventRecord {
    pub id: EventId,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub title: String,
    pub description: String,
    #[serde(with = "wire_date")]
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&CalendarEvent> for NewEventRecord {
    fn from(event: &CalendarEvent) -> Self {
        NewEventRecord {
            id: event.id,
            kind: event.kind,
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Body of an update request: the edited fields, keyed by remote id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    pub id: RemoteId,
    pub title: String,
    #[serde(with = "wire_date")]
    pub date: NaiveDate,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl EventUpdate {
    pub fn new(id: RemoteId, draft: &EventDraft, now: DateTime<Utc>) -> Self {
        EventUpdate {
            id,
            title: draft.title.clone(),
            date: draft.date,
            description: draft.description.clone(),
            updated_at: now,
        }
    }
}

/// An event as listed by the remote service.
///
/// Every field may be missing or null on the wire; `into_event` decides
/// whether the record is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<RemoteId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl EventRecord {
    /// Convert into a local event under the given id.
    ///
    /// Missing timestamps fall back to `now`. A missing title or a missing
    /// or unparseable date is an error.
    pub fn into_event(self, id: EventId, now: DateTime<Utc>) -> CalGridResult<CalendarEvent> {
        let title = self
            .title
            .ok_or_else(|| CalGridError::InvalidEvent("record has no title".into()))?;
        let date = self
            .date
            .as_deref()
            .ok_or_else(|| CalGridError::InvalidDate("missing".into()))
            .and_then(parse_wire_date)?;
        let created_at = self
            .created_at
            .as_deref()
            .map(parse_wire_timestamp)
            .transpose()?
            .unwrap_or(now);
        let updated_at = self
            .updated_at
            .as_deref()
            .map(parse_wire_timestamp)
            .transpose()?
            .unwrap_or(created_at);

        Ok(CalendarEvent {
            id,
            remote_id: self.remote_id,
            kind: EventKind::Single,
            title,
            description: self.description.unwrap_or_default(),
            date,
            created_at,
            updated_at,
        })
    }
}

/// Decode a listing body.
///
/// The body must be a JSON array. Elements that do not have the shape of a
/// record (wrong field types, not an object) are skipped with a warning so
/// one bad record cannot hide the rest.
pub fn decode_listing(body: &[u8]) -> CalGridResult<Vec<EventRecord>> {
    let values: Vec<Value> = serde_json::from_slice(body)
        .map_err(|e| CalGridError::Serialization(format!("event listing: {e}")))?;

    Ok(values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed event record");
                None
            }
        })
        .collect())
}

/// Parse a serialized date into a calendar date.
///
/// Accepts `YYYY-MM-DD` as well as full RFC 3339 timestamps, whose calendar
/// day is taken as written (no timezone conversion).
pub fn parse_wire_date(s: &str) -> CalGridResult<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| CalGridError::InvalidDate(s.to_string()))
}

/// Parse a serialized timestamp. A bare date is read as midnight UTC.
pub fn parse_wire_timestamp(s: &str) -> CalGridResult<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| CalGridError::InvalidDate(s.to_string()))
}

/// Dates go out as `YYYY-MM-DD` and come back in either accepted form.
mod wire_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_wire_date(&s).map_err(de::Error::custom)
    }
}
