//! The remote event service the store syncs with.

pub mod http;
pub mod protocol;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::CalGridResult;
use crate::event::{CalendarEvent, RemoteId};
use crate::remote::protocol::{EventRecord, EventUpdate};

pub use http::HttpRemote;

/// CRUD access to the remote source of truth for events.
///
/// Implementations report both transport failures and non-success statuses
/// as errors; the store decides what each failure means.
#[async_trait]
pub trait RemoteEvents: Send + Sync {
    /// Fetch every event the service holds.
    async fn list(&self) -> CalGridResult<Vec<EventRecord>>;

    /// Persist a newly created event.
    async fn create(&self, event: &CalendarEvent) -> CalGridResult<()>;

    /// Apply edited fields to the event with `update.id`.
    async fn update(&self, update: &EventUpdate) -> CalGridResult<()>;

    async fn delete(&self, id: &RemoteId) -> CalGridResult<()>;
}

#[async_trait]
impl<T: RemoteEvents + ?Sized> RemoteEvents for Arc<T> {
    async fn list(&self) -> CalGridResult<Vec<EventRecord>> {
        (**self).list().await
    }

    async fn create(&self, event: &CalendarEvent) -> CalGridResult<()> {
        (**self).create(event).await
    }

    async fn update(&self, update: &EventUpdate) -> CalGridResult<()> {
        (**self).update(update).await
    }

    async fn delete(&self, id: &RemoteId) -> CalGridResult<()> {
        (**self).delete(id).await
    }
}
