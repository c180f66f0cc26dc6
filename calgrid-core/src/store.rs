//! Optimistic event store synced with a remote service.
//!
//! Every mutation is applied to the local list first and then sent to the
//! remote in a background task. Create and update failures are only logged;
//! a failed delete triggers a full refresh so the list matches the remote
//! again. Call `settle` to wait for background syncs before shutting down.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::CalGridResult;
use crate::event::{CalendarEvent, EventDraft, EventId, RemoteId};
use crate::remote::RemoteEvents;
use crate::remote::protocol::EventUpdate;

/// The session's event list and its link to the remote service.
///
/// Cloning is cheap and shares the same list. Mutating methods spawn tokio
/// tasks, so they must be called from within a runtime.
pub struct EventStore<R> {
    inner: Arc<Inner<R>>,
}

struct Inner<R> {
    remote: R,
    events: Mutex<Vec<CalendarEvent>>,
    /// Creation counter; owned by this store so separate stores never share ids.
    next_id: AtomicU64,
    pending: Mutex<JoinSet<()>>,
}

impl<R> Clone for EventStore<R> {
    fn clone(&self) -> Self {
        EventStore {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R: RemoteEvents + 'static> EventStore<R> {
    pub fn new(remote: R) -> Self {
        EventStore {
            inner: Arc::new(Inner {
                remote,
                events: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                pending: Mutex::new(JoinSet::new()),
            }),
        }
    }

    #[cfg(test)]
    fn remote(&self) -> &R {
        &self.inner.remote
    }

    /// Snapshot of the current list, in insertion order.
    pub fn events(&self) -> Vec<CalendarEvent> {
        lock(&self.inner.events).clone()
    }

    pub fn get(&self, id: EventId) -> Option<CalendarEvent> {
        lock(&self.inner.events).iter().find(|e| e.id == id).cloned()
    }

    pub fn find_remote(&self, remote_id: &RemoteId) -> Option<CalendarEvent> {
        lock(&self.inner.events)
            .iter()
            .find(|e| e.remote_id.as_ref() == Some(remote_id))
            .cloned()
    }

    /// Append a new event locally and send it to the remote in the background.
    ///
    /// A failed remote create is logged and the local event is kept.
    pub fn create(&self, draft: EventDraft) -> CalGridResult<CalendarEvent> {
        draft.validate()?;

        let event = CalendarEvent::single(self.inner.next_id(), draft, Utc::now());
        lock(&self.inner.events).push(event.clone());
        debug!(id = %event.id, title = %event.title, "created event locally");

        let inner = Arc::clone(&self.inner);
        let outgoing = event.clone();
        self.spawn(async move {
            if let Err(e) = inner.remote.create(&outgoing).await {
                warn!(id = %outgoing.id, error = %e, "remote create failed; keeping local event");
            }
        });

        Ok(event)
    }

    /// Replace the whole local list with what the remote holds.
    pub async fn refresh(&self) -> CalGridResult<Vec<CalendarEvent>> {
        self.inner.refresh().await
    }

    /// Merge the draft into the event with `remote_id` and send the update in the background.
    ///
    /// The request is sent even when no local event matches. A failed remote
    /// update is logged and the local change is kept.
    pub fn update(&self, remote_id: &RemoteId, draft: EventDraft) -> CalGridResult<()> {
        draft.validate()?;

        let now = Utc::now();
        {
            let mut events = lock(&self.inner.events);
            match events.iter_mut().find(|e| e.remote_id.as_ref() == Some(remote_id)) {
                Some(event) => event.apply(&draft, now),
                None => debug!(%remote_id, "no local event to update"),
            }
        }

        let inner = Arc::clone(&self.inner);
        let update = EventUpdate::new(remote_id.clone(), &draft, now);
        self.spawn(async move {
            if let Err(e) = inner.remote.update(&update).await {
                warn!(remote_id = %update.id, error = %e, "remote update failed; keeping local change");
            }
        });

        Ok(())
    }

    /// Remove the event with `remote_id` locally and delete it remotely in the background.
    ///
    /// If the remote delete fails for any reason, the list is refreshed from the remote.
    pub fn delete(&self, remote_id: &RemoteId) {
        lock(&self.inner.events).retain(|e| e.remote_id.as_ref() != Some(remote_id));

        let inner = Arc::clone(&self.inner);
        let remote_id = remote_id.clone();
        self.spawn(async move {
            if let Err(e) = inner.remote.delete(&remote_id).await {
                warn!(%remote_id, error = %e, "remote delete failed; resynchronizing");
                if let Err(e) = inner.refresh().await {
                    warn!(error = %e, "resynchronization after failed delete also failed");
                }
            }
        });
    }

    /// Wait for every background sync started so far, including ones started
    /// while waiting.
    pub async fn settle(&self) {
        loop {
            let mut tasks = std::mem::take(&mut *lock(&self.inner.pending));
            if tasks.is_empty() {
                return;
            }
            while let Some(result) = tasks.join_next().await {
                if let Err(e) = result {
                    warn!(error = %e, "background sync task did not complete");
                }
            }
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let mut pending = lock(&self.inner.pending);
        while let Some(finished) = pending.try_join_next() {
            if let Err(e) = finished {
                warn!(error = %e, "background sync task did not complete");
            }
        }
        pending.spawn(task);
    }
}

impl<R: RemoteEvents> Inner<R> {
    fn next_id(&self) -> EventId {
        EventId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    async fn refresh(&self) -> CalGridResult<Vec<CalendarEvent>> {
        let records = self.remote.list().await?;
        let now = Utc::now();

        let mut fresh = Vec::with_capacity(records.len());
        for record in records {
            let remote_id = record.remote_id.clone();
            match record.into_event(self.next_id(), now) {
                Ok(event) => fresh.push(event),
                Err(e) => warn!(?remote_id, error = %e, "skipping unreadable event from remote"),
            }
        }

        info!(count = fresh.len(), "refreshed events from remote");
        *lock(&self.events) = fresh.clone();
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalGridError;
    use crate::remote::HttpRemote;
    use crate::remote::protocol::EventRecord;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use std::time::Duration;

    /// In-memory remote that behaves like the event service.
    #[derive(Default)]
    struct FakeRemote {
        records: Mutex<Vec<EventRecord>>,
        next_remote_id: AtomicU64,
        fail_writes: bool,
        /// Deletes go through this client, which points at a closed port.
        offline_deletes: Option<HttpRemote>,
        updates: Mutex<Vec<EventUpdate>>,
        deletes: Mutex<Vec<RemoteId>>,
        lists: AtomicU64,
    }

    impl FakeRemote {
        fn failing() -> Self {
            FakeRemote {
                fail_writes: true,
                ..Default::default()
            }
        }

        /// Reads and writes work, but every delete fails to connect.
        fn unreachable_for_deletes() -> Self {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);

            FakeRemote {
                offline_deletes: Some(
                    HttpRemote::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap(),
                ),
                ..Default::default()
            }
        }

        fn seed(&self, remote_id: &str, title: &str, date: &str) {
            lock(&self.records).push(EventRecord {
                remote_id: Some(RemoteId::new(remote_id)),
                title: Some(title.to_string()),
                date: Some(date.to_string()),
                ..Default::default()
            });
        }

        fn refused() -> CalGridError {
            CalGridError::Status {
                status: 500,
                body: "nope".into(),
            }
        }
    }

    #[async_trait]
    impl RemoteEvents for FakeRemote {
        async fn list(&self) -> CalGridResult<Vec<EventRecord>> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            Ok(lock(&self.records).clone())
        }

        async fn create(&self, event: &CalendarEvent) -> CalGridResult<()> {
            if self.fail_writes {
                return Err(Self::refused());
            }
            let n = self.next_remote_id.fetch_add(1, Ordering::SeqCst);
            lock(&self.records).push(EventRecord {
                remote_id: Some(RemoteId::new(format!("r{n}"))),
                title: Some(event.title.clone()),
                description: Some(event.description.clone()),
                date: Some(event.date.format("%Y-%m-%d").to_string()),
                created_at: Some(event.created_at.to_rfc3339()),
                updated_at: Some(event.updated_at.to_rfc3339()),
            });
            Ok(())
        }

        async fn update(&self, update: &EventUpdate) -> CalGridResult<()> {
            lock(&self.updates).push(update.clone());
            if self.fail_writes {
                return Err(Self::refused());
            }
            if let Some(record) = lock(&self.records)
                .iter_mut()
                .find(|r| r.remote_id.as_ref() == Some(&update.id))
            {
                record.title = Some(update.title.clone());
                record.date = Some(update.date.format("%Y-%m-%d").to_string());
                record.description = Some(update.description.clone());
            }
            Ok(())
        }

        async fn delete(&self, id: &RemoteId) -> CalGridResult<()> {
            lock(&self.deletes).push(id.clone());
            if let Some(offline) = &self.offline_deletes {
                return offline.delete(id).await;
            }
            if self.fail_writes {
                return Err(Self::refused());
            }
            lock(&self.records).retain(|r| r.remote_id.as_ref() != Some(id));
            Ok(())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft(title: &str, on: NaiveDate) -> EventDraft {
        EventDraft::new(title, on, "notes")
    }

    #[tokio::test]
    async fn create_appends_immediately_with_increasing_ids() {
        let store = EventStore::new(FakeRemote::default());

        let a = store.create(draft("a", date(2024, 3, 5))).unwrap();
        let b = store.create(draft("b", date(2024, 3, 6))).unwrap();

        assert!(a.id < b.id);
        assert_eq!(a.created_at, a.updated_at);
        let ids: Vec<_> = store.events().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
        store.settle().await;
    }

    #[tokio::test]
    async fn separate_stores_do_not_share_ids() {
        let first = EventStore::new(FakeRemote::default());
        let second = EventStore::new(FakeRemote::default());

        let a = first.create(draft("a", date(2024, 3, 5))).unwrap();
        let b = second.create(draft("b", date(2024, 3, 5))).unwrap();

        assert_eq!(a.id, EventId(1));
        assert_eq!(b.id, EventId(1));
    }

    #[tokio::test]
    async fn create_rejects_blank_title() {
        let store = EventStore::new(FakeRemote::default());

        assert!(store.create(draft("  ", date(2024, 3, 5))).is_err());
        assert!(store.events().is_empty());
    }

    #[tokio::test]
    async fn create_then_refresh_picks_up_remote_id() {
        let store = EventStore::new(FakeRemote::default());
        store.create(draft("Dentist", date(2024, 3, 5))).unwrap();
        store.settle().await;

        let events = store.refresh().await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Dentist");
        assert_eq!(events[0].date, date(2024, 3, 5));
        assert_eq!(events[0].description, "notes");
        assert!(events[0].remote_id.is_some());
    }

    #[tokio::test]
    async fn failed_create_keeps_local_event() {
        let store = EventStore::new(FakeRemote::failing());

        let event = store.create(draft("offline", date(2024, 3, 5))).unwrap();
        store.settle().await;

        assert_eq!(store.get(event.id), Some(event));
        assert_eq!(store.remote().lists.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn refresh_assigns_fresh_unique_ids() {
        let remote = FakeRemote::default();
        remote.seed("x", "one", "2024-03-05");
        remote.seed("y", "two", "2024-03-06");
        let store = EventStore::new(remote);
        let local = store.create(draft("local", date(2024, 3, 1))).unwrap();
        store.settle().await;

        let events = store.refresh().await.unwrap();
        let ids: HashSet<_> = events.iter().map(|e| e.id).collect();

        assert_eq!(ids.len(), events.len());
        assert!(events.iter().all(|e| e.id > local.id));
    }

    #[tokio::test]
    async fn refresh_skips_unreadable_records() {
        let remote = FakeRemote::default();
        remote.seed("good", "fine", "2024-03-05");
        remote.seed("bad", "broken", "someday");
        let store = EventStore::new(remote);

        let events = store.refresh().await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "fine");
    }

    #[tokio::test]
    async fn update_merges_locally_and_sends_request() {
        let remote = FakeRemote::default();
        remote.seed("r-1", "before", "2024-03-05");
        let store = EventStore::new(remote);
        store.refresh().await.unwrap();
        let before = store.find_remote(&RemoteId::new("r-1")).unwrap();

        store
            .update(&RemoteId::new("r-1"), EventDraft::new("after", date(2024, 3, 9), "moved"))
            .unwrap();

        let after = store.get(before.id).unwrap();
        assert_eq!(after.title, "after");
        assert_eq!(after.date, date(2024, 3, 9));
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);

        store.settle().await;
        let sent = lock(&store.remote().updates).clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].id, RemoteId::new("r-1"));
    }

    #[tokio::test]
    async fn failed_update_keeps_local_change() {
        let remote = FakeRemote::failing();
        remote.seed("r-1", "before", "2024-03-05");
        let store = EventStore::new(remote);
        store.refresh().await.unwrap();

        store
            .update(&RemoteId::new("r-1"), EventDraft::new("after", date(2024, 3, 5), ""))
            .unwrap();
        store.settle().await;

        assert_eq!(store.find_remote(&RemoteId::new("r-1")).unwrap().title, "after");
        assert_eq!(store.remote().lists.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn update_without_local_match_still_sends_request() {
        let store = EventStore::new(FakeRemote::default());

        store
            .update(&RemoteId::new("ghost"), draft("x", date(2024, 3, 5)))
            .unwrap();
        store.settle().await;

        assert!(store.events().is_empty());
        assert_eq!(lock(&store.remote().updates).len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_immediately() {
        let remote = FakeRemote::default();
        remote.seed("r-1", "gone", "2024-03-05");
        remote.seed("r-2", "stays", "2024-03-06");
        let store = EventStore::new(remote);
        store.refresh().await.unwrap();

        store.delete(&RemoteId::new("r-1"));

        assert!(store.find_remote(&RemoteId::new("r-1")).is_none());
        assert!(store.find_remote(&RemoteId::new("r-2")).is_some());
        store.settle().await;
        assert_eq!(*lock(&store.remote().deletes), vec![RemoteId::new("r-1")]);
        assert_eq!(lock(&store.remote().records).len(), 1);
    }

    #[tokio::test]
    async fn failed_delete_resynchronizes_from_remote() {
        let remote = FakeRemote::failing();
        remote.seed("r-1", "survivor", "2024-03-05");
        let store = EventStore::new(remote);
        store.refresh().await.unwrap();

        store.delete(&RemoteId::new("r-1"));
        assert!(store.events().is_empty());

        store.settle().await;

        let restored = store.find_remote(&RemoteId::new("r-1")).unwrap();
        assert_eq!(restored.title, "survivor");
        assert_eq!(store.remote().lists.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn delete_transport_failure_resynchronizes_from_remote() {
        let remote = FakeRemote::unreachable_for_deletes();
        remote.seed("r-1", "survivor", "2024-03-05");
        remote.seed("r-2", "neighbour", "2024-03-06");
        let store = EventStore::new(remote);
        store.refresh().await.unwrap();

        store.delete(&RemoteId::new("r-1"));
        assert!(store.find_remote(&RemoteId::new("r-1")).is_none());

        store.settle().await;

        assert_eq!(store.remote().lists.load(Ordering::SeqCst), 2);
        assert_eq!(store.events().len(), 2);
        assert_eq!(store.find_remote(&RemoteId::new("r-1")).unwrap().title, "survivor");
    }

    #[tokio::test]
    async fn refresh_skips_records_missing_fields() {
        let remote = FakeRemote::default();
        remote.seed("good", "fine", "2024-03-05");
        lock(&remote.records).push(EventRecord {
            remote_id: Some(RemoteId::new("no-date")),
            title: Some("undated".into()),
            ..Default::default()
        });
        lock(&remote.records).push(EventRecord {
            remote_id: Some(RemoteId::new("no-title")),
            date: Some("2024-03-07".into()),
            ..Default::default()
        });
        let store = EventStore::new(remote);

        let events = store.refresh().await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].remote_id, Some(RemoteId::new("good")));
    }
}
