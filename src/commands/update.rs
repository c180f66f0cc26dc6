use anyhow::{Context, Result};
use calgrid_core::remote::RemoteEvents;
use calgrid_core::{EventDraft, EventStore, RemoteId};
use owo_colors::OwoColorize;

use super::parse_day;
use crate::render::Render;

pub async fn run<R: RemoteEvents + 'static>(
    store: &EventStore<R>,
    id: &str,
    title: String,
    date: &str,
    description: String,
) -> Result<()> {
    let remote_id = RemoteId::new(id);
    let draft = EventDraft::new(title, parse_day(date)?, description);

    store.refresh().await.context("Failed to load events")?;
    if store.find_remote(&remote_id).is_none() {
        tracing::warn!(%remote_id, "event not in the current list; sending the update anyway");
    }

    store.update(&remote_id, draft)?;
    store.settle().await;

    match store.find_remote(&remote_id) {
        Some(event) => println!("{} {}", "Updated".yellow(), event.render()),
        None => println!("{} {}", "Sent update for".yellow(), remote_id),
    }
    Ok(())
}
