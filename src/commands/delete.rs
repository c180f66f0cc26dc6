use anyhow::{Context, Result};
use calgrid_core::remote::RemoteEvents;
use calgrid_core::{EventStore, RemoteId};
use owo_colors::OwoColorize;

use crate::render::Render;

pub async fn run<R: RemoteEvents + 'static>(store: &EventStore<R>, id: &str) -> Result<()> {
    let remote_id = RemoteId::new(id);

    store.refresh().await.context("Failed to load events")?;
    let target = store.find_remote(&remote_id);

    store.delete(&remote_id);
    store.settle().await;

    // A failed delete resynchronizes the store, so the event shows up again.
    if store.find_remote(&remote_id).is_some() {
        anyhow::bail!("The event service did not delete {remote_id}; local list resynchronized");
    }

    match target {
        Some(event) => println!("{} {}", "Deleted".red(), event.render()),
        None => println!("{} {}", "Sent delete for".red(), remote_id),
    }
    Ok(())
}
