use anyhow::Result;
use calgrid_core::remote::RemoteEvents;
use calgrid_core::{EventDraft, EventStore};
use owo_colors::OwoColorize;

use super::parse_day;
use crate::render::Render;

pub async fn run<R: RemoteEvents + 'static>(
    store: &EventStore<R>,
    title: String,
    date: &str,
    description: String,
) -> Result<()> {
    let draft = EventDraft::new(title, parse_day(date)?, description);
    let event = store.create(draft)?;

    // The remote create runs in the background; wait for it before exiting.
    store.settle().await;

    println!("{} {}", "Created".green(), event.render());
    Ok(())
}
