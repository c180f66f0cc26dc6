use anyhow::{Context, Result};
use calgrid_core::remote::RemoteEvents;
use calgrid_core::{CalendarEvent, EventStore};
use owo_colors::OwoColorize;

use crate::render::{Render, pluralize};

pub async fn run<R: RemoteEvents + 'static>(store: &EventStore<R>) -> Result<()> {
    let mut events = store.refresh().await.context("Failed to load events")?;

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    sort_for_listing(&mut events);

    for event in &events {
        println!("{}  {}", event.date.format("%Y-%m-%d"), event.render());
    }

    println!("\n{}", summary(&events).dimmed());
    Ok(())
}

/// Event count, noting any the service returned without an id.
fn summary(events: &[CalendarEvent]) -> String {
    let mut line = format!("{} {}", events.len(), pluralize("event", events.len()));
    let unsynced = events.iter().filter(|e| !e.is_persisted()).count();
    if unsynced > 0 {
        line.push_str(&format!(" ({unsynced} without a remote id)"));
    }
    line
}

/// Order by date; events on the same day keep the order the service returned.
fn sort_for_listing(events: &mut [CalendarEvent]) {
    events.sort_by_key(|e| e.date);
}
