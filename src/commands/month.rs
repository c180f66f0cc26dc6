use anyhow::{Context, Result};
use calgrid_core::remote::RemoteEvents;
use calgrid_core::{EventStore, Month, MonthGrid};

use crate::render::Render;

pub async fn run<R: RemoteEvents + 'static>(store: &EventStore<R>, month: Month) -> Result<()> {
    let events = store.refresh().await.context("Failed to load events")?;
    let grid = MonthGrid::build(month, &events);

    println!("{}", grid.render());
    Ok(())
}
