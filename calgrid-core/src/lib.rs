//! Core types for calgrid.
//!
//! This crate provides everything the calgrid CLI needs apart from rendering:
//! - `event` for calendar events and the drafts they are built from
//! - `month` and `grid` for deriving a month's day cells
//! - `store` for the optimistic, remotely synced event list
//! - `remote` for the HTTP event service client

pub mod config;
pub mod error;
pub mod event;
pub mod grid;
pub mod month;
pub mod remote;
pub mod store;

pub use error::{CalGridError, CalGridResult};
pub use event::{CalendarEvent, EventDraft, EventId, EventKind, RemoteId};
pub use grid::{DayCell, MonthGrid, build_month_grid};
pub use month::Month;
pub use store::EventStore;
