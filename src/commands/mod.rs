pub mod config;
pub mod delete;
pub mod list;
pub mod month;
pub mod new;
pub mod update;

use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Parse a `YYYY-MM-DD` day given on the command line.
pub fn parse_day(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{input}'. Expected YYYY-MM-DD"))
}
