//! TUI rendering traits for calgrid types.
//!
//! This module provides extension traits that add colored terminal rendering
//! to calgrid-core types using owo_colors.

use calgrid_core::{CalendarEvent, DayCell, MonthGrid};
use chrono::Datelike;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// Width of one day column, including the separating space.
const CELL_WIDTH: usize = 3;

impl Render for CalendarEvent {
    fn render(&self) -> String {
        let remote = match &self.remote_id {
            Some(id) => format!("[{id}]"),
            None => "[unsynced]".to_string(),
        };
        let mut line = format!("{} {}", self.title, remote.dimmed());
        if !self.description.is_empty() {
            line.push_str(&format!(" {}", format!("- {}", self.description).dimmed()));
        }
        line
    }
}

impl Render for DayCell {
    fn render(&self) -> String {
        let mut lines = vec![self.date.format("%a %b %-d").to_string().bold().to_string()];
        lines.extend(self.events.iter().map(|e| format!("  • {}", e.render())));
        lines.join("\n")
    }
}

impl Render for MonthGrid {
    fn render(&self) -> String {
        let mut lines = grid_lines(self);

        let days: Vec<_> = self.cells.iter().filter(|c| !c.events.is_empty()).collect();
        lines.push(String::new());
        if days.is_empty() {
            lines.push("No events this month".dimmed().to_string());
        } else {
            for (i, cell) in days.iter().enumerate() {
                if i > 0 {
                    lines.push(String::new());
                }
                lines.push(cell.render());
            }
        }

        lines.join("\n")
    }
}

/// The calendar block: title, weekday header and one row per week.
fn grid_lines(grid: &MonthGrid) -> Vec<String> {
    let width = CELL_WIDTH * 7 - 1;
    let title = format!("{} {}", grid.month.name(), grid.month.year());

    let mut lines = vec![
        format!("{:^width$}", title).bold().to_string(),
        WEEKDAYS.join(" ").dimmed().to_string(),
    ];

    for week in grid.weeks() {
        let row: Vec<String> = week
            .iter()
            .map(|slot| match slot {
                Some(cell) => render_day_number(cell),
                None => "  ".to_string(),
            })
            .collect();
        lines.push(row.join(" "));
    }

    lines
}

/// Two-column day number; days holding events stand out.
fn render_day_number(cell: &DayCell) -> String {
    let number = format!("{:>2}", cell.date.day());
    if cell.events.is_empty() {
        number
    } else {
        number.cyan().bold().to_string()
    }
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calgrid_core::{EventDraft, EventId, Month, RemoteId};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn event(title: &str, day: u32) -> CalendarEvent {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut event = CalendarEvent::single(
            EventId(u64::from(day)),
            EventDraft::new(title, NaiveDate::from_ymd_opt(2024, 3, day).unwrap(), ""),
            now,
        );
        event.remote_id = Some(RemoteId::new(format!("r{day}")));
        event
    }

    #[test]
    fn grid_has_header_weekdays_and_week_rows() {
        let grid = MonthGrid::build(Month::new(2024, 3).unwrap(), &[]);
        let lines = grid_lines(&grid);

        assert!(lines[0].contains("March 2024"));
        assert!(lines[1].contains("Mo Tu We Th Fr Sa Su"));
        assert_eq!(lines.len(), 2 + 5);
        // 1 March 2024 is a Friday: four blank columns come first.
        assert_eq!(lines[2].split('1').next(), Some(" ".repeat(13).as_str()));
    }

    #[test]
    fn agenda_lists_days_with_events() {
        let grid = MonthGrid::build(
            Month::new(2024, 3).unwrap(),
            &[event("Dentist", 5), event("Gym", 5)],
        );
        let out = grid.render();

        assert!(out.contains("Tue Mar 5"));
        assert!(out.contains("Dentist"));
        assert!(out.contains("r5"));
        assert!(!out.contains("No events this month"));
    }

    #[test]
    fn empty_month_says_so() {
        let grid = MonthGrid::build(Month::new(2024, 3).unwrap(), &[]);
        assert!(grid.render().contains("No events this month"));
    }

    #[test]
    fn unsynced_events_are_marked() {
        let mut e = event("Draft", 7);
        e.remote_id = None;
        assert!(e.render().contains("unsynced"));
    }

    #[test]
    fn pluralize_counts() {
        assert_eq!(pluralize("event", 1), "event");
        assert_eq!(pluralize("event", 3), "events");
    }
}
