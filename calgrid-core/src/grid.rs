//! Month grid: one cell per calendar day, each holding that day's events.

use chrono::{Datelike, NaiveDate};

use crate::event::CalendarEvent;
use crate::month::Month;

/// A single calendar day and the events that fall on it.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    /// In source-list order, not sorted.
    pub events: Vec<CalendarEvent>,
}

/// Build the day cells for `month`, from the 1st through the last day.
///
/// Each event is attached to the cell whose date it falls on; events outside
/// the month are left out. The result is rebuilt from scratch on every call.
pub fn build_month_grid(month: Month, events: &[CalendarEvent]) -> Vec<DayCell> {
    month
        .first_day()
        .iter_days()
        .take_while(|day| *day <= month.last_day())
        .map(|date| DayCell {
            date,
            events: events.iter().filter(|e| e.falls_on(date)).cloned().collect(),
        })
        .collect()
}

/// A month together with its day cells.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid {
    pub month: Month,
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    pub fn build(month: Month, events: &[CalendarEvent]) -> Self {
        MonthGrid {
            month,
            cells: build_month_grid(month, events),
        }
    }

    /// Lay the cells out in Monday-first weeks, padding with `None` before the
    /// 1st and after the last day.
    pub fn weeks(&self) -> Vec<[Option<&DayCell>; 7]> {
        let lead = self.month.first_day().weekday().num_days_from_monday() as usize;

        let mut slots: Vec<Option<&DayCell>> = vec![None; lead];
        slots.extend(self.cells.iter().map(Some));
        while slots.len() % 7 != 0 {
            slots.push(None);
        }

        slots
            .chunks(7)
            .map(|week| [week[0], week[1], week[2], week[3], week[4], week[5], week[6]])
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.cells.iter().map(|c| c.events.len()).sum()
    }
}
