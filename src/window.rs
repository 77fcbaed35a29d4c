//! Arithmétique de fenêtres de dates fermées `[start, end]`, en jours.

use crate::model::{AssignmentDates, Kit, Show};
use crate::planner::PlanError;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fenêtre fermée : les deux bornes sont des jours occupés.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PlanError> {
        if end < start {
            return Err(PlanError::InvalidRange(format!(
                "window end {end} is before start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Nombre de jours couverts (bornes incluses).
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Élargit la fenêtre de `days` jours de chaque côté, bornée au
    /// calendrier représentable.
    pub fn widen(&self, days: u64) -> Self {
        Self {
            start: self.start.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN),
            end: self.end.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX),
        }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Surcharges applicables au calcul de la fenêtre tamponnée.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowOverrides {
    pub ship_date: Option<NaiveDate>,
    pub return_arrival_date: Option<NaiveDate>,
    /// Remplace les délais aller et retour du kit.
    pub buffer_days: Option<u32>,
}

impl From<&AssignmentDates> for WindowOverrides {
    fn from(dates: &AssignmentDates) -> Self {
        Self {
            ship_date: dates.ship_date,
            return_arrival_date: dates.return_arrival_date,
            buffer_days: None,
        }
    }
}

/// Fenêtre occupée par `kit` pour `show`, délais de transport compris.
///
/// Une date d'expédition ou de retour explicite remplace le délai du côté
/// correspondant.
pub fn buffered_window(
    show: &Show,
    kit: &Kit,
    overrides: &WindowOverrides,
) -> Result<DateWindow, PlanError> {
    let (Some(show_start), Some(show_end)) = (show.start, show.end) else {
        return Err(PlanError::InvalidRange(format!(
            "show {} has no start or end date",
            show.id
        )));
    };

    let ship_days = overrides.buffer_days.unwrap_or(kit.default_ship_days);
    let return_days = overrides.buffer_days.unwrap_or(kit.default_return_days);

    let start = match overrides.ship_date {
        Some(date) => date,
        None => show_start
            .checked_sub_days(Days::new(u64::from(ship_days)))
            .ok_or_else(|| {
                PlanError::InvalidRange(format!(
                    "{ship_days} shipping day(s) before {show_start} is out of calendar range"
                ))
            })?,
    };
    let end = match overrides.return_arrival_date {
        Some(date) => date,
        None => show_end
            .checked_add_days(Days::new(u64::from(return_days)))
            .ok_or_else(|| {
                PlanError::InvalidRange(format!(
                    "{return_days} return day(s) after {show_end} is out of calendar range"
                ))
            })?,
    };

    DateWindow::new(start, end)
}

/// Chevauchement de fenêtres fermées : se toucher compte.
pub fn overlaps(a: &DateWindow, b: &DateWindow) -> bool {
    a.start.max(b.start) <= a.end.min(b.end)
}

pub fn overlap_days(a: &DateWindow, b: &DateWindow) -> i64 {
    let days = (a.end.min(b.end) - a.start.max(b.start)).num_days() + 1;
    days.max(0)
}
