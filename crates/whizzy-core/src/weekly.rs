//! The home screen: one day of the group's schedule.
//!
//! Completion marks are local to a [`WeeklyView`] and are never written to
//! the store. Switching days clears them.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::{Result, WhizzyError};
use crate::groups::active_group;
use crate::model::{Group, ScheduledTask, UserId, Weekday};
use crate::store::DocumentStore;

/// Tasks stamped with exactly `day` (accent- and case-sensitive).
#[must_use]
pub fn filter_by_day<'a>(tasks: &'a [ScheduledTask], day: &str) -> Vec<&'a ScheduledTask> {
    tasks.iter().filter(|task| task.day == day).collect()
}

/// Parse a canonical weekday name.
///
/// # Errors
///
/// [`WhizzyError::InvalidWeekday`] for anything but `Lunes` … `Domingo`.
pub fn parse_day(raw: &str) -> Result<Weekday> {
    raw.parse()
        .map_err(|_| WhizzyError::InvalidWeekday(raw.to_string()))
}

/// Day picker plus ephemeral completion marks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklyView {
    day: Weekday,
    done: BTreeSet<String>,
}

impl WeeklyView {
    /// Open on the group's week-start day, or Lunes when it has none.
    #[must_use]
    pub fn for_group(group: &Group) -> Self {
        Self {
            day: group.week_start.unwrap_or_default(),
            done: BTreeSet::new(),
        }
    }

    #[must_use]
    pub const fn day(&self) -> Weekday {
        self.day
    }

    /// Switch days. All completion marks reset.
    pub fn select_day(&mut self, day: Weekday) {
        self.day = day;
        self.done.clear();
    }

    /// Flip the completion mark of `id`. Returns whether it is now done.
    pub fn toggle_done(&mut self, id: &str) -> bool {
        if self.done.remove(id) {
            false
        } else {
            self.done.insert(id.to_string());
            true
        }
    }

    #[must_use]
    pub fn is_done(&self, id: &str) -> bool {
        self.done.contains(id)
    }

    /// Rows for the selected day.
    #[must_use]
    pub fn entries<'a>(&self, tasks: &'a [ScheduledTask]) -> Vec<WeeklyEntry<'a>> {
        filter_by_day(tasks, self.day.as_str())
            .into_iter()
            .map(|task| WeeklyEntry {
                done: self.is_done(&task.id),
                task,
            })
            .collect()
    }
}

/// One row on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeeklyEntry<'a> {
    #[serde(flatten)]
    pub task: &'a ScheduledTask,
    pub done: bool,
}

/// The user's current group, ready for a [`WeeklyView`].
///
/// # Errors
///
/// Same as [`active_group`].
pub fn load_week<S: DocumentStore + ?Sized>(store: &S, user: &UserId) -> Result<(Group, WeeklyView)> {
    let group = active_group(store, user)?;
    let view = WeeklyView::for_group(&group);
    debug!(group = %group.id, day = %view.day(), tasks = group.tasks.len(), "week loaded");
    Ok((group, view))
}
