//! Choosing chores from the catalog and scheduling them on a day.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

use crate::catalog;
use crate::error::{Result, WhizzyError};
use crate::groups::active_group;
use crate::model::{Group, ScheduledTask, UserId, Weekday};
use crate::store::{DocumentStore, GroupPatch};

/// In-progress selection on the scheduling screen.
///
/// Lives only as long as the screen; nothing here is persisted until
/// [`submit_selection`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskSelection {
    pub day: Weekday,
    selected: BTreeSet<String>,
}

impl TaskSelection {
    #[must_use]
    pub fn new(day: Weekday) -> Self {
        Self {
            day,
            ..Self::default()
        }
    }

    /// Flip membership of `id`. Returns whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    #[must_use = "iterators are lazy"]
    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// The selected chores stamped with the chosen day, in catalog order.
    ///
    /// # Errors
    ///
    /// [`WhizzyError::EmptySelection`] when nothing is selected,
    /// [`WhizzyError::UnknownTask`] for an id outside the catalog.
    pub fn to_scheduled(&self) -> Result<Vec<ScheduledTask>> {
        if self.selected.is_empty() {
            return Err(WhizzyError::EmptySelection);
        }
        if let Some(unknown) = self.selected.iter().find(|id| catalog::find(id).is_none()) {
            return Err(WhizzyError::UnknownTask(unknown.clone()));
        }
        Ok(catalog::all_tasks()
            .filter(|task| self.selected.contains(task.id))
            .map(|task| task.schedule(self.day))
            .collect())
    }
}

/// Replace the current group's task list with the selection.
///
/// This overwrites: tasks previously scheduled on other days are dropped.
/// The invite code is left as it is.
///
/// # Errors
///
/// Selection errors are returned before any store call; otherwise the
/// errors of [`active_group`].
pub fn submit_selection<S: DocumentStore + ?Sized>(
    store: &S,
    user: &UserId,
    selection: &TaskSelection,
) -> Result<Group> {
    let tasks = selection.to_scheduled()?;
    let mut group = active_group(store, user)?;
    store.update_group(
        &group.id,
        &GroupPatch {
            tasks: Some(tasks.clone()),
            ..GroupPatch::default()
        },
    )?;
    info!(group = %group.id, day = %selection.day, count = tasks.len(), "task list replaced");
    group.tasks = tasks;
    Ok(group)
}
