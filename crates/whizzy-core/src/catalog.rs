//! The fixed chore catalog.
//!
//! Two variants are offered: a "simple" catalog grouped by room and a flat
//! "detailed" one. Ids are unique across both.

use serde::Serialize;

use crate::model::CatalogTask;

/// A room heading in the simple catalog.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogSection {
    pub title: &'static str,
    pub tasks: &'static [CatalogTask],
}

const fn task(id: &'static str, title: &'static str, points: u32) -> CatalogTask {
    CatalogTask { id, title, points }
}

pub const SIMPLE_SECTIONS: &[CatalogSection] = &[
    CatalogSection {
        title: "Cocina",
        tasks: &[
            task("1", "Fregar los platos", 15),
            task("2", "Limpiar la cocina", 25),
            task("3", "Poner la mesa", 10),
            task("4", "Poner lavavajillas", 10),
            task("5", "Preparar una comida", 35),
        ],
    },
    CatalogSection {
        title: "Habitación",
        tasks: &[task("6", "Doblar y guardar", 15)],
    },
    CatalogSection {
        title: "Salón",
        tasks: &[task("7", "Quitar la mesa", 10)],
    },
    CatalogSection {
        title: "Baño",
        tasks: &[task("8", "Recoger lavavajillas", 15)],
    },
    CatalogSection {
        title: "Pasillo",
        tasks: &[task("9", "Barrido", 10)],
    },
    CatalogSection {
        title: "Terraza",
        tasks: &[task("10", "Regar plantas", 20)],
    },
];

pub const DETAILED_TASKS: &[CatalogTask] = &[
    task("11", "Fregar los platos", 15),
    task("12", "Limpiar el refrigerador", 25),
    task("13", "Limpiar horno", 30),
    task("14", "Limpiar la mesa", 15),
    task("15", "Limpiar microondas", 20),
    task("16", "Limpiar muebles cocina", 25),
    task("17", "Limpiar nevera", 30),
];

/// Which catalog tab is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogMode {
    #[default]
    Simple,
    Detailed,
}

impl CatalogMode {
    /// Chores listed under this tab, in display order.
    #[must_use]
    pub fn tasks(self) -> Vec<&'static CatalogTask> {
        match self {
            Self::Simple => SIMPLE_SECTIONS
                .iter()
                .flat_map(|section| section.tasks.iter())
                .collect(),
            Self::Detailed => DETAILED_TASKS.iter().collect(),
        }
    }
}

/// Every chore, simple sections first, then the detailed list.
pub fn all_tasks() -> impl Iterator<Item = &'static CatalogTask> {
    SIMPLE_SECTIONS
        .iter()
        .flat_map(|section| section.tasks.iter())
        .chain(DETAILED_TASKS.iter())
}

/// Look a chore up by id.
#[must_use]
pub fn find(id: &str) -> Option<&'static CatalogTask> {
    all_tasks().find(|task| task.id == id)
}

#[cfg(test)]
mod tests {
    use super::{CatalogMode, all_tasks, find};
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_across_catalogs() {
        let mut seen = HashSet::new();
        for task in all_tasks() {
            assert!(seen.insert(task.id), "duplicate catalog id {}", task.id);
        }
        assert_eq!(seen.len(), 17);
    }

    #[test]
    fn modes_partition_the_catalog() {
        let simple = CatalogMode::Simple.tasks();
        let detailed = CatalogMode::Detailed.tasks();
        assert_eq!(simple.len(), 10);
        assert_eq!(detailed.len(), 7);
        assert_eq!(simple.len() + detailed.len(), all_tasks().count());
    }

    #[test]
    fn find_returns_points() {
        let task = find("3").expect("Poner la mesa");
        assert_eq!(task.title, "Poner la mesa");
        assert_eq!(task.points, 10);
        assert!(find("99").is_none());
    }

    #[test]
    fn default_mode_is_simple() {
        assert_eq!(CatalogMode::default(), CatalogMode::Simple);
    }
}
