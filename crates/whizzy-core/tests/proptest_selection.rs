use proptest::prelude::*;
use std::collections::BTreeSet;
use whizzy_core::model::{ScheduledTask, Weekday};
use whizzy_core::selection::TaskSelection;
use whizzy_core::weekly::filter_by_day;

fn arb_day_name() -> impl Strategy<Value = String> {
    prop_oneof![
        (0..7_usize).prop_map(|i| Weekday::ALL[i].as_str().to_string()),
        Just("Miercoles".to_string()),
        Just("viernes".to_string()),
        Just(String::new()),
    ]
}

fn arb_tasks() -> impl Strategy<Value = Vec<ScheduledTask>> {
    prop::collection::vec(
        ("[0-9]{1,2}", arb_day_name(), 0..50_u32).prop_map(|(id, day, points)| ScheduledTask {
            title: format!("tarea {id}"),
            id,
            points,
            day,
        }),
        0..24,
    )
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn toggle_twice_is_identity(
        seed in prop::collection::vec("[0-9]{1,2}", 0..10),
        id in "[0-9]{1,2}",
    ) {
        let mut selection = TaskSelection::default();
        for s in &seed {
            if !selection.is_selected(s) {
                selection.toggle(s);
            }
        }
        let before = selection.clone();
        selection.toggle(&id);
        selection.toggle(&id);
        prop_assert_eq!(selection, before);
    }

    #[test]
    fn toggle_matches_set_symmetric_difference(ids in prop::collection::vec("[0-9]{1,2}", 0..30)) {
        let mut selection = TaskSelection::default();
        let mut model = BTreeSet::new();
        for id in &ids {
            selection.toggle(id);
            if !model.remove(id) {
                model.insert(id.clone());
            }
        }
        let got: BTreeSet<String> = selection.selected().map(str::to_string).collect();
        prop_assert_eq!(got, model);
    }

    #[test]
    fn filter_keeps_exactly_matching_day(tasks in arb_tasks(), day in 0..7_usize) {
        let day = Weekday::ALL[day].as_str();
        let filtered = filter_by_day(&tasks, day);

        prop_assert!(filtered.iter().all(|t| t.day == day));
        let expected = tasks.iter().filter(|t| t.day == day).count();
        prop_assert_eq!(filtered.len(), expected);

        let original_order: Vec<_> = tasks.iter().filter(|t| t.day == day).collect();
        prop_assert_eq!(filtered, original_order);
    }
}
