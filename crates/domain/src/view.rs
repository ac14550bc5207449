use std::collections::{HashMap, HashSet};

use derive_more::Display;
use log::warn;

use crate::{ExerciseRecord, ExerciseRecordID, SectionID, SessionID, SupersetGroup, SupersetID};

/// Element of the ordered view of a section.
#[derive(Debug, Clone, PartialEq)]
pub enum UnifiedItem {
    Exercise(ExerciseRecord),
    Superset(SupersetGroup),
}

impl UnifiedItem {
    #[must_use]
    pub fn key(&self) -> ItemKey {
        match self {
            UnifiedItem::Exercise(exercise) => ItemKey::Exercise(exercise.id),
            UnifiedItem::Superset(group) => ItemKey::Superset(group.id),
        }
    }

    #[must_use]
    pub fn position(&self) -> u32 {
        match self {
            UnifiedItem::Exercise(exercise) => exercise.position,
            UnifiedItem::Superset(group) => group.position(),
        }
    }

    /// Exercises covered by the item in display order.
    #[must_use]
    pub fn exercises(&self) -> &[ExerciseRecord] {
        match self {
            UnifiedItem::Exercise(exercise) => std::slice::from_ref(exercise),
            UnifiedItem::Superset(group) => &group.exercises,
        }
    }
}

/// Identifies an item of the ordered view.
#[derive(Debug, Display, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ItemKey {
    #[display("exercise {_0}")]
    Exercise(ExerciseRecordID),
    #[display("superset {_0}")]
    Superset(SupersetID),
}

impl From<ExerciseRecordID> for ItemKey {
    fn from(value: ExerciseRecordID) -> Self {
        ItemKey::Exercise(value)
    }
}

impl From<SupersetID> for ItemKey {
    fn from(value: SupersetID) -> Self {
        ItemKey::Superset(value)
    }
}

/// Derive the ordered view of a section from the flat exercise collection.
///
/// Standalone exercises are shown in their home section, superset members in
/// the host section of their superset. Every superset becomes a single item
/// whose ordering key is the lowest position among its members. Items with
/// equal keys keep the order in which they were encountered.
#[must_use]
pub fn build_unified_view(
    exercises: &[ExerciseRecord],
    session_id: SessionID,
    section_id: &SectionID,
) -> Vec<UnifiedItem> {
    enum Entry<'a> {
        Exercise(&'a ExerciseRecord),
        Superset(SupersetID),
    }

    let mut entries = vec![];
    let mut members: HashMap<SupersetID, Vec<&ExerciseRecord>> = HashMap::new();
    let mut seen = HashSet::new();

    for exercise in exercises.iter().filter(|e| e.session_id == session_id) {
        if !exercise.is_shown_in(section_id) {
            continue;
        }
        if !seen.insert(exercise.id) {
            warn!(
                "ignoring duplicate exercise {} in section {section_id}",
                exercise.id
            );
            continue;
        }
        match exercise.superset_id() {
            None => entries.push(Entry::Exercise(exercise)),
            Some(superset_id) => {
                let group = members.entry(superset_id).or_default();
                if group.is_empty() {
                    entries.push(Entry::Superset(superset_id));
                }
                group.push(exercise);
            }
        }
    }

    let mut items = entries
        .into_iter()
        .filter_map(|entry| match entry {
            Entry::Exercise(exercise) => Some(UnifiedItem::Exercise(exercise.clone())),
            Entry::Superset(id) => {
                let mut group = members.remove(&id)?;
                group.sort_by_key(|e| (e.position, e.id));
                let display_number = group.first()?.display_number().unwrap_or_default();
                Some(UnifiedItem::Superset(SupersetGroup {
                    id,
                    display_number,
                    host_section_id: section_id.clone(),
                    exercises: group.into_iter().cloned().collect(),
                }))
            }
        })
        .collect::<Vec<_>>();
    items.sort_by_key(UnifiedItem::position);
    items
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::tests::data::{SESSION, exercise, ids, keys, member};

    use super::*;

    fn view(exercises: &[ExerciseRecord], section: &str) -> Vec<UnifiedItem> {
        build_unified_view(exercises, SESSION.into(), &section.into())
    }

    #[test]
    fn test_build_unified_view_empty() {
        assert!(view(&[], "gym").is_empty());
    }

    #[test]
    fn test_build_unified_view() {
        let exercises = vec![
            exercise(1, "gym", 3),
            member(2, "gym", "gym", 10, 1, 2),
            exercise(3, "gym", 0),
            member(4, "gym", "gym", 10, 1, 1),
            exercise(5, "sprint", 1),
        ];

        let result = view(&exercises, "gym");

        assert_eq!(
            keys(&result),
            vec![
                ItemKey::Exercise(3.into()),
                ItemKey::Superset(10.into()),
                ItemKey::Exercise(1.into()),
            ]
        );
        assert_eq!(
            result[1],
            UnifiedItem::Superset(SupersetGroup {
                id: 10.into(),
                display_number: 1,
                host_section_id: "gym".into(),
                exercises: vec![exercises[3].clone(), exercises[1].clone()],
            })
        );
        assert_eq!(result[1].position(), 1);
    }

    #[rstest]
    #[case::home_section("sprint", vec![ItemKey::Exercise(2.into())])]
    #[case::host_section(
        "gym",
        vec![ItemKey::Exercise(1.into()), ItemKey::Superset(10.into())]
    )]
    fn test_build_unified_view_cross_section_member(
        #[case] section: &str,
        #[case] expected: Vec<ItemKey>,
    ) {
        let exercises = vec![
            exercise(1, "gym", 0),
            member(3, "sprint", "gym", 10, 1, 1),
            member(4, "gym", "gym", 10, 1, 2),
            exercise(2, "sprint", 0),
        ];

        assert_eq!(keys(&view(&exercises, section)), expected);
    }

    #[test]
    fn test_build_unified_view_orders_members_by_position_and_id() {
        let exercises = vec![
            member(3, "gym", "gym", 10, 1, 0),
            member(2, "gym", "gym", 10, 1, 1),
            member(1, "gym", "gym", 10, 1, 1),
        ];

        let result = view(&exercises, "gym");

        assert_eq!(
            result[0]
                .exercises()
                .iter()
                .map(|e| e.id)
                .collect::<Vec<_>>(),
            ids(&[3, 1, 2])
        );
    }

    #[test]
    fn test_build_unified_view_keeps_encounter_order_on_equal_positions() {
        let exercises = vec![
            exercise(2, "gym", 0),
            exercise(1, "gym", 0),
            member(3, "gym", "gym", 10, 1, 0),
        ];

        assert_eq!(
            keys(&view(&exercises, "gym")),
            vec![
                ItemKey::Exercise(2.into()),
                ItemKey::Exercise(1.into()),
                ItemKey::Superset(10.into()),
            ]
        );
    }

    #[test]
    fn test_build_unified_view_ignores_duplicates() {
        let mut duplicate = member(1, "gym", "gym", 10, 1, 5);
        duplicate.prescription.sets = 3;
        let exercises = vec![
            member(1, "gym", "gym", 10, 1, 0),
            member(2, "gym", "gym", 10, 1, 1),
            duplicate,
        ];

        let result = view(&exercises, "gym");

        assert_eq!(
            result[0].exercises(),
            &[exercises[0].clone(), exercises[1].clone()]
        );
    }

    #[test]
    fn test_build_unified_view_ignores_other_sessions() {
        let mut other = exercise(2, "gym", 0);
        other.session_id = 2.into();

        assert_eq!(
            keys(&view(&[exercise(1, "gym", 1), other], "gym")),
            vec![ItemKey::Exercise(1.into())]
        );
    }

    #[test]
    fn test_build_unified_view_is_idempotent() {
        let exercises = vec![
            exercise(1, "gym", 4),
            member(2, "sprint", "gym", 10, 2, 2),
            member(3, "gym", "gym", 10, 2, 2),
            exercise(4, "gym", 0),
            member(5, "gym", "gym", 20, 1, 7),
            member(6, "gym", "gym", 20, 1, 6),
        ];

        assert_eq!(view(&exercises, "gym"), view(&exercises, "gym"));
    }

    #[test]
    fn test_item_key_display() {
        assert_eq!(
            ItemKey::Exercise(1.into()).to_string(),
            "exercise 00000000-0000-0000-0000-000000000001"
        );
        assert_eq!(
            ItemKey::Superset(2.into()).to_string(),
            "superset 00000000-0000-0000-0000-000000000002"
        );
    }
}
