use std::collections::{BTreeSet, HashSet};

use crate::{
    ExerciseRecord, InvariantViolation, OrderError, SectionID, SessionID, UnifiedItem,
    build_unified_view, superset_groups,
};

/// Check that a session's exercise collection is well-formed.
///
/// Positions only have to be unique per item of a section. Stored data may
/// contain gaps, which the next write operation on the section removes. A
/// superset with a single exercise is valid until the next structural
/// operation dissolves it.
pub fn check_invariants(
    exercises: &[ExerciseRecord],
    session_id: SessionID,
) -> Result<(), OrderError> {
    let session = exercises
        .iter()
        .filter(|e| e.session_id == session_id)
        .collect::<Vec<_>>();

    let mut ids = HashSet::new();
    for exercise in &session {
        if !ids.insert(exercise.id) {
            return Err(InvariantViolation::DuplicateExercise(exercise.id).into());
        }
        if exercise.is_standalone() && exercise.is_foreign() {
            return Err(InvariantViolation::StandaloneOutsideHome(exercise.id).into());
        }
    }

    let groups = superset_groups(exercises, session_id);
    for group in &groups {
        if group
            .exercises
            .iter()
            .any(|e| e.display_section_id != group.host_section_id)
        {
            return Err(InvariantViolation::HostMismatch(group.id).into());
        }
        if group
            .exercises
            .iter()
            .any(|e| e.display_number() != Some(group.display_number))
        {
            return Err(InvariantViolation::DisplayNumberMismatch(group.id).into());
        }
    }

    let numbers = groups.iter().map(|g| g.display_number).collect::<Vec<_>>();
    if !numbers.iter().zip(1..).all(|(number, expected)| *number == expected) {
        return Err(InvariantViolation::DisplayNumberGap(numbers).into());
    }

    let sections = session
        .iter()
        .map(|e| e.display_section_id.clone())
        .collect::<BTreeSet<_>>();
    for section_id in sections {
        let mut positions = HashSet::new();
        for item in build_unified_view(exercises, session_id, &section_id) {
            if !positions.insert(item.position()) {
                return Err(InvariantViolation::DuplicatePosition {
                    section_id,
                    position: item.position(),
                }
                .into());
            }
        }
    }

    Ok(())
}

/// Verify that the exercises of each section are numbered `0..N` in view order.
pub(crate) fn ensure_contiguous_positions<'a>(
    exercises: &[ExerciseRecord],
    session_id: SessionID,
    sections: impl IntoIterator<Item = &'a SectionID>,
) -> Result<(), OrderError> {
    for section_id in sections {
        let positions = build_unified_view(exercises, session_id, section_id)
            .iter()
            .flat_map(UnifiedItem::exercises)
            .map(|e| e.position)
            .collect::<Vec<_>>();

        let mut seen = HashSet::new();
        if let Some(position) = positions.iter().find(|p| !seen.insert(**p)) {
            return Err(InvariantViolation::DuplicatePosition {
                section_id: section_id.clone(),
                position: *position,
            }
            .into());
        }

        if !positions
            .iter()
            .zip(0..)
            .all(|(position, expected)| *position == expected)
        {
            return Err(InvariantViolation::PositionGap {
                section_id: section_id.clone(),
                positions,
            }
            .into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::tests::data::{SESSION, exercise, member};

    use super::*;

    #[rstest]
    #[case::sections_with_supersets(vec![
        exercise(1, "gym", 0),
        member(2, "gym", "gym", 10, 2, 1),
        member(3, "sprint", "gym", 10, 2, 2),
        exercise(4, "gym", 5),
        member(5, "sprint", "sprint", 20, 1, 0),
        member(6, "sprint", "sprint", 20, 1, 1),
        exercise(7, "sprint", 2),
    ])]
    #[case::pending_superset(vec![exercise(1, "gym", 0), member(2, "gym", "gym", 10, 1, 1)])]
    #[case::pending_superset_in_other_section(vec![
        exercise(1, "gym", 0),
        member(2, "sprint", "gym", 10, 1, 1),
        exercise(3, "sprint", 0),
    ])]
    fn test_check_invariants(#[case] exercises: Vec<ExerciseRecord>) {
        assert_eq!(check_invariants(&exercises, SESSION.into()), Ok(()));
    }

    #[rstest]
    #[case::duplicate_exercise(
        vec![exercise(1, "gym", 0), exercise(1, "gym", 1)],
        InvariantViolation::DuplicateExercise(1.into())
    )]
    #[case::standalone_outside_home(
        vec![{
            let mut e = exercise(1, "sprint", 0);
            e.display_section_id = "gym".into();
            e
        }],
        InvariantViolation::StandaloneOutsideHome(1.into())
    )]
    #[case::host_mismatch(
        vec![member(1, "gym", "gym", 10, 1, 0), member(2, "gym", "sprint", 10, 1, 1)],
        InvariantViolation::HostMismatch(10.into())
    )]
    #[case::display_number_mismatch(
        vec![member(1, "gym", "gym", 10, 1, 0), member(2, "gym", "gym", 10, 2, 1)],
        InvariantViolation::DisplayNumberMismatch(10.into())
    )]
    #[case::display_number_gap(
        vec![
            member(1, "gym", "gym", 10, 1, 0),
            member(2, "gym", "gym", 10, 1, 1),
            member(3, "gym", "gym", 20, 3, 2),
            member(4, "gym", "gym", 20, 3, 3),
        ],
        InvariantViolation::DisplayNumberGap(vec![1, 3])
    )]
    #[case::duplicate_position(
        vec![exercise(1, "gym", 0), member(2, "gym", "gym", 10, 1, 0), member(3, "gym", "gym", 10, 1, 1)],
        InvariantViolation::DuplicatePosition { section_id: "gym".into(), position: 0 }
    )]
    fn test_check_invariants_violation(
        #[case] exercises: Vec<ExerciseRecord>,
        #[case] expected: InvariantViolation,
    ) {
        assert_eq!(
            check_invariants(&exercises, SESSION.into()),
            Err(OrderError::InvariantViolation(expected))
        );
    }

    #[rstest]
    #[case::contiguous(vec![exercise(1, "gym", 0), exercise(2, "gym", 1)], Ok(()))]
    #[case::gap(
        vec![exercise(1, "gym", 0), exercise(2, "gym", 2)],
        Err(InvariantViolation::PositionGap { section_id: "gym".into(), positions: vec![0, 2] })
    )]
    #[case::duplicate(
        vec![exercise(1, "gym", 0), exercise(2, "gym", 0)],
        Err(InvariantViolation::DuplicatePosition { section_id: "gym".into(), position: 0 })
    )]
    fn test_ensure_contiguous_positions(
        #[case] exercises: Vec<ExerciseRecord>,
        #[case] expected: Result<(), InvariantViolation>,
    ) {
        assert_eq!(
            ensure_contiguous_positions(&exercises, SESSION.into(), &[SectionID::from("gym")]),
            expected.map_err(OrderError::from)
        );
    }
}
