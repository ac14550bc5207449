use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::{
    ExerciseRecord, ExerciseRecordID, InvalidOperation, ItemKey, OrderError, SectionID, SessionID,
    SupersetID, SupersetLink, UnifiedItem, build_unified_view,
    invariant::ensure_contiguous_positions,
    superset::{compact_display_numbers, next_display_number},
    superset_groups,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Move an item of a section's view to another index.
///
/// The index is clamped to the bounds of the view. Moving an item onto its
/// current index returns the collection unchanged.
pub fn move_item(
    exercises: &[ExerciseRecord],
    section_id: &SectionID,
    key: ItemKey,
    to_index: usize,
) -> Result<Vec<ExerciseRecord>, OrderError> {
    let session_id = session_of(exercises, key)?;
    let mut items = build_unified_view(exercises, session_id, section_id);

    if items.is_empty() {
        return Err(InvalidOperation::EmptySection(section_id.clone()).into());
    }

    let from_index = index_of(&items, key)?;
    let to_index = to_index.min(items.len() - 1);

    if from_index == to_index {
        return Ok(exercises.to_vec());
    }

    let item = items.remove(from_index);
    items.insert(to_index, item);

    let mut result = exercises.to_vec();
    relinearize(&mut result, session_id, &items);
    ensure_contiguous_positions(&result, session_id, [section_id])?;

    debug!("moved {key} in section {section_id} from {from_index} to {to_index}");

    Ok(result)
}

/// Move an item one step up or down. Items at the boundaries stay in place.
pub fn move_direction(
    exercises: &[ExerciseRecord],
    section_id: &SectionID,
    key: ItemKey,
    direction: Direction,
) -> Result<Vec<ExerciseRecord>, OrderError> {
    let session_id = session_of(exercises, key)?;
    let items = build_unified_view(exercises, session_id, section_id);
    let index = index_of(&items, key)?;

    let to_index = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => Some(index + 1).filter(|i| *i < items.len()),
    };

    match to_index {
        Some(to_index) => move_item(exercises, section_id, key, to_index),
        None => Ok(exercises.to_vec()),
    }
}

/// Group standalone exercises of a section into a new superset with the
/// given id.
///
/// The superset is shown in `host_section_id`. If that is the section the
/// exercises are selected from, the superset takes the place of the earliest
/// selected exercise, otherwise it is appended to the host section. A
/// superset with a single exercise is kept until the next structural change.
pub fn create_superset(
    exercises: &[ExerciseRecord],
    section_id: &SectionID,
    exercise_ids: &[ExerciseRecordID],
    host_section_id: &SectionID,
    superset_id: SupersetID,
) -> Result<Vec<ExerciseRecord>, OrderError> {
    let mut selected: Vec<ExerciseRecordID> = vec![];
    for id in exercise_ids {
        if !selected.contains(id) {
            selected.push(*id);
        }
    }

    let first = selected.first().ok_or(InvalidOperation::EmptySelection)?;
    let session_id = session_of(exercises, ItemKey::Exercise(*first))?;

    for id in &selected {
        let exercise = find(exercises, *id)?;
        if exercise.session_id != session_id {
            return Err(InvalidOperation::MixedSessions.into());
        }
    }

    if exercises.iter().any(|e| e.superset_id() == Some(superset_id)) {
        return Err(InvalidOperation::SupersetExists(superset_id).into());
    }

    let mut result = exercises.to_vec();
    let mut touched = BTreeSet::from([section_id.clone(), host_section_id.clone()]);
    dissolve_pending_supersets(&mut result, session_id, None, &mut touched);
    compact_display_numbers(&mut result, session_id);

    let mut members = vec![];
    for id in &selected {
        let exercise = find(&result, *id)?;
        if !exercise.is_standalone() {
            return Err(InvalidOperation::AlreadyInSuperset(*id).into());
        }
        if !exercise.is_shown_in(section_id) {
            return Err(InvalidOperation::OutsideSection(*id).into());
        }
        members.push((exercise.position, exercise.id));
    }
    members.sort_unstable();

    let link = SupersetLink {
        id: superset_id,
        display_number: next_display_number(&result, session_id),
    };
    let offset = (host_section_id != section_id)
        .then(|| next_position(&result, session_id, host_section_id));

    for ((_, id), index) in members.iter().zip(0..) {
        if let Some(exercise) = result
            .iter_mut()
            .find(|e| e.id == *id && e.session_id == session_id)
        {
            exercise.superset = Some(link);
            exercise.display_section_id = host_section_id.clone();
            if let Some(offset) = offset {
                exercise.position = offset + index;
            }
        }
    }

    finish(&mut result, session_id, &touched)?;

    debug!(
        "created superset {superset_id} ({}) with {} exercises in section {host_section_id}",
        link.display_number,
        members.len()
    );

    Ok(result)
}

/// Append an exercise to a superset.
///
/// An exercise that already exists as a standalone exercise of the session is
/// moved out of its section into the superset.
pub fn add_to_superset(
    exercises: &[ExerciseRecord],
    superset_id: SupersetID,
    new_exercise: ExerciseRecord,
) -> Result<Vec<ExerciseRecord>, OrderError> {
    let session_id = session_of(exercises, ItemKey::Superset(superset_id))?;

    if new_exercise.session_id != session_id {
        return Err(InvalidOperation::MixedSessions.into());
    }

    let mut result = exercises.to_vec();
    let mut touched = BTreeSet::new();

    if let Some(index) = result.iter().position(|e| e.id == new_exercise.id) {
        let existing = &result[index];
        if !existing.is_standalone() {
            return Err(InvalidOperation::AlreadyInSuperset(existing.id).into());
        }
        if existing.session_id != session_id {
            return Err(InvalidOperation::MixedSessions.into());
        }
        touched.insert(existing.section_id.clone());
        result.remove(index);
    }

    dissolve_pending_supersets(&mut result, session_id, Some(superset_id), &mut touched);
    compact_display_numbers(&mut result, session_id);

    let indices = member_indices(&result, superset_id);
    let first = indices
        .first()
        .ok_or(OrderError::NotFound(ItemKey::Superset(superset_id)))?;
    let host_section_id = result[*first].display_section_id.clone();
    let link = result[*first].superset;
    let position = indices
        .iter()
        .map(|i| result[*i].position)
        .max()
        .unwrap_or_default()
        .saturating_add(1);

    let mut exercise = new_exercise;
    exercise.superset = link;
    exercise.display_section_id = host_section_id.clone();
    exercise.position = position;
    let id = exercise.id;
    result.push(exercise);

    touched.insert(host_section_id);
    finish(&mut result, session_id, &touched)?;

    debug!("added exercise {id} to superset {superset_id}");

    Ok(result)
}

/// Delete a member of a superset.
///
/// A superset left with fewer than two exercises is dissolved. Its remaining
/// exercise becomes standalone in its home section.
pub fn remove_from_superset(
    exercises: &[ExerciseRecord],
    superset_id: SupersetID,
    exercise_id: ExerciseRecordID,
) -> Result<Vec<ExerciseRecord>, OrderError> {
    let session_id = session_of(exercises, ItemKey::Superset(superset_id))?;
    let index = exercises
        .iter()
        .position(|e| e.id == exercise_id && e.superset_id() == Some(superset_id))
        .ok_or(OrderError::NotFound(ItemKey::Exercise(exercise_id)))?;

    let mut result = exercises.to_vec();
    let removed = result.remove(index);
    let mut touched = BTreeSet::from([removed.display_section_id]);

    if member_indices(&result, superset_id).len() < 2 {
        debug!("dissolving superset {superset_id}");
        release_members(&mut result, session_id, superset_id, &mut touched);
    }

    dissolve_pending_supersets(&mut result, session_id, None, &mut touched);
    compact_display_numbers(&mut result, session_id);
    finish(&mut result, session_id, &touched)?;

    debug!("removed exercise {exercise_id} from superset {superset_id}");

    Ok(result)
}

/// Dissolve a superset.
///
/// Exercises hosted in their home section become standalone in place. An
/// exercise from another section can only be shown there as part of a
/// superset and is therefore deleted.
pub fn dissolve_superset(
    exercises: &[ExerciseRecord],
    superset_id: SupersetID,
) -> Result<Vec<ExerciseRecord>, OrderError> {
    let session_id = session_of(exercises, ItemKey::Superset(superset_id))?;

    let mut result = exercises.to_vec();
    let mut touched = result
        .iter()
        .filter(|e| e.superset_id() == Some(superset_id))
        .map(|e| e.display_section_id.clone())
        .collect::<BTreeSet<_>>();

    result.retain(|e| e.superset_id() != Some(superset_id) || !e.is_foreign());
    for exercise in result
        .iter_mut()
        .filter(|e| e.superset_id() == Some(superset_id))
    {
        exercise.detach();
    }

    dissolve_pending_supersets(&mut result, session_id, None, &mut touched);
    compact_display_numbers(&mut result, session_id);
    finish(&mut result, session_id, &touched)?;

    debug!("dissolved superset {superset_id}");

    Ok(result)
}

/// Add a standalone exercise at the end of its home section.
pub fn add_exercise(
    exercises: &[ExerciseRecord],
    exercise: ExerciseRecord,
) -> Result<Vec<ExerciseRecord>, OrderError> {
    if exercise.superset.is_some() {
        return Err(InvalidOperation::SupersetLinkOnNewExercise(exercise.id).into());
    }
    if exercises.iter().any(|e| e.id == exercise.id) {
        return Err(InvalidOperation::DuplicateExercise(exercise.id).into());
    }

    let session_id = exercise.session_id;
    let section_id = exercise.section_id.clone();

    let mut exercise = exercise;
    exercise.display_section_id = section_id.clone();
    exercise.position = next_position(exercises, session_id, &section_id);
    let id = exercise.id;

    let mut result = exercises.to_vec();
    result.push(exercise);
    finish(&mut result, session_id, &BTreeSet::from([section_id.clone()]))?;

    debug!("added exercise {id} to section {section_id}");

    Ok(result)
}

/// Delete an exercise, dissolving its superset if necessary.
pub fn remove_exercise(
    exercises: &[ExerciseRecord],
    exercise_id: ExerciseRecordID,
) -> Result<Vec<ExerciseRecord>, OrderError> {
    let exercise = find(exercises, exercise_id)?;

    if let Some(superset_id) = exercise.superset_id() {
        return remove_from_superset(exercises, superset_id, exercise_id);
    }

    let session_id = exercise.session_id;
    let mut touched = BTreeSet::from([exercise.section_id.clone()]);

    let mut result = exercises
        .iter()
        .filter(|e| e.id != exercise_id)
        .cloned()
        .collect::<Vec<_>>();
    dissolve_pending_supersets(&mut result, session_id, None, &mut touched);
    compact_display_numbers(&mut result, session_id);
    finish(&mut result, session_id, &touched)?;

    debug!("removed exercise {exercise_id}");

    Ok(result)
}

/// Show a superset in another section, appended after its last item.
pub fn move_superset(
    exercises: &[ExerciseRecord],
    superset_id: SupersetID,
    host_section_id: &SectionID,
) -> Result<Vec<ExerciseRecord>, OrderError> {
    let session_id = session_of(exercises, ItemKey::Superset(superset_id))?;

    let mut result = exercises.to_vec();
    let indices = member_indices(&result, superset_id);
    let mut touched = indices
        .iter()
        .map(|i| result[*i].display_section_id.clone())
        .collect::<BTreeSet<_>>();

    if touched.len() == 1 && touched.contains(host_section_id) {
        return Ok(result);
    }

    touched.insert(host_section_id.clone());
    dissolve_pending_supersets(&mut result, session_id, Some(superset_id), &mut touched);
    compact_display_numbers(&mut result, session_id);

    let offset = next_position(&result, session_id, host_section_id);
    for (i, position) in member_indices(&result, superset_id).into_iter().zip(offset..) {
        result[i].display_section_id = host_section_id.clone();
        result[i].position = position;
    }

    finish(&mut result, session_id, &touched)?;

    debug!("moved superset {superset_id} to section {host_section_id}");

    Ok(result)
}

fn session_of(exercises: &[ExerciseRecord], key: ItemKey) -> Result<SessionID, OrderError> {
    exercises
        .iter()
        .find(|e| match key {
            ItemKey::Exercise(id) => e.id == id,
            ItemKey::Superset(id) => e.superset_id() == Some(id),
        })
        .map(|e| e.session_id)
        .ok_or(OrderError::NotFound(key))
}

fn find(exercises: &[ExerciseRecord], id: ExerciseRecordID) -> Result<&ExerciseRecord, OrderError> {
    exercises
        .iter()
        .find(|e| e.id == id)
        .ok_or(OrderError::NotFound(ItemKey::Exercise(id)))
}

fn index_of(items: &[UnifiedItem], key: ItemKey) -> Result<usize, OrderError> {
    items
        .iter()
        .position(|item| item.key() == key)
        .ok_or(OrderError::NotFound(key))
}

/// Indices of the members of a superset ordered by position and id.
fn member_indices(exercises: &[ExerciseRecord], superset_id: SupersetID) -> Vec<usize> {
    let mut indices = exercises
        .iter()
        .enumerate()
        .filter(|(_, e)| e.superset_id() == Some(superset_id))
        .map(|(i, _)| i)
        .collect::<Vec<_>>();
    indices.sort_by_key(|i| (exercises[*i].position, exercises[*i].id));
    indices
}

fn next_position(exercises: &[ExerciseRecord], session_id: SessionID, section_id: &SectionID) -> u32 {
    exercises
        .iter()
        .filter(|e| e.session_id == session_id && e.is_shown_in(section_id))
        .map(|e| e.position.saturating_add(1))
        .max()
        .unwrap_or_default()
}

/// Assign consecutive positions to the exercises of the given items.
fn relinearize(exercises: &mut [ExerciseRecord], session_id: SessionID, items: &[UnifiedItem]) {
    let positions = items
        .iter()
        .flat_map(UnifiedItem::exercises)
        .map(|e| e.id)
        .zip(0..)
        .collect::<HashMap<ExerciseRecordID, u32>>();

    for exercise in exercises.iter_mut().filter(|e| e.session_id == session_id) {
        if let Some(position) = positions.get(&exercise.id) {
            exercise.position = *position;
        }
    }
}

/// Renumber the touched sections in view order and verify the result.
fn finish(
    exercises: &mut [ExerciseRecord],
    session_id: SessionID,
    touched: &BTreeSet<SectionID>,
) -> Result<(), OrderError> {
    for section_id in touched {
        let items = build_unified_view(exercises, session_id, section_id);
        relinearize(exercises, session_id, &items);
    }
    ensure_contiguous_positions(exercises, session_id, touched)
}

/// Turn the members of a superset into standalone exercises. Members hosted
/// outside their home section are appended to it.
fn release_members(
    exercises: &mut [ExerciseRecord],
    session_id: SessionID,
    superset_id: SupersetID,
    touched: &mut BTreeSet<SectionID>,
) {
    for i in member_indices(exercises, superset_id) {
        touched.insert(exercises[i].display_section_id.clone());
        touched.insert(exercises[i].section_id.clone());
        if exercises[i].is_foreign() {
            let position = next_position(exercises, session_id, &exercises[i].section_id);
            exercises[i].position = position;
        }
        exercises[i].detach();
    }
}

/// Dissolve supersets that were left with a single exercise.
fn dissolve_pending_supersets(
    exercises: &mut [ExerciseRecord],
    session_id: SessionID,
    except: Option<SupersetID>,
    touched: &mut BTreeSet<SectionID>,
) {
    let pending = superset_groups(exercises, session_id)
        .into_iter()
        .filter(|g| g.needs_more_exercises() && Some(g.id) != except)
        .map(|g| g.id)
        .collect::<Vec<_>>();

    for superset_id in pending {
        debug!("dissolving pending superset {superset_id}");
        release_members(exercises, session_id, superset_id, touched);
    }
}
