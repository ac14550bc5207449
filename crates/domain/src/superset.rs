use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{ExerciseRecord, ExerciseRecordID, SectionID, SessionID};

#[derive(Deref, Debug, Display, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SupersetID(Uuid);

impl SupersetID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub(crate) fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for SupersetID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for SupersetID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Membership of an exercise in a superset, stored on every member.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct SupersetLink {
    pub id: SupersetID,
    pub display_number: u32,
}

/// A superset as reconstructed from its members.
#[derive(Debug, Clone, PartialEq)]
pub struct SupersetGroup {
    pub id: SupersetID,
    pub display_number: u32,
    pub host_section_id: SectionID,
    /// Members ordered by position, ties broken by id.
    pub exercises: Vec<ExerciseRecord>,
}

impl SupersetGroup {
    /// Ordering key of the group among the other items of its section.
    #[must_use]
    pub fn position(&self) -> u32 {
        self.exercises
            .iter()
            .map(|e| e.position)
            .min()
            .unwrap_or_default()
    }

    /// A group with a single member is only allowed until the next
    /// structural change of the session.
    #[must_use]
    pub fn needs_more_exercises(&self) -> bool {
        self.exercises.len() < 2
    }

    #[must_use]
    pub fn label(&self) -> String {
        format!("Superset {}", self.display_number)
    }

    pub fn exercise_ids(&self) -> impl Iterator<Item = ExerciseRecordID> + '_ {
        self.exercises.iter().map(|e| e.id)
    }
}

/// All live supersets of a session regardless of their host section,
/// ordered by display number.
#[must_use]
pub fn superset_groups(exercises: &[ExerciseRecord], session_id: SessionID) -> Vec<SupersetGroup> {
    let mut members: BTreeMap<SupersetID, Vec<ExerciseRecord>> = BTreeMap::new();

    for exercise in exercises.iter().filter(|e| e.session_id == session_id) {
        if let Some(superset_id) = exercise.superset_id() {
            let group = members.entry(superset_id).or_default();
            if group.iter().all(|e| e.id != exercise.id) {
                group.push(exercise.clone());
            }
        }
    }

    let mut groups = members
        .into_iter()
        .filter_map(|(id, mut exercises)| {
            exercises.sort_by_key(|e| (e.position, e.id));
            let first = exercises.first()?;
            Some(SupersetGroup {
                id,
                display_number: first.display_number().unwrap_or_default(),
                host_section_id: first.display_section_id.clone(),
                exercises,
            })
        })
        .collect::<Vec<_>>();
    groups.sort_by_key(|g| (g.display_number, g.id));
    groups
}

/// Smallest positive display number not used by a live superset of the session.
pub(crate) fn next_display_number(exercises: &[ExerciseRecord], session_id: SessionID) -> u32 {
    let used = exercises
        .iter()
        .filter(|e| e.session_id == session_id)
        .filter_map(ExerciseRecord::display_number)
        .collect::<BTreeSet<_>>();

    let mut number = 1;
    for n in used {
        if n == number {
            number += 1;
        } else if n > number {
            break;
        }
    }
    number
}

/// Renumber the live supersets of a session to `1..=N`, keeping their
/// relative order.
pub(crate) fn compact_display_numbers(exercises: &mut [ExerciseRecord], session_id: SessionID) {
    let mut numbered = exercises
        .iter()
        .filter(|e| e.session_id == session_id)
        .filter_map(|e| e.superset)
        .map(|link| (link.display_number, link.id))
        .collect::<Vec<_>>();
    numbered.sort_unstable();

    let mut seen = HashSet::new();
    let renumbered = numbered
        .into_iter()
        .filter(|(_, id)| seen.insert(*id))
        .zip(1..)
        .map(|((_, id), number)| (id, number))
        .collect::<HashMap<SupersetID, u32>>();

    for exercise in exercises.iter_mut().filter(|e| e.session_id == session_id) {
        if let Some(link) = exercise.superset.as_mut() {
            if let Some(number) = renumbered.get(&link.id) {
                link.display_number = *number;
            }
        }
    }
}
