use derive_more::{AsRef, Deref, Display};
use uuid::Uuid;

use crate::{SupersetID, SupersetLink};

/// An exercise placed in a session of a plan.
///
/// Only the identifiers, the section fields, the superset link and the
/// position take part in ordering. `exercise_id` and `prescription` are
/// carried along unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseRecord {
    pub id: ExerciseRecordID,
    pub session_id: SessionID,
    /// Home section of the exercise.
    pub section_id: SectionID,
    /// Section the exercise is rendered in. Differs from the home section
    /// only for members of a superset hosted elsewhere.
    pub display_section_id: SectionID,
    pub superset: Option<SupersetLink>,
    pub position: u32,
    pub exercise_id: ExerciseID,
    pub prescription: Prescription,
}

impl ExerciseRecord {
    #[must_use]
    pub fn new(
        id: ExerciseRecordID,
        session_id: SessionID,
        section_id: SectionID,
        exercise_id: ExerciseID,
    ) -> Self {
        Self {
            id,
            session_id,
            display_section_id: section_id.clone(),
            section_id,
            superset: None,
            position: 0,
            exercise_id,
            prescription: Prescription::default(),
        }
    }

    #[must_use]
    pub fn superset_id(&self) -> Option<SupersetID> {
        self.superset.map(|link| link.id)
    }

    #[must_use]
    pub fn display_number(&self) -> Option<u32> {
        self.superset.map(|link| link.display_number)
    }

    #[must_use]
    pub fn is_standalone(&self) -> bool {
        self.superset.is_none()
    }

    /// Whether the exercise belongs to the ordered view of the given section.
    ///
    /// Superset members are shown in the host section of their superset,
    /// standalone exercises in their home section.
    #[must_use]
    pub fn is_shown_in(&self, section_id: &SectionID) -> bool {
        if self.is_standalone() {
            self.section_id == *section_id
        } else {
            self.display_section_id == *section_id
        }
    }

    /// Whether the exercise is displayed outside of its home section.
    #[must_use]
    pub fn is_foreign(&self) -> bool {
        self.display_section_id != self.section_id
    }

    pub(crate) fn detach(&mut self) {
        self.superset = None;
        self.display_section_id = self.section_id.clone();
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Prescription {
    pub sets: u32,
    pub reps: Option<u32>,
    pub time: Option<u32>,
    pub weight: Option<f32>,
    pub rpe: Option<f32>,
    pub notes: String,
}

#[derive(Deref, Debug, Display, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseRecordID(Uuid);

impl ExerciseRecordID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for ExerciseRecordID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseRecordID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Deref, Debug, Display, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionID(Uuid);

impl SessionID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for SessionID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for SessionID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Reference into the exercise catalog.
#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(Uuid);

impl ExerciseID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for ExerciseID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Section of a session, e.g. `warm-up`, `gym` or `sprint`.
#[derive(AsRef, Debug, Display, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SectionID(String);

impl From<&str> for SectionID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SectionID {
    fn from(value: String) -> Self {
        Self(value)
    }
}
