use crate::{ExerciseRecordID, ItemKey, SectionID, SupersetID};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("{0} not found")]
    NotFound(ItemKey),
    #[error(transparent)]
    InvalidOperation(#[from] InvalidOperation),
    #[error(transparent)]
    InvariantViolation(#[from] InvariantViolation),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidOperation {
    #[error("no exercises selected")]
    EmptySelection,
    #[error("section {0} is empty")]
    EmptySection(SectionID),
    #[error("exercise {0} is already part of a superset")]
    AlreadyInSuperset(ExerciseRecordID),
    #[error("exercise {0} is not shown in the selected section")]
    OutsideSection(ExerciseRecordID),
    #[error("exercises belong to different sessions")]
    MixedSessions,
    #[error("exercise {0} already exists")]
    DuplicateExercise(ExerciseRecordID),
    #[error("new exercise {0} must not be linked to a superset")]
    SupersetLinkOnNewExercise(ExerciseRecordID),
    #[error("superset {0} already exists")]
    SupersetExists(SupersetID),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("exercise {0} occurs more than once")]
    DuplicateExercise(ExerciseRecordID),
    #[error("members of superset {0} are shown in different sections")]
    HostMismatch(SupersetID),
    #[error("members of superset {0} have different display numbers")]
    DisplayNumberMismatch(SupersetID),
    #[error("display numbers are not contiguous ({0:?})")]
    DisplayNumberGap(Vec<u32>),
    #[error("standalone exercise {0} is shown outside its home section")]
    StandaloneOutsideHome(ExerciseRecordID),
    #[error("position {position} is used more than once in section {section_id}")]
    DuplicatePosition { section_id: SectionID, position: u32 },
    #[error("positions in section {section_id} are not contiguous ({positions:?})")]
    PositionGap {
        section_id: SectionID,
        positions: Vec<u32>,
    },
}

/// Error of an operation of the plan service.
#[derive(thiserror::Error, Debug)]
pub enum PlanError {
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("conflict")]
    Conflict,
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<ReadError> for PlanError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::Storage(storage) => PlanError::Storage(storage),
            ReadError::Other(other) => PlanError::Other(other),
        }
    }
}

impl From<UpdateError> for PlanError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::Conflict => PlanError::Conflict,
            UpdateError::Storage(storage) => PlanError::Storage(storage),
            UpdateError::Other(other) => PlanError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum UpdateError {
    #[error("conflict")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("no connection")]
    NoConnection,
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}
