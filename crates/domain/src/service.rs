use log::{debug, error};

use crate::{
    Direction, ExerciseRecord, ExerciseRecordID, ItemKey, OrderError, PlanError, ReadError,
    SectionID, SessionID, StorageError, SupersetGroup, SupersetID, UnifiedItem, UpdateError,
    build_unified_view, reorder, superset_groups,
};

/// Storage of the exercise collections of sessions.
#[allow(async_fn_in_trait)]
pub trait PlanRepository {
    async fn read_exercise_records(
        &self,
        session_id: SessionID,
    ) -> Result<Vec<ExerciseRecord>, ReadError>;
    /// Replace the complete exercise collection of a session.
    async fn replace_exercise_records(
        &self,
        session_id: SessionID,
        exercises: Vec<ExerciseRecord>,
    ) -> Result<Vec<ExerciseRecord>, UpdateError>;
}

#[allow(async_fn_in_trait)]
pub trait PlanService {
    async fn get_unified_view(
        &self,
        session_id: SessionID,
        section_id: &SectionID,
    ) -> Result<Vec<UnifiedItem>, PlanError>;
    async fn get_supersets(&self, session_id: SessionID) -> Result<Vec<SupersetGroup>, PlanError>;
    async fn move_item(
        &self,
        session_id: SessionID,
        section_id: &SectionID,
        key: ItemKey,
        to_index: usize,
    ) -> Result<Vec<ExerciseRecord>, PlanError>;
    async fn move_direction(
        &self,
        session_id: SessionID,
        section_id: &SectionID,
        key: ItemKey,
        direction: Direction,
    ) -> Result<Vec<ExerciseRecord>, PlanError>;
    async fn create_superset(
        &self,
        session_id: SessionID,
        section_id: &SectionID,
        exercise_ids: &[ExerciseRecordID],
        host_section_id: &SectionID,
    ) -> Result<SupersetID, PlanError>;
    async fn add_to_superset(
        &self,
        session_id: SessionID,
        superset_id: SupersetID,
        exercise: ExerciseRecord,
    ) -> Result<Vec<ExerciseRecord>, PlanError>;
    async fn remove_from_superset(
        &self,
        session_id: SessionID,
        superset_id: SupersetID,
        exercise_id: ExerciseRecordID,
    ) -> Result<Vec<ExerciseRecord>, PlanError>;
    async fn dissolve_superset(
        &self,
        session_id: SessionID,
        superset_id: SupersetID,
    ) -> Result<Vec<ExerciseRecord>, PlanError>;
    async fn move_superset(
        &self,
        session_id: SessionID,
        superset_id: SupersetID,
        host_section_id: &SectionID,
    ) -> Result<Vec<ExerciseRecord>, PlanError>;
    async fn add_exercise(&self, exercise: ExerciseRecord)
    -> Result<Vec<ExerciseRecord>, PlanError>;
    async fn remove_exercise(
        &self,
        session_id: SessionID,
        exercise_id: ExerciseRecordID,
    ) -> Result<Vec<ExerciseRecord>, PlanError>;
}

/// Runs each operation as read, compute and write of a session's complete
/// exercise collection. Callers must not interleave operations on the same
/// session.
pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    #[must_use]
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

impl<R: PlanRepository> Service<R> {
    async fn apply(
        &self,
        session_id: SessionID,
        operation: impl FnOnce(&[ExerciseRecord]) -> Result<Vec<ExerciseRecord>, OrderError>,
    ) -> Result<Vec<ExerciseRecord>, PlanError> {
        let exercises = self.repository.read_exercise_records(session_id).await?;
        let result = operation(&exercises)?;
        if result == exercises {
            return Ok(result);
        }
        Ok(self
            .repository
            .replace_exercise_records(session_id, result)
            .await?)
    }
}

macro_rules! log_on_error {
    ($func: expr, $action: literal, $entity: literal) => {{
        let result = $func.await;
        if let Err(ref err) = result {
            match err {
                PlanError::Storage(StorageError::NoConnection)
                | PlanError::Order(OrderError::NotFound(_)) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            }
        }
        result
    }};
}

impl<R: PlanRepository> PlanService for Service<R> {
    async fn get_unified_view(
        &self,
        session_id: SessionID,
        section_id: &SectionID,
    ) -> Result<Vec<UnifiedItem>, PlanError> {
        log_on_error!(
            async {
                let exercises = self.repository.read_exercise_records(session_id).await?;
                Ok::<_, PlanError>(build_unified_view(&exercises, session_id, section_id))
            },
            "get",
            "unified view"
        )
    }

    async fn get_supersets(&self, session_id: SessionID) -> Result<Vec<SupersetGroup>, PlanError> {
        log_on_error!(
            async {
                let exercises = self.repository.read_exercise_records(session_id).await?;
                Ok::<_, PlanError>(superset_groups(&exercises, session_id))
            },
            "get",
            "supersets"
        )
    }

    async fn move_item(
        &self,
        session_id: SessionID,
        section_id: &SectionID,
        key: ItemKey,
        to_index: usize,
    ) -> Result<Vec<ExerciseRecord>, PlanError> {
        log_on_error!(
            self.apply(session_id, |exercises| {
                reorder::move_item(exercises, section_id, key, to_index)
            }),
            "move",
            "item"
        )
    }

    async fn move_direction(
        &self,
        session_id: SessionID,
        section_id: &SectionID,
        key: ItemKey,
        direction: Direction,
    ) -> Result<Vec<ExerciseRecord>, PlanError> {
        log_on_error!(
            self.apply(session_id, |exercises| {
                reorder::move_direction(exercises, section_id, key, direction)
            }),
            "move",
            "item"
        )
    }

    async fn create_superset(
        &self,
        session_id: SessionID,
        section_id: &SectionID,
        exercise_ids: &[ExerciseRecordID],
        host_section_id: &SectionID,
    ) -> Result<SupersetID, PlanError> {
        let superset_id = SupersetID::random();
        log_on_error!(
            async {
                self.apply(session_id, |exercises| {
                    reorder::create_superset(
                        exercises,
                        section_id,
                        exercise_ids,
                        host_section_id,
                        superset_id,
                    )
                })
                .await
                .map(|_| superset_id)
            },
            "create",
            "superset"
        )
    }

    async fn add_to_superset(
        &self,
        session_id: SessionID,
        superset_id: SupersetID,
        exercise: ExerciseRecord,
    ) -> Result<Vec<ExerciseRecord>, PlanError> {
        log_on_error!(
            self.apply(session_id, |exercises| {
                reorder::add_to_superset(exercises, superset_id, exercise)
            }),
            "add",
            "exercise to superset"
        )
    }

    async fn remove_from_superset(
        &self,
        session_id: SessionID,
        superset_id: SupersetID,
        exercise_id: ExerciseRecordID,
    ) -> Result<Vec<ExerciseRecord>, PlanError> {
        log_on_error!(
            self.apply(session_id, |exercises| {
                reorder::remove_from_superset(exercises, superset_id, exercise_id)
            }),
            "remove",
            "exercise from superset"
        )
    }

    async fn dissolve_superset(
        &self,
        session_id: SessionID,
        superset_id: SupersetID,
    ) -> Result<Vec<ExerciseRecord>, PlanError> {
        log_on_error!(
            self.apply(session_id, |exercises| {
                reorder::dissolve_superset(exercises, superset_id)
            }),
            "dissolve",
            "superset"
        )
    }

    async fn move_superset(
        &self,
        session_id: SessionID,
        superset_id: SupersetID,
        host_section_id: &SectionID,
    ) -> Result<Vec<ExerciseRecord>, PlanError> {
        log_on_error!(
            self.apply(session_id, |exercises| {
                reorder::move_superset(exercises, superset_id, host_section_id)
            }),
            "move",
            "superset"
        )
    }

    async fn add_exercise(
        &self,
        exercise: ExerciseRecord,
    ) -> Result<Vec<ExerciseRecord>, PlanError> {
        log_on_error!(
            self.apply(exercise.session_id, |exercises| {
                reorder::add_exercise(exercises, exercise)
            }),
            "add",
            "exercise"
        )
    }

    async fn remove_exercise(
        &self,
        session_id: SessionID,
        exercise_id: ExerciseRecordID,
    ) -> Result<Vec<ExerciseRecord>, PlanError> {
        log_on_error!(
            self.apply(session_id, |exercises| {
                reorder::remove_exercise(exercises, exercise_id)
            }),
            "remove",
            "exercise"
        )
    }
}
