//! Shared error types for the services crate.

use thiserror::Error;

use chess_edu_core::model::{AchievementId, ExerciseId, LessonId, MissingField};
use chess_edu_core::{ImportError, ReconcileError};
use storage::repository::StorageError;

/// A request named something the catalog does not contain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum NotFoundError {
    #[error("Lesson not found")]
    Lesson(LessonId),
    #[error("Exercise '{0}' not found")]
    Exercise(ExerciseId),
    #[error("Achievement '{0}' not found")]
    Achievement(AchievementId),
}

/// A request was missing data or carried data that cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("{0}")]
    MissingField(#[from] MissingField),
    #[error("No data provided")]
    NoData,
    #[error("achievement '{0}' is earned through progress and cannot be added directly")]
    Milestone(AchievementId),
    #[error("invalid import: {0}")]
    Import(ImportError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<ReconcileError> for ProgressError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::UnknownLesson(id) => NotFoundError::Lesson(id).into(),
            ReconcileError::UnknownExercise(id) => NotFoundError::Exercise(id).into(),
            ReconcileError::UnknownAchievement(id) => NotFoundError::Achievement(id).into(),
            ReconcileError::MilestoneAchievement(id) => ValidationError::Milestone(id).into(),
        }
    }
}

impl From<ImportError> for ProgressError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Empty => ValidationError::NoData.into(),
            other => ValidationError::Import(other).into(),
        }
    }
}

impl From<MissingField> for ProgressError {
    fn from(err: MissingField) -> Self {
        ValidationError::MissingField(err).into()
    }
}
