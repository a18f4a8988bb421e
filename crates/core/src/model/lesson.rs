use thiserror::Error;

use crate::model::achievement::Achievement;
use crate::model::ids::{ExerciseId, LessonId, ObjectiveKey};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson id must be > 0")]
    InvalidId,

    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("exercise {0} is listed twice in the same lesson")]
    DuplicateExercise(ExerciseId),

    #[error("exercise id cannot be empty")]
    EmptyExerciseId,
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A read-only lesson definition.
///
/// Lessons are built once when the catalog loads and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    description: String,
    content: String,
    objectives: Vec<String>,
    interactive_exercises: Vec<ExerciseId>,
    achievement: Option<Achievement>,
    grades_objectives: bool,
}

impl Lesson {
    /// Creates a lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::InvalidId` for id 0, `LessonError::EmptyTitle` for a
    /// blank title, and `LessonError::DuplicateExercise` if an exercise repeats.
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
        objectives: Vec<String>,
        interactive_exercises: Vec<ExerciseId>,
    ) -> Result<Self, LessonError> {
        if id.value() == 0 {
            return Err(LessonError::InvalidId);
        }
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }
        for (pos, exercise) in interactive_exercises.iter().enumerate() {
            if exercise.as_str().trim().is_empty() {
                return Err(LessonError::EmptyExerciseId);
            }
            if interactive_exercises[..pos].contains(exercise) {
                return Err(LessonError::DuplicateExercise(exercise.clone()));
            }
        }

        Ok(Self {
            id,
            title,
            description: description.into(),
            content: content.into(),
            objectives,
            interactive_exercises,
            achievement: None,
            grades_objectives: false,
        })
    }

    /// Attaches the achievement unlocked when this lesson completes.
    #[must_use]
    pub fn with_achievement(mut self, achievement: Achievement) -> Self {
        self.achievement = Some(achievement);
        self
    }

    /// Marks this lesson as the one whose objectives are graded individually:
    /// completing it completes every objective too.
    #[must_use]
    pub fn with_graded_objectives(mut self) -> Self {
        self.grades_objectives = true;
        self
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn objectives(&self) -> &[String] {
        &self.objectives
    }

    #[must_use]
    pub fn interactive_exercises(&self) -> &[ExerciseId] {
        &self.interactive_exercises
    }

    #[must_use]
    pub fn achievement(&self) -> Option<&Achievement> {
        self.achievement.as_ref()
    }

    #[must_use]
    pub fn grades_objectives(&self) -> bool {
        self.grades_objectives
    }

    #[must_use]
    pub fn has_exercise(&self, exercise: &ExerciseId) -> bool {
        self.interactive_exercises.contains(exercise)
    }

    /// Keys for every objective of this lesson, in index order.
    pub fn objective_keys(&self) -> impl Iterator<Item = ObjectiveKey> + '_ {
        (0..self.objectives.len()).map(move |index| {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            ObjectiveKey::new(self.id, index)
        })
    }
}
