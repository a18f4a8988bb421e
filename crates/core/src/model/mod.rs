mod achievement;
mod ids;
mod lesson;
mod progress;

pub use ids::{AchievementId, ExerciseId, LessonId, ObjectiveKey, ParseIdError};

pub use achievement::{Achievement, Milestone, STREAK_MILESTONE_THRESHOLD};
pub use lesson::{Lesson, LessonError};
pub use progress::{
    ExerciseProgress, LessonProgress, LessonProgressDraft, MissingField, ObjectiveDraft,
    ProgressDraft, ProgressRecord,
};
