use chrono::{DateTime, Utc};

use crate::model::achievement::Achievement;
use crate::model::ids::{AchievementId, ExerciseId, LessonId, ObjectiveKey};

//
// ─── EXERCISE PROGRESS ─────────────────────────────────────────────────────────
//

/// Completion state of one exercise inside a lesson entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseProgress {
    id: ExerciseId,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
}

impl ExerciseProgress {
    #[must_use]
    pub fn new(id: ExerciseId, completed: bool, completed_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id,
            completed,
            completed_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ExerciseId {
        &self.id
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}

//
// ─── LESSON PROGRESS ───────────────────────────────────────────────────────────
//

/// Progress entry for a lesson that has been touched at least once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonProgress {
    lesson_id: LessonId,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    exercises: Vec<ExerciseProgress>,
}

impl LessonProgress {
    /// A fresh, not yet completed entry.
    #[must_use]
    pub fn new(lesson_id: LessonId) -> Self {
        Self {
            lesson_id,
            completed: false,
            completed_at: None,
            exercises: Vec::new(),
        }
    }

    /// Rehydrate an entry from stored or imported values.
    ///
    /// Repeated exercise ids are collapsed; a completed duplicate wins.
    #[must_use]
    pub fn from_parts(
        lesson_id: LessonId,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
        exercises: Vec<ExerciseProgress>,
    ) -> Self {
        let mut entry = Self {
            lesson_id,
            completed,
            completed_at,
            exercises: Vec::with_capacity(exercises.len()),
        };
        for exercise in exercises {
            match entry.exercises.iter_mut().find(|e| e.id == exercise.id) {
                Some(existing) => {
                    if exercise.completed && !existing.completed {
                        *existing = exercise;
                    }
                }
                None => entry.exercises.push(exercise),
            }
        }
        entry
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn exercises(&self) -> &[ExerciseProgress] {
        &self.exercises
    }

    #[must_use]
    pub fn has_completed_exercise(&self, id: &ExerciseId) -> bool {
        self.exercises.iter().any(|e| &e.id == id && e.completed)
    }

    /// Marks an exercise completed. Returns `true` only if it was not already.
    pub(crate) fn mark_exercise(&mut self, id: &ExerciseId, now: DateTime<Utc>) -> bool {
        match self.exercises.iter_mut().find(|e| &e.id == id) {
            Some(existing) if existing.completed => false,
            Some(existing) => {
                existing.completed = true;
                existing.completed_at = Some(now);
                true
            }
            None => {
                self.exercises
                    .push(ExerciseProgress::new(id.clone(), true, Some(now)));
                true
            }
        }
    }

    /// Marks the lesson completed. Returns `true` on the transition edge.
    pub(crate) fn mark_completed(&mut self, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        if self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
        true
    }
}

//
// ─── PROGRESS RECORD ───────────────────────────────────────────────────────────
//

/// The learner's aggregate progress.
///
/// Completed lessons are stored once, as the `completed` flag of each entry.
/// The legacy list of completed lesson ids is a view over those entries, so the
/// two can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressRecord {
    lessons: Vec<LessonProgress>,
    completed_objectives: Vec<ObjectiveKey>,
    achievements: Vec<Achievement>,
    current_streak: u32,
}

impl ProgressRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lesson entries in the order they were first touched.
    #[must_use]
    pub fn lessons(&self) -> &[LessonProgress] {
        &self.lessons
    }

    #[must_use]
    pub fn lesson(&self, id: LessonId) -> Option<&LessonProgress> {
        self.lessons.iter().find(|l| l.lesson_id == id)
    }

    /// Ids of completed lessons, in entry order.
    #[must_use]
    pub fn completed_lesson_ids(&self) -> Vec<LessonId> {
        self.lessons
            .iter()
            .filter(|l| l.completed)
            .map(|l| l.lesson_id)
            .collect()
    }

    #[must_use]
    pub fn completed_lesson_count(&self) -> usize {
        self.lessons.iter().filter(|l| l.completed).count()
    }

    #[must_use]
    pub fn is_lesson_completed(&self, id: LessonId) -> bool {
        self.lesson(id).is_some_and(LessonProgress::completed)
    }

    #[must_use]
    pub fn completed_objectives(&self) -> &[ObjectiveKey] {
        &self.completed_objectives
    }

    #[must_use]
    pub fn is_objective_completed(&self, key: ObjectiveKey) -> bool {
        self.completed_objectives.contains(&key)
    }

    #[must_use]
    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    #[must_use]
    pub fn has_achievement(&self, id: &AchievementId) -> bool {
        self.achievements.iter().any(|a| a.id() == id)
    }

    #[must_use]
    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    /// Returns the entry for `id`, appending an empty one if the lesson is untouched.
    pub(crate) fn lesson_entry_mut(&mut self, id: LessonId) -> &mut LessonProgress {
        let pos = match self.lessons.iter().position(|l| l.lesson_id == id) {
            Some(pos) => pos,
            None => {
                self.lessons.push(LessonProgress::new(id));
                self.lessons.len() - 1
            }
        };
        &mut self.lessons[pos]
    }

    pub(crate) fn insert_objective(&mut self, key: ObjectiveKey) -> bool {
        if self.completed_objectives.contains(&key) {
            return false;
        }
        self.completed_objectives.push(key);
        true
    }

    /// Appends an achievement unless one with the same id is already unlocked.
    pub(crate) fn unlock(&mut self, achievement: &Achievement) -> bool {
        if self.has_achievement(achievement.id()) {
            return false;
        }
        self.achievements.push(achievement.clone());
        true
    }

    pub(crate) fn increment_streak(&mut self) {
        self.current_streak = self.current_streak.saturating_add(1);
    }

    pub(crate) fn replace_lessons(&mut self, lessons: Vec<LessonProgress>) {
        self.lessons = lessons;
    }

    pub(crate) fn replace_objectives(&mut self, keys: Vec<ObjectiveKey>) {
        self.completed_objectives.clear();
        for key in keys {
            self.insert_objective(key);
        }
    }

    pub(crate) fn replace_achievements(&mut self, achievements: Vec<Achievement>) {
        self.achievements.clear();
        for achievement in &achievements {
            self.unlock(achievement);
        }
    }

    pub(crate) fn retain_achievements(&mut self, keep: impl FnMut(&Achievement) -> bool) {
        self.achievements.retain(keep);
    }

    pub(crate) fn set_streak(&mut self, streak: u32) {
        self.current_streak = streak;
    }
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// Unvalidated objective-completion event; both fields are required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectiveDraft {
    pub lesson_id: Option<LessonId>,
    pub objective_index: Option<u32>,
}

/// Field missing from a completion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0} is required")]
pub struct MissingField(pub &'static str);

impl ObjectiveDraft {
    /// # Errors
    ///
    /// Returns `MissingField` naming the first absent field.
    pub fn validate(self) -> Result<ObjectiveKey, MissingField> {
        let lesson_id = self.lesson_id.ok_or(MissingField("lesson_id"))?;
        let index = self.objective_index.ok_or(MissingField("objective_index"))?;
        Ok(ObjectiveKey::new(lesson_id, index))
    }
}

/// Caller-supplied partial progress used by import.
///
/// Every field is optional; a present field replaces the stored one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressDraft {
    pub lessons: Option<Vec<LessonProgressDraft>>,
    pub completed_lesson_ids: Option<Vec<LessonId>>,
    pub completed_objectives: Option<Vec<ObjectiveKey>>,
    pub achievements: Option<Vec<AchievementId>>,
    pub current_streak: Option<u32>,
}

impl ProgressDraft {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lessons.is_none()
            && self.completed_lesson_ids.is_none()
            && self.completed_objectives.is_none()
            && self.achievements.is_none()
            && self.current_streak.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonProgressDraft {
    pub lesson_id: LessonId,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub exercises: Vec<ExerciseProgress>,
}
