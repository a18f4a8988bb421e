use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::model::{
    Achievement, AchievementId, ExerciseId, Lesson, LessonId, LessonProgress, Milestone,
    ObjectiveKey, ProgressDraft, ProgressRecord, STREAK_MILESTONE_THRESHOLD,
};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("lesson {0} not found")]
    UnknownLesson(LessonId),

    #[error("exercise '{0}' not found")]
    UnknownExercise(ExerciseId),

    #[error("achievement '{0}' not found")]
    UnknownAchievement(AchievementId),

    #[error("achievement '{0}' is a milestone and cannot be granted directly")]
    MilestoneAchievement(AchievementId),
}

/// Reasons an import draft is rejected. Nothing is written when any applies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ImportError {
    #[error("no data provided")]
    Empty,

    #[error("lesson {0} not found")]
    UnknownLesson(LessonId),

    #[error("lesson {0} appears more than once")]
    DuplicateLesson(LessonId),

    #[error("exercise '{exercise}' is not part of lesson {lesson_id}")]
    ForeignExercise {
        lesson_id: LessonId,
        exercise: ExerciseId,
    },

    #[error("achievement '{0}' not found")]
    UnknownAchievement(AchievementId),
}

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// A primitive completion event submitted by the learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    LessonCompleted(LessonId),
    ExerciseCompleted(ExerciseId),
    ObjectiveCompleted(ObjectiveKey),
}

/// What a single reconciliation step changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Lessons that transitioned into the completed state, in order.
    pub completed_lessons: Vec<LessonId>,
    /// Achievements appended to the record, in order.
    pub unlocked: Vec<AchievementId>,
}

/// How a lesson reached completion. Only some routes advance the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Direct,
    Exercises,
    Objectives,
}

impl Route {
    // Completing every objective finishes the lesson but leaves the streak alone.
    fn bumps_streak(self) -> bool {
        matches!(self, Route::Direct | Route::Exercises)
    }
}

//
// ─── RECONCILER ────────────────────────────────────────────────────────────────
//

/// Applies completion events to a [`ProgressRecord`] against a [`Catalog`].
///
/// Every step is idempotent: replaying an event never duplicates entries,
/// objectives or achievements, and the streak only moves when a lesson crosses
/// into the completed state.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    catalog: &'a Catalog,
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Apply one event.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::UnknownLesson` for a direct completion of a lesson
    /// outside the catalog and `ReconcileError::UnknownExercise` for an unmapped
    /// exercise. The record is untouched on error.
    pub fn apply(
        &self,
        record: &mut ProgressRecord,
        event: &ProgressEvent,
        now: DateTime<Utc>,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let mut outcome = ReconcileOutcome::default();
        match event {
            ProgressEvent::LessonCompleted(id) => {
                let lesson = self
                    .catalog
                    .lesson(*id)
                    .ok_or(ReconcileError::UnknownLesson(*id))?;
                self.complete_lesson(record, lesson, Route::Direct, now, &mut outcome);
            }
            ProgressEvent::ExerciseCompleted(exercise) => {
                self.complete_exercise(record, exercise, now, &mut outcome)?;
            }
            ProgressEvent::ObjectiveCompleted(key) => {
                self.complete_objective(record, *key, now, &mut outcome);
            }
        }
        Ok(outcome)
    }

    fn complete_exercise(
        &self,
        record: &mut ProgressRecord,
        exercise: &ExerciseId,
        now: DateTime<Utc>,
        outcome: &mut ReconcileOutcome,
    ) -> Result<(), ReconcileError> {
        let lesson_id = self
            .catalog
            .lesson_for_exercise(exercise)
            .ok_or_else(|| ReconcileError::UnknownExercise(exercise.clone()))?;
        let lesson = self
            .catalog
            .lesson(lesson_id)
            .ok_or(ReconcileError::UnknownLesson(lesson_id))?;

        if let Some(key) = self.catalog.objective_for_exercise(exercise) {
            self.mark_objective(record, key, outcome);
        }

        let entry = record.lesson_entry_mut(lesson_id);
        entry.mark_exercise(exercise, now);

        if !entry.completed() && all_exercises_done(lesson, entry) {
            self.complete_lesson(record, lesson, Route::Exercises, now, outcome);
        }
        Ok(())
    }

    fn complete_objective(
        &self,
        record: &mut ProgressRecord,
        key: ObjectiveKey,
        now: DateTime<Utc>,
        outcome: &mut ReconcileOutcome,
    ) {
        self.mark_objective(record, key, outcome);

        // Keys for lessons outside the catalog are kept but change nothing else.
        let Some(lesson) = self.catalog.lesson(key.lesson_id()) else {
            return;
        };
        if !record.is_lesson_completed(lesson.id()) && all_objectives_done(lesson, record) {
            self.complete_lesson(record, lesson, Route::Objectives, now, outcome);
        }
    }

    /// Grant a lesson or objective achievement by id.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::MilestoneAchievement` for milestone ids and
    /// `ReconcileError::UnknownAchievement` for ids the catalog does not define.
    pub fn grant(
        &self,
        record: &mut ProgressRecord,
        id: &AchievementId,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        if Milestone::from_id(id).is_some() {
            return Err(ReconcileError::MilestoneAchievement(id.clone()));
        }
        let achievement = self
            .catalog
            .grantable_achievement(id)
            .ok_or_else(|| ReconcileError::UnknownAchievement(id.clone()))?;
        let mut outcome = ReconcileOutcome::default();
        unlock(record, achievement, &mut outcome);
        Ok(outcome)
    }

    /// The lesson-completion sequence shared by every route.
    ///
    /// Achievements are appended objective-first, then the lesson's own, then
    /// milestones, regardless of which route got here.
    fn complete_lesson(
        &self,
        record: &mut ProgressRecord,
        lesson: &Lesson,
        route: Route,
        now: DateTime<Utc>,
        outcome: &mut ReconcileOutcome,
    ) {
        let newly_completed = record.lesson_entry_mut(lesson.id()).mark_completed(now);
        if newly_completed {
            outcome.completed_lessons.push(lesson.id());
            if route.bumps_streak() {
                record.increment_streak();
            }
        }

        if lesson.grades_objectives() {
            for key in lesson.objective_keys() {
                self.mark_objective(record, key, outcome);
            }
        }

        if let Some(achievement) = lesson.achievement() {
            unlock(record, achievement, outcome);
        }

        self.unlock_milestones(record, outcome);
    }

    fn mark_objective(
        &self,
        record: &mut ProgressRecord,
        key: ObjectiveKey,
        outcome: &mut ReconcileOutcome,
    ) {
        record.insert_objective(key);
        if let Some(achievement) = self.catalog.objective_achievement(key) {
            unlock(record, achievement, outcome);
        }
    }

    fn unlock_milestones(&self, record: &mut ProgressRecord, outcome: &mut ReconcileOutcome) {
        let completed = record.completed_lesson_count();
        if completed == 1 {
            unlock(record, &Milestone::FirstLesson.achievement(), outcome);
        }
        if self.all_lessons_completed(record) {
            unlock(record, &Milestone::AllLessons.achievement(), outcome);
        }
        if record.current_streak() >= STREAK_MILESTONE_THRESHOLD {
            unlock(record, &Milestone::ThreeDayStreak.achievement(), outcome);
        }
    }

    fn all_lessons_completed(&self, record: &ProgressRecord) -> bool {
        !self.catalog.is_empty()
            && self
                .catalog
                .lessons()
                .iter()
                .all(|l| record.is_lesson_completed(l.id()))
    }

    /// Merge a caller-supplied draft into the record, then re-derive everything
    /// that depends on it.
    ///
    /// Present fields replace the stored ones; `completed_lesson_ids` only adds
    /// completions. Afterwards lesson completion is recomputed from exercises and
    /// objectives, graded objectives are filled in for completed lessons, lesson
    /// and objective achievements are granted, and milestones are rebuilt from
    /// scratch. The imported streak is kept as given.
    ///
    /// # Errors
    ///
    /// Returns `ImportError` if the draft is empty or references lessons,
    /// exercises or achievements the catalog does not know. The record is
    /// untouched on error.
    pub fn import(
        &self,
        record: &mut ProgressRecord,
        draft: ProgressDraft,
        now: DateTime<Utc>,
    ) -> Result<ReconcileOutcome, ImportError> {
        if draft.is_empty() {
            return Err(ImportError::Empty);
        }
        self.validate_draft(&draft)?;

        let before: Vec<AchievementId> =
            record.achievements().iter().map(|a| a.id().clone()).collect();
        let completed_before = record.completed_lesson_ids();
        let mut merged = record.clone();

        if let Some(lessons) = draft.lessons {
            merged.replace_lessons(
                lessons
                    .into_iter()
                    .map(|l| {
                        LessonProgress::from_parts(l.lesson_id, l.completed, l.completed_at, l.exercises)
                    })
                    .collect(),
            );
        }
        if let Some(ids) = draft.completed_lesson_ids {
            for id in ids {
                merged.lesson_entry_mut(id).mark_completed(now);
            }
        }
        if let Some(keys) = draft.completed_objectives {
            merged.replace_objectives(keys);
        }
        if let Some(ids) = draft.achievements {
            let resolved = ids
                .iter()
                .filter_map(|id| self.catalog.grantable_achievement(id))
                .cloned()
                .collect();
            merged.replace_achievements(resolved);
        } else {
            merged.retain_achievements(|a| Milestone::from_id(a.id()).is_none());
        }
        if let Some(streak) = draft.current_streak {
            merged.set_streak(streak);
        }

        self.rederive(&mut merged, now);

        let outcome = ReconcileOutcome {
            completed_lessons: merged
                .completed_lesson_ids()
                .into_iter()
                .filter(|id| !completed_before.contains(id))
                .collect(),
            unlocked: merged
                .achievements()
                .iter()
                .map(|a| a.id().clone())
                .filter(|id| !before.contains(id))
                .collect(),
        };

        *record = merged;
        Ok(outcome)
    }

    fn validate_draft(&self, draft: &ProgressDraft) -> Result<(), ImportError> {
        if let Some(lessons) = &draft.lessons {
            for (pos, entry) in lessons.iter().enumerate() {
                let lesson = self
                    .catalog
                    .lesson(entry.lesson_id)
                    .ok_or(ImportError::UnknownLesson(entry.lesson_id))?;
                if lessons[..pos].iter().any(|l| l.lesson_id == entry.lesson_id) {
                    return Err(ImportError::DuplicateLesson(entry.lesson_id));
                }
                if let Some(foreign) = entry
                    .exercises
                    .iter()
                    .find(|e| !lesson.has_exercise(e.id()))
                {
                    return Err(ImportError::ForeignExercise {
                        lesson_id: entry.lesson_id,
                        exercise: foreign.id().clone(),
                    });
                }
            }
        }
        if let Some(ids) = &draft.completed_lesson_ids {
            if let Some(unknown) = ids.iter().find(|id| self.catalog.lesson(**id).is_none()) {
                return Err(ImportError::UnknownLesson(*unknown));
            }
        }
        if let Some(ids) = &draft.achievements {
            for id in ids {
                // Milestones are recomputed below, so stale ones are simply dropped.
                if Milestone::from_id(id).is_none()
                    && self.catalog.grantable_achievement(id).is_none()
                {
                    return Err(ImportError::UnknownAchievement(id.clone()));
                }
            }
        }
        Ok(())
    }

    fn rederive(&self, record: &mut ProgressRecord, now: DateTime<Utc>) {
        let mut scratch = ReconcileOutcome::default();

        for lesson in self.catalog.lessons() {
            if record.is_lesson_completed(lesson.id()) {
                continue;
            }
            let exercises_done = record
                .lesson(lesson.id())
                .is_some_and(|entry| all_exercises_done(lesson, entry));
            if exercises_done || all_objectives_done(lesson, record) {
                record.lesson_entry_mut(lesson.id()).mark_completed(now);
            }
        }

        for lesson in self.catalog.lessons() {
            if record.is_lesson_completed(lesson.id()) && lesson.grades_objectives() {
                for key in lesson.objective_keys() {
                    record.insert_objective(key);
                }
            }
        }

        let objectives: Vec<ObjectiveKey> = record.completed_objectives().to_vec();
        for key in objectives {
            if let Some(achievement) = self.catalog.objective_achievement(key) {
                unlock(record, achievement, &mut scratch);
            }
        }
        for lesson in self.catalog.lessons() {
            if record.is_lesson_completed(lesson.id()) {
                if let Some(achievement) = lesson.achievement() {
                    unlock(record, achievement, &mut scratch);
                }
            }
        }

        record.retain_achievements(|a| Milestone::from_id(a.id()).is_none());
        if record.completed_lesson_count() >= 1 {
            unlock(record, &Milestone::FirstLesson.achievement(), &mut scratch);
        }
        if self.all_lessons_completed(record) {
            unlock(record, &Milestone::AllLessons.achievement(), &mut scratch);
        }
        if record.current_streak() >= STREAK_MILESTONE_THRESHOLD {
            unlock(record, &Milestone::ThreeDayStreak.achievement(), &mut scratch);
        }
    }
}

fn unlock(record: &mut ProgressRecord, achievement: &Achievement, outcome: &mut ReconcileOutcome) {
    if record.unlock(achievement) {
        outcome.unlocked.push(achievement.id().clone());
    }
}

fn all_exercises_done(lesson: &Lesson, entry: &LessonProgress) -> bool {
    !lesson.interactive_exercises().is_empty()
        && lesson
            .interactive_exercises()
            .iter()
            .all(|e| entry.has_completed_exercise(e))
}

fn all_objectives_done(lesson: &Lesson, record: &ProgressRecord) -> bool {
    !lesson.objectives().is_empty()
        && lesson
            .objective_keys()
            .all(|key| record.is_objective_completed(key))
}
