use std::sync::Arc;

use chess_edu_core::model::{
    AchievementId, ExerciseId, LessonId, MissingField, ObjectiveDraft, ProgressDraft,
    ProgressRecord,
};
use chess_edu_core::{Catalog, ProgressEvent, ReconcileOutcome, Reconciler};
use storage::repository::ProgressRepository;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::Clock;
use crate::error::ProgressError;

/// Applies learner events to the stored progress record.
///
/// Every mutating call holds `write_gate` from load to save, so two requests
/// never interleave their read-modify-write cycles.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    catalog: Arc<Catalog>,
    progress: Arc<dyn ProgressRepository>,
    write_gate: Arc<Mutex<()>>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<Catalog>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self {
            clock,
            catalog,
            progress,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Current progress, unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be read.
    pub async fn snapshot(&self) -> Result<ProgressRecord, ProgressError> {
        let _guard = self.write_gate.lock().await;
        Ok(self.progress.load_progress().await?)
    }

    /// Mark a lesson completed directly.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError::Lesson` for a lesson outside the catalog.
    pub async fn record_lesson_completion(
        &self,
        lesson_id: LessonId,
    ) -> Result<ProgressRecord, ProgressError> {
        self.apply(ProgressEvent::LessonCompleted(lesson_id)).await
    }

    /// Mark an exercise completed, completing its lesson once every exercise is done.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` for a blank id and
    /// `NotFoundError::Exercise` for an exercise no lesson lists.
    pub async fn record_exercise_completion(
        &self,
        exercise_id: ExerciseId,
    ) -> Result<ProgressRecord, ProgressError> {
        if exercise_id.as_str().trim().is_empty() {
            warn!("exercise event rejected: blank id");
            return Err(MissingField("Exercise ID").into());
        }
        self.apply(ProgressEvent::ExerciseCompleted(exercise_id)).await
    }

    /// Mark a lesson objective completed.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` if the lesson id or objective index is absent.
    pub async fn record_objective_completion(
        &self,
        draft: ObjectiveDraft,
    ) -> Result<ProgressRecord, ProgressError> {
        let key = draft.validate().inspect_err(|e| warn!(%e, "objective event rejected"))?;
        self.apply(ProgressEvent::ObjectiveCompleted(key)).await
    }

    /// Grant a lesson or objective achievement on behalf of the client.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError::Achievement` for unknown ids and
    /// `ValidationError::Milestone` for milestone ids.
    pub async fn unlock_achievement(
        &self,
        achievement_id: AchievementId,
    ) -> Result<ProgressRecord, ProgressError> {
        let _guard = self.write_gate.lock().await;
        let mut record = self.progress.load_progress().await?;
        let outcome = Reconciler::new(&self.catalog)
            .grant(&mut record, &achievement_id)
            .inspect_err(|e| warn!(%e, "achievement grant rejected"))?;
        self.progress.save_progress(&record).await?;
        log_outcome(&outcome, record.current_streak());
        Ok(record)
    }

    /// Merge imported progress and re-derive lesson completion and achievements.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NoData` for an empty draft and
    /// `ValidationError::Import` when the draft references unknown content.
    pub async fn import_progress(
        &self,
        draft: ProgressDraft,
    ) -> Result<ProgressRecord, ProgressError> {
        let _guard = self.write_gate.lock().await;
        let mut record = self.progress.load_progress().await?;
        let outcome = Reconciler::new(&self.catalog)
            .import(&mut record, draft, self.clock.now())
            .inspect_err(|e| warn!(%e, "progress import rejected"))?;
        self.progress.save_progress(&record).await?;
        info!(
            lessons = record.lessons().len(),
            achievements = record.achievements().len(),
            "progress imported"
        );
        log_outcome(&outcome, record.current_streak());
        Ok(record)
    }

    async fn apply(&self, event: ProgressEvent) -> Result<ProgressRecord, ProgressError> {
        let _guard = self.write_gate.lock().await;
        let mut record = self.progress.load_progress().await?;
        debug!(?event, "applying progress event");
        let outcome = Reconciler::new(&self.catalog)
            .apply(&mut record, &event, self.clock.now())
            .inspect_err(|e| warn!(%e, ?event, "progress event rejected"))?;
        self.progress.save_progress(&record).await?;
        log_outcome(&outcome, record.current_streak());
        Ok(record)
    }
}

fn log_outcome(outcome: &ReconcileOutcome, streak: u32) {
    for lesson_id in &outcome.completed_lessons {
        info!(%lesson_id, streak, "lesson completed");
    }
    for achievement_id in &outcome.unlocked {
        info!(%achievement_id, "achievement unlocked");
    }
}
