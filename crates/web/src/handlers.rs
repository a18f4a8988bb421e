//! Route handlers. Each one translates JSON into a service call and the
//! resulting record back into a [`ProgressSnapshot`].

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use tracing::debug;

use chess_edu_core::model::{
    AchievementId, ExerciseId, LessonId, MissingField, ObjectiveDraft, ParseIdError,
    ProgressDraft,
};
use services::{AppServices, ValidationError};

use crate::dto::{
    AchievementDto, AddAchievementRequest, CompleteExerciseRequest, CompleteLessonRequest,
    CompleteObjectiveRequest, ImportRequest, LessonDto, ProgressSnapshot, SaveAck,
};
use crate::error::ApiError;

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn list_lessons(State(app): State<AppServices>) -> Json<Vec<LessonDto>> {
    let catalog = app.catalog_service();
    Json(catalog.list_lessons().iter().map(LessonDto::from).collect())
}

pub async fn get_lesson(
    State(app): State<AppServices>,
    Path(raw_id): Path<String>,
) -> ApiResult<LessonDto> {
    let id: LessonId = raw_id
        .parse()
        .map_err(|e: ParseIdError| ApiError::BadRequest(e.to_string()))?;
    let catalog = app.catalog_service();
    let lesson = catalog.get_lesson(id)?;
    Ok(Json(LessonDto::from(lesson)))
}

pub async fn list_achievements(State(app): State<AppServices>) -> Json<Vec<AchievementDto>> {
    let achievements = app.catalog_service().achievements();
    Json(achievements.iter().map(AchievementDto::from).collect())
}

pub async fn get_progress(State(app): State<AppServices>) -> ApiResult<ProgressSnapshot> {
    let record = app.progress_service().snapshot().await?;
    Ok(Json(ProgressSnapshot::from(&record)))
}

pub async fn complete_lesson(
    State(app): State<AppServices>,
    payload: Result<Json<CompleteLessonRequest>, JsonRejection>,
) -> ApiResult<ProgressSnapshot> {
    let Json(req) = payload?;
    let lesson_id = req
        .lesson_id
        .map(LessonId::new)
        .ok_or(ValidationError::from(MissingField("lesson_id")))?;
    let record = app
        .progress_service()
        .record_lesson_completion(lesson_id)
        .await?;
    Ok(Json(ProgressSnapshot::from(&record)))
}

pub async fn complete_exercise(
    State(app): State<AppServices>,
    payload: Result<Json<CompleteExerciseRequest>, JsonRejection>,
) -> ApiResult<ProgressSnapshot> {
    let Json(req) = payload?;
    let exercise_id = ExerciseId::new(req.exercise_id.unwrap_or_default());
    debug!(%exercise_id, "exercise completion requested");
    let record = app
        .progress_service()
        .record_exercise_completion(exercise_id)
        .await?;
    Ok(Json(ProgressSnapshot::from(&record)))
}

pub async fn complete_objective(
    State(app): State<AppServices>,
    payload: Result<Json<CompleteObjectiveRequest>, JsonRejection>,
) -> ApiResult<ProgressSnapshot> {
    let Json(req) = payload?;
    let draft = ObjectiveDraft {
        lesson_id: req.lesson_id.map(LessonId::new),
        objective_index: req.objective_index,
    };
    let record = app
        .progress_service()
        .record_objective_completion(draft)
        .await?;
    Ok(Json(ProgressSnapshot::from(&record)))
}

pub async fn add_achievement(
    State(app): State<AppServices>,
    payload: Result<Json<AddAchievementRequest>, JsonRejection>,
) -> ApiResult<ProgressSnapshot> {
    let Json(req) = payload?;
    let achievement_id = req
        .achievement_id
        .filter(|id| !id.trim().is_empty())
        .map(AchievementId::new)
        .ok_or(ValidationError::from(MissingField("achievement_id")))?;
    let record = app
        .progress_service()
        .unlock_achievement(achievement_id)
        .await?;
    Ok(Json(ProgressSnapshot::from(&record)))
}

/// Accepts a partial progress document. An empty body, `null` and `{}` all
/// count as "no data".
pub async fn save_progress(State(app): State<AppServices>, body: Bytes) -> ApiResult<SaveAck> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        serde_json::from_slice::<Option<ImportRequest>>(&body)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?
    };
    let request = request.ok_or(ValidationError::NoData)?;
    let draft = ProgressDraft::try_from(request)?;

    app.progress_service().import_progress(draft).await?;
    Ok(Json(SaveAck { success: true }))
}
