//! JSON shapes exchanged with the browser client.
//!
//! Field names follow what the existing front end reads and writes, so several
//! of them are camelCase while others are snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use chess_edu_core::model::{
    Achievement, AchievementId, ExerciseId, ExerciseProgress, Lesson, LessonId, LessonProgress,
    LessonProgressDraft, ObjectiveKey, ParseIdError, ProgressDraft, ProgressRecord,
};

//
// ─── RESPONSES ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementDto {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl From<&Achievement> for AchievementDto {
    fn from(achievement: &Achievement) -> Self {
        Self {
            id: achievement.id().to_string(),
            title: achievement.title().to_string(),
            description: achievement.description().to_string(),
            icon: achievement.icon().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonDto {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub content: String,
    pub objectives: Vec<String>,
    pub interactive_exercises: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievement: Option<AchievementDto>,
}

impl From<&Lesson> for LessonDto {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id().value(),
            title: lesson.title().to_string(),
            description: lesson.description().to_string(),
            content: lesson.content().to_string(),
            objectives: lesson.objectives().to_vec(),
            interactive_exercises: lesson
                .interactive_exercises()
                .iter()
                .map(ToString::to_string)
                .collect(),
            achievement: lesson.achievement().map(AchievementDto::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExerciseProgressDto {
    pub id: String,
    pub completed: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonProgressDto {
    #[serde(rename = "lessonId")]
    pub lesson_id: u64,
    pub completed: bool,
    pub timestamp: String,
    pub exercises: Vec<ExerciseProgressDto>,
}

impl From<&LessonProgress> for LessonProgressDto {
    fn from(entry: &LessonProgress) -> Self {
        Self {
            lesson_id: entry.lesson_id().value(),
            completed: entry.completed(),
            timestamp: format_timestamp(entry.completed_at()),
            exercises: entry
                .exercises()
                .iter()
                .map(|e| ExerciseProgressDto {
                    id: e.id().to_string(),
                    completed: e.completed(),
                    timestamp: format_timestamp(e.completed_at()),
                })
                .collect(),
        }
    }
}

/// The progress document returned by every progress endpoint.
///
/// `completedLessons` carries per-lesson detail and `completed_lessons` the
/// plain id list older clients read. Both come from the same record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    #[serde(rename = "completedLessons")]
    pub lesson_entries: Vec<LessonProgressDto>,
    pub completed_lessons: Vec<u64>,
    #[serde(rename = "completedObjectives")]
    pub completed_objectives: Vec<String>,
    pub achievements: Vec<AchievementDto>,
    pub current_streak: u32,
}

impl From<&ProgressRecord> for ProgressSnapshot {
    fn from(record: &ProgressRecord) -> Self {
        Self {
            lesson_entries: record.lessons().iter().map(LessonProgressDto::from).collect(),
            completed_lessons: record
                .completed_lesson_ids()
                .into_iter()
                .map(|id| id.value())
                .collect(),
            completed_objectives: record
                .completed_objectives()
                .iter()
                .map(ToString::to_string)
                .collect(),
            achievements: record.achievements().iter().map(AchievementDto::from).collect(),
            current_streak: record.current_streak(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SaveAck {
    pub success: bool,
}

fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.to_rfc3339()).unwrap_or_default()
}

//
// ─── REQUESTS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Default, Deserialize)]
pub struct CompleteLessonRequest {
    pub lesson_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteExerciseRequest {
    #[serde(rename = "exerciseId")]
    pub exercise_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteObjectiveRequest {
    pub lesson_id: Option<u64>,
    pub objective_index: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddAchievementRequest {
    pub achievement_id: Option<String>,
}

/// Partial progress posted by the client. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ImportRequest {
    #[serde(rename = "completedLessons")]
    pub lesson_entries: Option<Vec<LessonProgressInput>>,
    pub completed_lessons: Option<Vec<u64>>,
    #[serde(rename = "completedObjectives")]
    pub completed_objectives: Option<Vec<String>>,
    pub achievements: Option<Vec<AchievementRef>>,
    pub current_streak: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct LessonProgressInput {
    #[serde(rename = "lessonId")]
    pub lesson_id: u64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub exercises: Vec<ExerciseProgressInput>,
}

#[derive(Debug, Deserialize)]
pub struct ExerciseProgressInput {
    pub id: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Achievements arrive either as full objects or as bare ids.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AchievementRef {
    Id(String),
    Object { id: String },
}

impl AchievementRef {
    fn into_id(self) -> AchievementId {
        match self {
            Self::Id(id) | Self::Object { id } => AchievementId::new(id),
        }
    }
}

/// A posted document that is well-formed JSON but carries unusable values.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("invalid timestamp '{value}'")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("invalid objective key: {0}")]
    ObjectiveKey(#[from] ParseIdError),
}

impl TryFrom<ImportRequest> for ProgressDraft {
    type Error = DraftError;

    fn try_from(req: ImportRequest) -> Result<Self, Self::Error> {
        let lessons = req
            .lesson_entries
            .map(|entries| {
                entries
                    .into_iter()
                    .map(lesson_draft)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        let completed_objectives = req
            .completed_objectives
            .map(|keys| {
                keys.iter()
                    .map(|k| k.parse::<ObjectiveKey>())
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(ProgressDraft {
            lessons,
            completed_lesson_ids: req
                .completed_lessons
                .map(|ids| ids.into_iter().map(LessonId::new).collect()),
            completed_objectives,
            achievements: req
                .achievements
                .map(|refs| refs.into_iter().map(AchievementRef::into_id).collect()),
            current_streak: req.current_streak,
        })
    }
}

fn lesson_draft(input: LessonProgressInput) -> Result<LessonProgressDraft, DraftError> {
    let exercises = input
        .exercises
        .into_iter()
        .map(|e| {
            Ok(ExerciseProgress::new(
                ExerciseId::new(e.id),
                e.completed,
                parse_timestamp(e.timestamp)?,
            ))
        })
        .collect::<Result<Vec<_>, DraftError>>()?;

    Ok(LessonProgressDraft {
        lesson_id: LessonId::new(input.lesson_id),
        completed: input.completed,
        completed_at: parse_timestamp(input.timestamp)?,
        exercises,
    })
}

// Empty strings are how the client writes "no timestamp".
fn parse_timestamp(value: Option<String>) -> Result<Option<DateTime<Utc>>, DraftError> {
    match value {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => DateTime::parse_from_rfc3339(&v)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|source| DraftError::Timestamp { value: v, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_edu_core::time::fixed_now;
    use chess_edu_core::{Catalog, ProgressEvent, Reconciler};
    use serde_json::json;

    #[test]
    fn snapshot_uses_client_field_names() {
        let catalog = Catalog::chess_fundamentals();
        let mut record = ProgressRecord::new();
        Reconciler::new(&catalog)
            .apply(
                &mut record,
                &ProgressEvent::ExerciseCompleted(ExerciseId::new("piece_movement")),
                fixed_now(),
            )
            .unwrap();

        let value = serde_json::to_value(ProgressSnapshot::from(&record)).unwrap();
        assert_eq!(
            value,
            json!({
                "completedLessons": [{
                    "lessonId": 1,
                    "completed": false,
                    "timestamp": "",
                    "exercises": [{
                        "id": "piece_movement",
                        "completed": true,
                        "timestamp": fixed_now().to_rfc3339(),
                    }],
                }],
                "completed_lessons": [],
                "completedObjectives": [],
                "achievements": [],
                "current_streak": 0,
            })
        );
    }

    #[test]
    fn achievement_icon_is_omitted_when_unset() {
        let plain = Achievement::new("custom", "Custom", "No icon");
        let value = serde_json::to_value(AchievementDto::from(&plain)).unwrap();
        assert!(value.get("icon").is_none());
    }

    #[test]
    fn import_accepts_objects_and_bare_ids() {
        let req: ImportRequest = serde_json::from_value(json!({
            "achievements": [{"id": "chess_pieces", "title": "ignored"}, "tactics_master"],
            "completedObjectives": ["2_0"],
            "unknown_field": true,
        }))
        .unwrap();

        let draft = ProgressDraft::try_from(req).unwrap();
        assert_eq!(
            draft.achievements,
            Some(vec![
                AchievementId::new("chess_pieces"),
                AchievementId::new("tactics_master")
            ])
        );
        assert_eq!(
            draft.completed_objectives,
            Some(vec![ObjectiveKey::new(LessonId::new(2), 0)])
        );
        assert!(draft.lessons.is_none());
    }

    #[test]
    fn empty_timestamps_mean_absent() {
        let req: ImportRequest = serde_json::from_value(json!({
            "completedLessons": [{
                "lessonId": 1,
                "completed": true,
                "timestamp": "",
                "exercises": [{"id": "board_setup", "completed": true, "timestamp": "2024-03-01T10:00:00Z"}],
            }],
        }))
        .unwrap();

        let draft = ProgressDraft::try_from(req).unwrap();
        let lessons = draft.lessons.unwrap();
        assert_eq!(lessons[0].completed_at, None);
        assert!(lessons[0].exercises[0].completed_at().is_some());
    }

    #[test]
    fn malformed_values_are_rejected() {
        let bad_key: ImportRequest =
            serde_json::from_value(json!({"completedObjectives": ["two-zero"]})).unwrap();
        assert!(matches!(
            ProgressDraft::try_from(bad_key),
            Err(DraftError::ObjectiveKey(_))
        ));

        let bad_time: ImportRequest = serde_json::from_value(json!({
            "completedLessons": [{"lessonId": 1, "timestamp": "yesterday"}],
        }))
        .unwrap();
        assert!(matches!(
            ProgressDraft::try_from(bad_time),
            Err(DraftError::Timestamp { .. })
        ));
    }
}
