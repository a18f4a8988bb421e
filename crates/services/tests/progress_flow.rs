use std::sync::Arc;

use chess_edu_core::model::{
    AchievementId, ExerciseId, LessonId, ObjectiveDraft, ObjectiveKey, ProgressDraft,
    ProgressRecord,
};
use chess_edu_core::time::{fixed_clock, fixed_now};
use chess_edu_core::{Catalog, Reconciler};
use services::{AppServices, ProgressError, ProgressService, ValidationError};
use storage::repository::{InMemoryRepository, ProgressRepository, Storage};

fn services() -> AppServices {
    AppServices::in_memory(fixed_clock(), Arc::new(Catalog::chess_fundamentals()))
}

fn ids(record: &ProgressRecord) -> Vec<&str> {
    record.achievements().iter().map(|a| a.id().as_str()).collect()
}

#[tokio::test]
async fn exercises_complete_the_first_lesson() {
    let progress = services().progress_service();

    let record = progress
        .record_exercise_completion(ExerciseId::new("piece_movement"))
        .await
        .unwrap();
    let entry = record.lesson(LessonId::new(1)).unwrap();
    assert!(!entry.completed());
    assert!(entry.has_completed_exercise(&ExerciseId::new("piece_movement")));
    assert!(record.completed_lesson_ids().is_empty());

    let record = progress
        .record_exercise_completion(ExerciseId::new("board_setup"))
        .await
        .unwrap();
    assert_eq!(record.completed_lesson_ids(), vec![LessonId::new(1)]);
    assert_eq!(
        record.lesson(LessonId::new(1)).unwrap().completed_at(),
        Some(fixed_now())
    );
    assert_eq!(ids(&record), ["chess_pieces", "first_lesson"]);
    assert_eq!(record.current_streak(), 1);
}

#[tokio::test]
async fn direct_completion_of_graded_lesson_fills_objectives() {
    let progress = services().progress_service();

    let record = progress
        .record_lesson_completion(LessonId::new(2))
        .await
        .unwrap();

    let keys: Vec<String> = record
        .completed_objectives()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(keys, ["2_0", "2_1", "2_2"]);
    assert_eq!(
        ids(&record),
        [
            "center_control",
            "piece_development",
            "king_safety",
            "opening_principles",
            "first_lesson"
        ]
    );
    assert_eq!(record.current_streak(), 1);
}

#[tokio::test]
async fn objectives_finish_a_lesson_without_moving_the_streak() {
    let progress = services().progress_service();

    let mut record = None;
    for index in 0..3 {
        record = Some(
            progress
                .record_objective_completion(ObjectiveDraft {
                    lesson_id: Some(LessonId::new(2)),
                    objective_index: Some(index),
                })
                .await
                .unwrap(),
        );
    }
    let record = record.unwrap();

    assert!(record.is_lesson_completed(LessonId::new(2)));
    assert!(record.has_achievement(&AchievementId::new("opening_principles")));
    assert_eq!(record.current_streak(), 0);
}

#[tokio::test]
async fn objective_for_unknown_lesson_is_stored_only() {
    let progress = services().progress_service();

    let record = progress
        .record_objective_completion(ObjectiveDraft {
            lesson_id: Some(LessonId::new(99)),
            objective_index: Some(0),
        })
        .await
        .unwrap();

    assert_eq!(
        record.completed_objectives(),
        [ObjectiveKey::new(LessonId::new(99), 0)]
    );
    assert!(record.lessons().is_empty());
    assert!(record.achievements().is_empty());
}

#[tokio::test]
async fn finishing_the_course_unlocks_every_milestone() {
    let progress = services().progress_service();

    for id in 1..=3 {
        progress
            .record_lesson_completion(LessonId::new(id))
            .await
            .unwrap();
    }
    let record = progress
        .record_lesson_completion(LessonId::new(3))
        .await
        .unwrap();

    assert_eq!(record.current_streak(), 3);
    assert_eq!(record.completed_lesson_count(), 3);
    for milestone in ["first_lesson", "all_lessons", "three_day_streak"] {
        assert!(record.has_achievement(&AchievementId::new(milestone)));
    }
    let mut seen = ids(&record);
    let total = seen.len();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), total);
}

#[tokio::test]
async fn add_achievement_grants_catalog_entries_once() {
    let progress = services().progress_service();

    progress
        .unlock_achievement(AchievementId::new("tactics_master"))
        .await
        .unwrap();
    let record = progress
        .unlock_achievement(AchievementId::new("tactics_master"))
        .await
        .unwrap();
    assert_eq!(ids(&record), ["tactics_master"]);

    let err = progress
        .unlock_achievement(AchievementId::new("grandmaster"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProgressError::NotFound(_)));
}

#[tokio::test]
async fn import_rederives_completion_and_milestones() {
    let progress = services().progress_service();

    let err = progress
        .import_progress(ProgressDraft {
            achievements: Some(vec![AchievementId::new("grandmaster")]),
            ..ProgressDraft::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProgressError::Validation(ValidationError::Import(_))
    ));
    assert_eq!(progress.snapshot().await.unwrap().achievements().len(), 0);

    let record = progress
        .import_progress(ProgressDraft {
            completed_lesson_ids: Some(vec![LessonId::new(1), LessonId::new(3)]),
            achievements: Some(vec![AchievementId::new("all_lessons")]),
            current_streak: Some(2),
            ..ProgressDraft::default()
        })
        .await
        .unwrap();
    assert_eq!(
        record.completed_lesson_ids(),
        vec![LessonId::new(1), LessonId::new(3)]
    );
    assert!(record.has_achievement(&AchievementId::new("chess_pieces")));
    assert!(record.has_achievement(&AchievementId::new("tactics_master")));
    assert!(record.has_achievement(&AchievementId::new("first_lesson")));
    assert!(!record.has_achievement(&AchievementId::new("all_lessons")));
    assert_eq!(record.current_streak(), 2);
}

#[tokio::test]
async fn services_share_the_injected_storage() {
    let repo = InMemoryRepository::new();
    let storage = Storage {
        progress: Arc::new(repo.clone()),
    };
    let app = AppServices::new(
        fixed_clock(),
        Arc::new(Catalog::chess_fundamentals()),
        &storage,
    );

    app.progress_service()
        .record_lesson_completion(LessonId::new(1))
        .await
        .unwrap();

    let stored = repo.load_progress().await.unwrap();
    assert_eq!(stored.completed_lesson_ids(), vec![LessonId::new(1)]);
}

#[tokio::test]
async fn stored_progress_is_continued_not_restarted() {
    let catalog = Arc::new(Catalog::chess_fundamentals());
    let mut seeded = ProgressRecord::new();
    Reconciler::new(&catalog)
        .import(
            &mut seeded,
            ProgressDraft {
                completed_lesson_ids: Some(vec![LessonId::new(1)]),
                current_streak: Some(5),
                ..ProgressDraft::default()
            },
            fixed_now(),
        )
        .unwrap();
    assert_eq!(ids(&seeded), ["chess_pieces", "first_lesson", "three_day_streak"]);

    let repo = InMemoryRepository::with_progress(seeded);
    let progress = ProgressService::new(fixed_clock(), catalog, Arc::new(repo.clone()));

    let record = progress
        .record_lesson_completion(LessonId::new(2))
        .await
        .unwrap();

    assert_eq!(
        record.completed_lesson_ids(),
        vec![LessonId::new(1), LessonId::new(2)]
    );
    assert_eq!(record.current_streak(), 6);
    let first_lesson = ids(&record)
        .into_iter()
        .filter(|id| *id == "first_lesson")
        .count();
    assert_eq!(first_lesson, 1);
    assert_eq!(repo.load_progress().await.unwrap(), record);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_completions_are_not_lost() {
    let progress = services().progress_service();

    let mut tasks = Vec::new();
    for exercise in [
        "piece_movement",
        "board_setup",
        "center_control",
        "piece_development",
        "fork_practice",
        "pin_practice",
    ] {
        let ex_progress = Arc::clone(&progress);
        tasks.push(tokio::spawn(async move {
            ex_progress
                .record_exercise_completion(ExerciseId::new(exercise))
                .await
                .map(|_| ())
        }));
        let lesson_progress = Arc::clone(&progress);
        tasks.push(tokio::spawn(async move {
            lesson_progress
                .record_lesson_completion(LessonId::new(1))
                .await
                .map(|_| ())
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let record = progress.snapshot().await.unwrap();
    assert_eq!(record.completed_lesson_count(), 3);
    assert_eq!(record.current_streak(), 3);
    assert!(record.has_achievement(&AchievementId::new("all_lessons")));
    let mut seen = ids(&record);
    let total = seen.len();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), total);
}
