use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use crate::model::{
    Achievement, AchievementId, ExerciseId, Lesson, LessonError, LessonId, Milestone,
    ObjectiveKey,
};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Lesson(#[from] LessonError),

    #[error("lesson {0} is defined twice")]
    DuplicateLesson(LessonId),

    #[error("exercise {exercise} belongs to lessons {first} and {second}")]
    SharedExercise {
        exercise: ExerciseId,
        first: LessonId,
        second: LessonId,
    },

    #[error("exercise {0} is mapped to an objective but no lesson lists it")]
    UnknownExercise(ExerciseId),

    #[error("exercise {exercise} is mapped to objective {key} of another lesson")]
    ForeignObjective {
        exercise: ExerciseId,
        key: ObjectiveKey,
    },

    #[error("objective {0} does not exist")]
    UnknownObjective(ObjectiveKey),

    #[error("achievement id {0} is used more than once")]
    DuplicateAchievement(AchievementId),
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// The ordered, read-only set of lessons plus the lookup tables the reconciler
/// needs: exercise to lesson, exercise to objective, and objective achievements.
#[derive(Debug, Clone)]
pub struct Catalog {
    lessons: Vec<Lesson>,
    exercise_lessons: HashMap<ExerciseId, LessonId>,
    exercise_objectives: HashMap<ExerciseId, ObjectiveKey>,
    objective_achievements: Vec<(ObjectiveKey, Achievement)>,
}

impl Catalog {
    /// Builds a catalog and its indexes.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if lesson ids repeat, an exercise is shared by two
    /// lessons, an objective mapping points at a missing or foreign objective, or
    /// an achievement id is used twice (milestone ids included).
    pub fn new(
        lessons: Vec<Lesson>,
        exercise_objectives: Vec<(ExerciseId, ObjectiveKey)>,
        objective_achievements: Vec<(ObjectiveKey, Achievement)>,
    ) -> Result<Self, CatalogError> {
        let mut exercise_lessons = HashMap::new();
        for (pos, lesson) in lessons.iter().enumerate() {
            if lessons[..pos].iter().any(|l| l.id() == lesson.id()) {
                return Err(CatalogError::DuplicateLesson(lesson.id()));
            }
            for exercise in lesson.interactive_exercises() {
                if let Some(first) = exercise_lessons.insert(exercise.clone(), lesson.id()) {
                    return Err(CatalogError::SharedExercise {
                        exercise: exercise.clone(),
                        first,
                        second: lesson.id(),
                    });
                }
            }
        }

        let find_lesson = |key: ObjectiveKey| {
            lessons
                .iter()
                .find(|l| l.id() == key.lesson_id())
                .filter(|l| (key.index() as usize) < l.objectives().len())
        };

        let mut objectives_by_exercise = HashMap::new();
        for (exercise, key) in exercise_objectives {
            let owner = exercise_lessons
                .get(&exercise)
                .copied()
                .ok_or_else(|| CatalogError::UnknownExercise(exercise.clone()))?;
            if owner != key.lesson_id() {
                return Err(CatalogError::ForeignObjective { exercise, key });
            }
            if find_lesson(key).is_none() {
                return Err(CatalogError::UnknownObjective(key));
            }
            objectives_by_exercise.insert(exercise, key);
        }

        for (key, _) in &objective_achievements {
            if find_lesson(*key).is_none() {
                return Err(CatalogError::UnknownObjective(*key));
            }
        }

        let catalog = Self {
            lessons,
            exercise_lessons,
            exercise_objectives: objectives_by_exercise,
            objective_achievements,
        };
        catalog.check_unique_achievements()?;
        Ok(catalog)
    }

    fn check_unique_achievements(&self) -> Result<(), CatalogError> {
        let all = self.achievements();
        for (pos, achievement) in all.iter().enumerate() {
            if all[..pos].iter().any(|a| a.id() == achievement.id()) {
                return Err(CatalogError::DuplicateAchievement(achievement.id().clone()));
            }
        }
        Ok(())
    }

    /// The three-lesson chess fundamentals course.
    ///
    /// # Panics
    ///
    /// Panics if the built-in definitions are inconsistent, which the unit tests rule out.
    #[must_use]
    pub fn chess_fundamentals() -> Self {
        build_chess_fundamentals().expect("built-in catalog should be valid")
    }

    /// Lessons in insertion order.
    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    #[must_use]
    pub fn lesson(&self, id: LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id() == id)
    }

    #[must_use]
    pub fn lesson_for_exercise(&self, exercise: &ExerciseId) -> Option<LessonId> {
        self.exercise_lessons.get(exercise).copied()
    }

    #[must_use]
    pub fn objective_for_exercise(&self, exercise: &ExerciseId) -> Option<ObjectiveKey> {
        self.exercise_objectives.get(exercise).copied()
    }

    #[must_use]
    pub fn objective_achievement(&self, key: ObjectiveKey) -> Option<&Achievement> {
        self.objective_achievements
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, a)| a)
    }

    /// Every achievement the catalog can award: lesson achievements, objective
    /// achievements, then milestones.
    #[must_use]
    pub fn achievements(&self) -> Vec<Achievement> {
        self.lessons
            .iter()
            .filter_map(Lesson::achievement)
            .chain(self.objective_achievements.iter().map(|(_, a)| a))
            .cloned()
            .chain(Milestone::ALL.into_iter().map(Milestone::achievement))
            .collect()
    }

    /// Resolves a lesson or objective achievement by id. Milestones are not returned.
    #[must_use]
    pub fn grantable_achievement(&self, id: &AchievementId) -> Option<&Achievement> {
        self.lessons
            .iter()
            .filter_map(Lesson::achievement)
            .chain(self.objective_achievements.iter().map(|(_, a)| a))
            .find(|a| a.id() == id)
    }
}

//
// ─── DOCUMENT FORMAT ───────────────────────────────────────────────────────────
//

/// JSON shape for loading a catalog from disk.
///
/// Lessons use the same field names the lesson endpoints return.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogDocument {
    pub lessons: Vec<LessonDocument>,
    #[serde(default)]
    pub exercise_objectives: Vec<ExerciseObjectiveDocument>,
    #[serde(default)]
    pub objective_achievements: Vec<ObjectiveAchievementDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LessonDocument {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub interactive_exercises: Vec<String>,
    #[serde(default)]
    pub achievement: Option<AchievementDocument>,
    #[serde(default)]
    pub grades_objectives: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AchievementDocument {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseObjectiveDocument {
    pub exercise_id: String,
    pub lesson_id: u64,
    pub objective_index: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectiveAchievementDocument {
    pub lesson_id: u64,
    pub objective_index: u32,
    #[serde(flatten)]
    pub achievement: AchievementDocument,
}

impl From<AchievementDocument> for Achievement {
    fn from(doc: AchievementDocument) -> Self {
        let achievement = Achievement::new(doc.id, doc.title, doc.description);
        match doc.icon {
            Some(icon) => achievement.with_icon(icon),
            None => achievement,
        }
    }
}

impl TryFrom<CatalogDocument> for Catalog {
    type Error = CatalogError;

    fn try_from(doc: CatalogDocument) -> Result<Self, Self::Error> {
        let mut lessons = Vec::with_capacity(doc.lessons.len());
        for entry in doc.lessons {
            let mut lesson = Lesson::new(
                LessonId::new(entry.id),
                entry.title,
                entry.description,
                entry.content,
                entry.objectives,
                entry
                    .interactive_exercises
                    .into_iter()
                    .map(ExerciseId::new)
                    .collect(),
            )?;
            if let Some(achievement) = entry.achievement {
                lesson = lesson.with_achievement(achievement.into());
            }
            if entry.grades_objectives {
                lesson = lesson.with_graded_objectives();
            }
            lessons.push(lesson);
        }

        let exercise_objectives = doc
            .exercise_objectives
            .into_iter()
            .map(|m| {
                (
                    ExerciseId::new(m.exercise_id),
                    ObjectiveKey::new(LessonId::new(m.lesson_id), m.objective_index),
                )
            })
            .collect();
        let objective_achievements = doc
            .objective_achievements
            .into_iter()
            .map(|m| {
                (
                    ObjectiveKey::new(LessonId::new(m.lesson_id), m.objective_index),
                    m.achievement.into(),
                )
            })
            .collect();

        Catalog::new(lessons, exercise_objectives, objective_achievements)
    }
}

//
// ─── BUILT-IN CONTENT ──────────────────────────────────────────────────────────
//

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn exercises(items: &[&str]) -> Vec<ExerciseId> {
    items.iter().map(|s| ExerciseId::new(*s)).collect()
}

fn build_chess_fundamentals() -> Result<Catalog, CatalogError> {
    let pieces = Lesson::new(
        LessonId::new(1),
        "Chess Pieces & Board Setup",
        "Learn about each chess piece, how it moves, and how to set up the board correctly.",
        "In this lesson, you will learn about all six chess pieces: Pawn, Knight, Bishop, Rook, \
         Queen, and King. You'll also learn how to properly set up a chess board.",
        strings(&[
            "Identify all chess pieces",
            "Understand how each piece moves",
            "Set up a chess board correctly",
        ]),
        exercises(&["piece_movement", "board_setup"]),
    )?
    .with_achievement(
        Achievement::new(
            "chess_pieces",
            "Chess Pieces Master",
            "Completed the lesson on Chess Pieces & Board Setup",
        )
        .with_icon("♟️"),
    );

    let openings = Lesson::new(
        LessonId::new(2),
        "Basic Opening Principles",
        "Learn fundamental principles to start your chess games effectively.",
        "Opening principles include controlling the center, developing your pieces, and \
         castling for king safety.",
        strings(&[
            "Control the center",
            "Develop your pieces",
            "Castle for king safety",
        ]),
        exercises(&["center_control", "piece_development"]),
    )?
    .with_achievement(
        Achievement::new(
            "opening_principles",
            "Opening Expert",
            "Mastered the Basic Opening Principles",
        )
        .with_icon("♘"),
    )
    .with_graded_objectives();

    let tactics = Lesson::new(
        LessonId::new(3),
        "Simple Tactics: Forks & Pins",
        "Learn about forks, pins, and how they can give you an advantage.",
        "Tactics are short sequences of moves that result in a tangible gain. Forks attack two \
         pieces simultaneously, while pins restrict piece movement.",
        strings(&[
            "Identify and execute forks",
            "Recognize pin opportunities",
            "Defend against common tactics",
        ]),
        exercises(&["fork_practice", "pin_practice"]),
    )?
    .with_achievement(
        Achievement::new(
            "tactics_master",
            "Tactics Master",
            "Learned about Forks & Pins tactics",
        )
        .with_icon("♖"),
    );

    let openings_id = openings.id();
    let objective = |index| ObjectiveKey::new(openings_id, index);

    Catalog::new(
        vec![pieces, openings, tactics],
        vec![
            (ExerciseId::new("center_control"), objective(0)),
            (ExerciseId::new("piece_development"), objective(1)),
        ],
        vec![
            (
                objective(0),
                Achievement::new(
                    "center_control",
                    "Center Commander",
                    "Learned how to control the center of the board",
                )
                .with_icon("♙"),
            ),
            (
                objective(1),
                Achievement::new(
                    "piece_development",
                    "Development Director",
                    "Mastered the skill of developing your pieces efficiently",
                )
                .with_icon("♗"),
            ),
            (
                objective(2),
                Achievement::new(
                    "king_safety",
                    "Castle Keeper",
                    "Learned the importance of castling for king safety",
                )
                .with_icon("♚"),
            ),
        ],
    )
}
