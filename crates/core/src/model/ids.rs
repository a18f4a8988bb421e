use std::fmt;
use std::str::FromStr;

/// Unique identifier for a Lesson
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LessonId(u64);

impl LessonId {
    /// Creates a new `LessonId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Identifier of an interactive exercise, e.g. `board_setup`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExerciseId(String);

impl ExerciseId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of an achievement, e.g. `first_lesson`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AchievementId(String);

impl AchievementId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Position of an objective inside a lesson.
///
/// Printed and parsed as `"{lesson_id}_{index}"`, which is also the key used in
/// the completed-objectives list and the objective achievement table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectiveKey {
    lesson_id: LessonId,
    index: u32,
}

impl ObjectiveKey {
    #[must_use]
    pub fn new(lesson_id: LessonId, index: u32) -> Self {
        Self { lesson_id, index }
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Debug for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LessonId({})", self.0)
    }
}

impl fmt::Debug for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExerciseId({})", self.0)
    }
}

impl fmt::Debug for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AchievementId({})", self.0)
    }
}

impl fmt::Debug for ObjectiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectiveKey({}_{})", self.lesson_id.0, self.index)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ObjectiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.lesson_id, self.index)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

/// Plain ASCII digits only. `str::parse` on integers also takes a leading `+`.
fn parse_digits<T: FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl FromStr for LessonId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_digits(s).map(LessonId::new).ok_or_else(|| ParseIdError {
            kind: "LessonId".to_string(),
        })
    }
}

impl FromStr for ObjectiveKey {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseIdError {
            kind: "ObjectiveKey".to_string(),
        };
        let (lesson, index) = s.split_once('_').ok_or_else(err)?;
        let lesson_id = parse_digits(lesson).ok_or_else(err)?;
        let index = parse_digits(index).ok_or_else(err)?;
        Ok(ObjectiveKey::new(LessonId::new(lesson_id), index))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_id_display() {
        let id = LessonId::new(42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_lesson_id_from_str() {
        let id: LessonId = "3".parse().unwrap();
        assert_eq!(id, LessonId::new(3));
    }

    #[test]
    fn test_lesson_id_from_str_invalid() {
        let result = "not-a-number".parse::<LessonId>();
        assert!(result.is_err());
    }

    #[test]
    fn test_lesson_id_from_str_rejects_sign_and_whitespace() {
        assert!("+2".parse::<LessonId>().is_err());
        assert!("-2".parse::<LessonId>().is_err());
        assert!(" 2".parse::<LessonId>().is_err());
        assert!("".parse::<LessonId>().is_err());
    }

    #[test]
    fn test_objective_key_display() {
        let key = ObjectiveKey::new(LessonId::new(2), 1);
        assert_eq!(key.to_string(), "2_1");
    }

    #[test]
    fn test_objective_key_from_str() {
        let key: ObjectiveKey = "99_0".parse().unwrap();
        assert_eq!(key.lesson_id(), LessonId::new(99));
        assert_eq!(key.index(), 0);
    }

    #[test]
    fn test_objective_key_from_str_rejects_malformed() {
        assert!("2-1".parse::<ObjectiveKey>().is_err());
        assert!("x_1".parse::<ObjectiveKey>().is_err());
        assert!("2_".parse::<ObjectiveKey>().is_err());
        assert!("2_1_3".parse::<ObjectiveKey>().is_err());
        assert!("+2_1".parse::<ObjectiveKey>().is_err());
        assert!("2_+1".parse::<ObjectiveKey>().is_err());
    }

    #[test]
    fn test_string_ids_display_raw_value() {
        assert_eq!(ExerciseId::new("board_setup").to_string(), "board_setup");
        assert_eq!(AchievementId::new("first_lesson").as_str(), "first_lesson");
    }
}
