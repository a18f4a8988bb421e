use crate::model::ids::AchievementId;

/// Streak length that unlocks [`Milestone::ThreeDayStreak`].
pub const STREAK_MILESTONE_THRESHOLD: u32 = 3;

/// An unlockable badge shown on the achievements page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    id: AchievementId,
    title: String,
    description: String,
    icon: Option<String>,
}

impl Achievement {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: AchievementId::new(id),
            title: title.into(),
            description: description.into(),
            icon: None,
        }
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &AchievementId {
        &self.id
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
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }
}

/// Catalog-wide achievements derived from aggregate progress rather than a
/// single lesson or objective.
///
/// Milestones are never granted directly; they follow from the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    /// At least one lesson completed.
    FirstLesson,
    /// Every lesson in the catalog completed.
    AllLessons,
    /// Streak counter reached [`STREAK_MILESTONE_THRESHOLD`].
    ThreeDayStreak,
}

impl Milestone {
    /// All milestones, in the order they are appended when several unlock at once.
    pub const ALL: [Milestone; 3] = [
        Milestone::FirstLesson,
        Milestone::AllLessons,
        Milestone::ThreeDayStreak,
    ];

    #[must_use]
    pub fn id_str(self) -> &'static str {
        match self {
            Milestone::FirstLesson => "first_lesson",
            Milestone::AllLessons => "all_lessons",
            Milestone::ThreeDayStreak => "three_day_streak",
        }
    }

    #[must_use]
    pub fn from_id(id: &AchievementId) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.id_str() == id.as_str())
    }

    #[must_use]
    pub fn achievement(self) -> Achievement {
        match self {
            Milestone::FirstLesson => Achievement::new(
                self.id_str(),
                "First Step",
                "Completed your first chess lesson!",
            )
            .with_icon("🏆"),
            Milestone::AllLessons => Achievement::new(
                self.id_str(),
                "Chess Fundamentals Graduate",
                "Completed all basic chess lessons!",
            )
            .with_icon("🎓"),
            Milestone::ThreeDayStreak => Achievement::new(
                self.id_str(),
                "Consistent Learner",
                "You've maintained a 3-day learning streak!",
            )
            .with_icon("🔥"),
        }
    }
}
