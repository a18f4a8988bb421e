use std::sync::Arc;

use chess_edu_core::Catalog;
use chess_edu_core::model::{Achievement, Lesson, LessonId};

use crate::error::NotFoundError;

/// Read-only access to the lesson catalog.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<Catalog>,
}

impl CatalogService {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// All lessons in catalog order.
    #[must_use]
    pub fn list_lessons(&self) -> &[Lesson] {
        self.catalog.lessons()
    }

    /// Fetch a lesson by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError::Lesson` when the catalog has no such lesson.
    pub fn get_lesson(&self, id: LessonId) -> Result<&Lesson, NotFoundError> {
        self.catalog.lesson(id).ok_or(NotFoundError::Lesson(id))
    }

    /// Every achievement that can be earned, including milestones.
    #[must_use]
    pub fn achievements(&self) -> Vec<Achievement> {
        self.catalog.achievements()
    }
}
