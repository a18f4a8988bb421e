//! HTTP surface for the lesson and progress services.

#![forbid(unsafe_code)]

pub mod dto;
pub mod error;
pub mod handlers;

use std::path::PathBuf;

use axum::Router;
use axum::routing::{get, post};
use services::AppServices;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Build the application router.
///
/// When `static_dir` is set its files are served under `/static`.
pub fn router(app: AppServices, static_dir: Option<PathBuf>) -> Router {
    let mut router = Router::new()
        .route("/lessons", get(handlers::list_lessons))
        .route("/lesson/{id}", get(handlers::get_lesson))
        .route("/achievements", get(handlers::list_achievements))
        .route("/progress", get(handlers::get_progress))
        .route("/progress/complete-lesson", post(handlers::complete_lesson))
        .route("/progress/complete-objective", post(handlers::complete_objective))
        .route("/progress/add-achievement", post(handlers::add_achievement))
        .route("/api/complete-exercise", post(handlers::complete_exercise))
        .route("/save-progress", post(handlers::save_progress))
        .with_state(app);

    if let Some(dir) = static_dir {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router.layer(TraceLayer::new_for_http())
}
