use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get},
};

/// PL Router Module
///
/// Defines the lecture assignment endpoints, exclusively accessible to the
/// 'pl' role. Every handler authenticates via the `AuthUser` extractor and
/// then checks the role explicitly, so an unauthenticated caller gets 401
/// and an authenticated non-PL gets 403, including PRLs, who are denied
/// here rather than shown an empty list.
pub fn assignment_routes() -> Router<AppState> {
    Router::new()
        // GET /assignments
        // All assignments joined with course and lecturer identity.
        // POST /assignments
        // Assigns a lecturer to a course; the pair is unique.
        .route(
            "/",
            get(handlers::list_assignments).post(handlers::create_assignment),
        )
        // DELETE /assignments/{id}
        // Unassigns a lecturer. The joined record is read before deletion
        // and returned for audit display.
        .route("/{id}", delete(handlers::delete_assignment))
}
