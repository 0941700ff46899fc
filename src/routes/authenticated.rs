use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Authenticated Router Module
///
/// Defines the routes accessible to any user who has successfully passed the
/// authentication layer. Every handler receives a validated `AuthUser`
/// identity context; the per-role visibility and mutation rules are then
/// enforced against the policy table inside the handlers, so a role without
/// an entry gets a Forbidden, never an empty result set.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // The identity context the request was resolved to.
        .route("/me", get(handlers::get_me))
        // GET /users?role=...
        // PL-only user directory, used when assigning lecturers.
        .route("/users", get(handlers::list_users))
        // GET /students
        // PL/PRL listing of all student accounts.
        .route("/students", get(handlers::list_students))
        // --- Courses ---
        // GET /courses: role-scoped listing; PL rows aggregate lecturer names.
        // POST /courses: PL creates a course.
        .route(
            "/courses",
            get(handlers::list_courses).post(handlers::create_course),
        )
        // GET /courses/available: courses the student has not enrolled in.
        .route("/courses/available", get(handlers::list_available_courses))
        // --- Enrollments ---
        // The (student, course) pair is unique; duplicates conflict.
        .route(
            "/enrollments",
            get(handlers::my_enrollments).post(handlers::enroll),
        )
        .route("/enrollments/{course_id}", delete(handlers::unenroll))
        // --- Lecture Reports ---
        // POST creates (lecturer only, auto-creating the course when needed);
        // GET lists under the caller's scope.
        .route(
            "/reports",
            get(handlers::list_reports).post(handlers::create_report),
        )
        // GET /reports/{id}: scoped single lookup.
        .route("/reports/{id}", get(handlers::get_report))
        // PUT /reports/{id}/feedback: PRL overwrites the feedback field.
        .route(
            "/reports/{id}/feedback",
            put(handlers::update_report_feedback),
        )
        // --- Ratings ---
        .route(
            "/ratings",
            get(handlers::list_ratings).post(handlers::create_rating),
        )
        // --- Dashboards ---
        // GET /monitoring: report + course + attendance projection, scoped
        // exactly like the report listing.
        .route("/monitoring", get(handlers::get_monitoring))
        // GET /classes: class-oriented course listing; students denied.
        .route("/classes", get(handlers::list_classes))
}
