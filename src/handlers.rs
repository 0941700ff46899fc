use crate::{
    AppState,
    auth::{self, AuthUser},
    error::ApiError,
    models::{
        AssignLecturerRequest, AssignmentChanged, AssignmentRow, AuthResponse, Course,
        CourseCreated, CourseWithLecturers, CreateCourseRequest, CreateRatingRequest,
        CreateReportRequest, Enrollment, EnrollmentChanged, EnrollRequest, FeedbackRequest,
        LoginRequest, MonitoringRow, NewCourse, NewUser, RatingCreated, RatingRow,
        RegisterRequest, ReportCreated, ReportWithCourse, Role, User, UserProfile,
    },
    policy::{Resource, Scope, scope_for},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

// --- Filter Structs ---

/// UserFilter
///
/// Accepted query parameters for the user directory endpoint (GET /users).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct UserFilter {
    /// Restrict the listing to one role (e.g. `lecturer` when picking
    /// assignees).
    pub role: Option<Role>,
}

// --- Auth Handlers ---

/// register
///
/// [Public Route] Creates an account, hashes the password, and issues a
/// bearer token in one step.
///
/// *Guard rules*: name/email/password must be non-empty; a `prl` account must
/// carry a faculty (its entire read scope depends on it); a registered email
/// is rejected with a duplicate conflict, not overwritten.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered", body = AuthResponse),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(ApiError::validation("name, email and password are required"));
    }

    let role = payload.role.unwrap_or_default();
    let faculty = payload.faculty.filter(|f| !f.trim().is_empty());
    if role == Role::Prl && faculty.is_none() {
        return Err(ApiError::validation("faculty is required for prl accounts"));
    }

    if state
        .repo
        .find_user_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(ApiError::duplicate("email already registered"));
    }

    let password_hash = auth::hash_password(&payload.password)?;
    let user = state
        .repo
        .create_user(NewUser {
            name: payload.name,
            email: payload.email,
            password_hash,
            role,
            faculty,
        })
        .await?;

    let token = auth::issue_token(&user, &state.config)?;
    Ok(Json(AuthResponse { token, user }))
}

/// login
///
/// [Public Route] Verifies credentials and issues a bearer token.
///
/// An unknown email and a wrong password produce the same rejection, so the
/// endpoint cannot be used to probe which addresses are registered.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let stored = state
        .repo
        .find_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::unauthenticated("invalid credentials"))?;

    if !auth::verify_password(&payload.password, &stored.password_hash)? {
        return Err(ApiError::unauthenticated("invalid credentials"));
    }

    let user = User::from(stored);
    let token = auth::issue_token(&user, &state.config)?;
    Ok(Json(AuthResponse { token, user }))
}

/// get_me
///
/// [Authenticated Route] Returns the identity context the request was
/// resolved to.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_me(user: AuthUser) -> Json<UserProfile> {
    Json(UserProfile {
        id: user.id,
        name: user.name,
        role: user.role,
        faculty: user.faculty,
    })
}

/// list_users
///
/// [PL Route] The user directory, optionally filtered by role. Program
/// leaders use this to pick lecturers when creating assignments.
#[utoipa::path(
    get,
    path = "/users",
    params(UserFilter),
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 403, description = "Not a program leader")
    )
)]
pub async fn list_users(
    user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Vec<User>>, ApiError> {
    if user.role != Role::Pl {
        return Err(ApiError::forbidden("only program leaders can view users"));
    }
    Ok(Json(state.repo.list_users(filter.role).await?))
}

/// list_students
///
/// [PL/PRL Route] All student accounts, ordered by name.
#[utoipa::path(
    get,
    path = "/students",
    responses(
        (status = 200, description = "Students", body = [User]),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_students(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    if user.role != Role::Pl && user.role != Role::Prl {
        return Err(ApiError::forbidden("only PL or PRL can view students"));
    }
    Ok(Json(state.repo.list_users(Some(Role::Student)).await?))
}

// --- Course Handlers ---

/// list_courses
///
/// [Authenticated Route] The role-scoped course listing: students see their
/// enrolled courses, lecturers their assigned ones, PRLs their faculty, and
/// program leaders everything, with the assigned lecturer names aggregated
/// per course.
#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "Courses visible to the caller", body = [CourseWithLecturers])
    )
)]
pub async fn list_courses(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let scope = scope_for(Resource::Courses, &user)?;
    match scope {
        Scope::All => {
            let courses = state.repo.list_courses_with_lecturers().await?;
            Ok(Json(courses).into_response())
        }
        other => {
            let courses = state.repo.list_courses(&other).await?;
            Ok(Json(courses).into_response())
        }
    }
}

/// create_course
///
/// [PL Route] Creates a course. Optional fields are normalized before the
/// insert: venue and scheduled_time default to empty strings,
/// total_registered to zero. Never NULL, so downstream aggregation always
/// has totals to work with.
#[utoipa::path(
    post,
    path = "/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 200, description = "Created", body = CourseCreated),
        (status = 403, description = "Not a program leader")
    )
)]
pub async fn create_course(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<Json<CourseCreated>, ApiError> {
    if user.role != Role::Pl {
        return Err(ApiError::forbidden("only program leaders can add courses"));
    }

    let course = state.repo.create_course(NewCourse::from(payload)).await?;
    Ok(Json(CourseCreated {
        message: "course added successfully".to_string(),
        course,
    }))
}

/// list_available_courses
///
/// [Student Route] Courses the student has not enrolled in yet: the
/// complement of their enrollment set.
#[utoipa::path(
    get,
    path = "/courses/available",
    responses(
        (status = 200, description = "Courses open for enrollment", body = [Course]),
        (status = 403, description = "Not a student")
    )
)]
pub async fn list_available_courses(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Course>>, ApiError> {
    if user.role != Role::Student {
        return Err(ApiError::forbidden("only students can view available courses"));
    }
    Ok(Json(state.repo.list_available_courses(user.id).await?))
}

// --- Enrollment Handlers ---

/// enroll
///
/// [Student Route] Enrolls the caller in a course. The (student, course)
/// pair is unique; a duplicate attempt is rejected with a conflict and the
/// existing enrollment is left untouched.
#[utoipa::path(
    post,
    path = "/enrollments",
    request_body = EnrollRequest,
    responses(
        (status = 200, description = "Enrolled", body = EnrollmentChanged),
        (status = 409, description = "Already enrolled")
    )
)]
pub async fn enroll(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<EnrollRequest>,
) -> Result<Json<EnrollmentChanged>, ApiError> {
    if user.role != Role::Student {
        return Err(ApiError::forbidden("only students can enroll"));
    }

    let enrollment = Enrollment {
        student_id: user.id,
        course_id: payload.course_id,
    };

    if !state.repo.enroll(enrollment.clone()).await? {
        return Err(ApiError::duplicate("already enrolled in this course"));
    }

    Ok(Json(EnrollmentChanged {
        message: "enrolled successfully".to_string(),
        enrollment,
    }))
}

/// unenroll
///
/// [Student Route] Removes the caller's enrollment in a course and returns
/// the pair as it existed before deletion.
#[utoipa::path(
    delete,
    path = "/enrollments/{course_id}",
    params(("course_id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Unenrolled", body = EnrollmentChanged),
        (status = 404, description = "Not enrolled")
    )
)]
pub async fn unenroll(
    user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<EnrollmentChanged>, ApiError> {
    if user.role != Role::Student {
        return Err(ApiError::forbidden("only students can unenroll"));
    }

    let enrollment = state
        .repo
        .unenroll(Enrollment {
            student_id: user.id,
            course_id,
        })
        .await?
        .ok_or_else(|| ApiError::not_found("not enrolled in this course"))?;

    Ok(Json(EnrollmentChanged {
        message: "unenrolled successfully".to_string(),
        enrollment,
    }))
}

/// my_enrollments
///
/// [Student Route] The caller's enrolled courses.
#[utoipa::path(
    get,
    path = "/enrollments",
    responses(
        (status = 200, description = "Enrolled courses", body = [Course]),
        (status = 403, description = "Not a student")
    )
)]
pub async fn my_enrollments(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Course>>, ApiError> {
    if user.role != Role::Student {
        return Err(ApiError::forbidden("only students can view enrolled courses"));
    }
    Ok(Json(state.repo.enrolled_courses(user.id).await?))
}

// --- Lecture Assignment Handlers ---

/// list_assignments
///
/// [PL Route] All lecture assignments, joined with course and lecturer
/// identity. Every other role (including PRL) receives Forbidden, never an
/// empty list.
#[utoipa::path(
    get,
    path = "/assignments",
    responses(
        (status = 200, description = "Assignments", body = [AssignmentRow]),
        (status = 403, description = "Not a program leader")
    )
)]
pub async fn list_assignments(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AssignmentRow>>, ApiError> {
    scope_for(Resource::Assignments, &user)?;
    Ok(Json(state.repo.list_assignments().await?))
}

/// create_assignment
///
/// [PL Route] Assigns a lecturer to a course. The (course, lecturer) pair is
/// unique; duplicates are rejected with a conflict.
#[utoipa::path(
    post,
    path = "/assignments",
    request_body = AssignLecturerRequest,
    responses(
        (status = 200, description = "Assigned", body = AssignmentChanged),
        (status = 409, description = "Already assigned")
    )
)]
pub async fn create_assignment(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<AssignLecturerRequest>,
) -> Result<Json<AssignmentChanged>, ApiError> {
    if user.role != Role::Pl {
        return Err(ApiError::forbidden("only program leaders can assign lecturers"));
    }

    let assignment = state
        .repo
        .create_assignment(payload.course_id, payload.lecturer_id)
        .await?;

    Ok(Json(AssignmentChanged {
        message: "lecturer assigned successfully".to_string(),
        assignment,
    }))
}

/// delete_assignment
///
/// [PL Route] Unassigns a lecturer. The joined record is read *before* the
/// delete and returned in the confirmation; reconstructing it afterwards
/// would be impossible once the row is gone.
#[utoipa::path(
    delete,
    path = "/assignments/{id}",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Unassigned", body = AssignmentChanged),
        (status = 404, description = "Assignment not found")
    )
)]
pub async fn delete_assignment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AssignmentChanged>, ApiError> {
    if user.role != Role::Pl {
        return Err(ApiError::forbidden("only program leaders can unassign lecturers"));
    }

    let assignment = state
        .repo
        .get_assignment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("assignment not found"))?;

    if !state.repo.delete_assignment(id).await? {
        // Deleted concurrently between the read and the delete.
        return Err(ApiError::not_found("assignment not found"));
    }

    Ok(Json(AssignmentChanged {
        message: "lecturer unassigned successfully".to_string(),
        assignment,
    }))
}

// --- Lecture Report Handlers ---

/// create_report
///
/// [Lecturer Route] Submits a lecture report.
///
/// *Guard rules*: with no `course_id`, both `course_name` and `course_code`
/// are required, and the course is then created atomically with the report.
/// With a `course_id` and no `total_registered`, the course's current value
/// is snapshotted into the report. The author's name is always taken from
/// the identity context, never from the payload.
#[utoipa::path(
    post,
    path = "/reports",
    request_body = CreateReportRequest,
    responses(
        (status = 200, description = "Submitted", body = ReportCreated),
        (status = 400, description = "Missing course details"),
        (status = 403, description = "Not a lecturer")
    )
)]
pub async fn create_report(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateReportRequest>,
) -> Result<Json<ReportCreated>, ApiError> {
    if user.role != Role::Lecturer {
        return Err(ApiError::forbidden("only lecturers can submit reports"));
    }

    if payload.course_id.is_none() {
        let has_name = payload
            .course_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        let has_code = payload
            .course_code
            .as_deref()
            .is_some_and(|code| !code.trim().is_empty());
        if !has_name || !has_code {
            return Err(ApiError::validation(
                "either select an existing course or enter course details",
            ));
        }
    }

    let report = state
        .repo
        .create_report(payload, user.id, &user.name)
        .await?;

    Ok(Json(ReportCreated {
        message: "report submitted successfully".to_string(),
        report,
    }))
}

/// list_reports
///
/// [Authenticated Route] The role-scoped report listing: students see
/// reports for their enrolled courses, lecturers their own submissions, PRLs
/// their faculty, program leaders everything. Most recent lecture first.
#[utoipa::path(
    get,
    path = "/reports",
    responses((status = 200, description = "Reports visible to the caller", body = [ReportWithCourse]))
)]
pub async fn list_reports(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ReportWithCourse>>, ApiError> {
    let scope = scope_for(Resource::Reports, &user)?;
    Ok(Json(state.repo.list_reports(&scope).await?))
}

/// get_report
///
/// [Authenticated Route] Single report lookup under the caller's scope. A
/// report outside the scope yields the same NotFound as an absent id.
#[utoipa::path(
    get,
    path = "/reports/{id}",
    params(("id" = i32, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Found", body = ReportWithCourse),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_report(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ReportWithCourse>, ApiError> {
    let scope = scope_for(Resource::Reports, &user)?;
    let report = state
        .repo
        .get_report(id, &scope)
        .await?
        .ok_or_else(|| ApiError::not_found("report not found"))?;
    Ok(Json(report))
}

/// update_report_feedback
///
/// [PRL Route] Overwrites the report's feedback field. Last writer wins; no
/// merging. Returns the updated joined report.
#[utoipa::path(
    put,
    path = "/reports/{id}/feedback",
    params(("id" = i32, Path, description = "Report ID")),
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Feedback saved", body = ReportCreated),
        (status = 403, description = "Not a PRL"),
        (status = 404, description = "Report not found")
    )
)]
pub async fn update_report_feedback(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<Json<ReportCreated>, ApiError> {
    if user.role != Role::Prl {
        return Err(ApiError::forbidden("only PRLs can add feedback"));
    }

    let report = state
        .repo
        .set_report_feedback(id, &payload.feedback)
        .await?
        .ok_or_else(|| ApiError::not_found("report not found"))?;

    Ok(Json(ReportCreated {
        message: "feedback added successfully".to_string(),
        report,
    }))
}

// --- Rating Handlers ---

/// create_rating
///
/// [Student Route] Submits a course rating. Scores are bounded to 1-5.
/// Whether a student may rate the same course twice is configuration-driven
/// (one rating per course by default).
#[utoipa::path(
    post,
    path = "/ratings",
    request_body = CreateRatingRequest,
    responses(
        (status = 200, description = "Submitted", body = RatingCreated),
        (status = 400, description = "Score out of bounds"),
        (status = 409, description = "Course already rated")
    )
)]
pub async fn create_rating(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateRatingRequest>,
) -> Result<Json<RatingCreated>, ApiError> {
    if user.role != Role::Student {
        return Err(ApiError::forbidden("only students can submit ratings"));
    }
    if !(1..=5).contains(&payload.score) {
        return Err(ApiError::validation("score must be between 1 and 5"));
    }

    let rating = state
        .repo
        .create_rating(user.id, payload, state.config.one_rating_per_course)
        .await?;

    Ok(Json(RatingCreated {
        message: "rating submitted successfully".to_string(),
        rating,
    }))
}

/// list_ratings
///
/// [Authenticated Route] Role-scoped rating listing: students see their own
/// submissions, lecturers the ratings on their assigned courses, PRLs their
/// faculty, program leaders everything. Most recent first.
#[utoipa::path(
    get,
    path = "/ratings",
    responses((status = 200, description = "Ratings visible to the caller", body = [RatingRow]))
)]
pub async fn list_ratings(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<RatingRow>>, ApiError> {
    let scope = scope_for(Resource::Ratings, &user)?;
    Ok(Json(state.repo.list_ratings(&scope).await?))
}

// --- Monitoring & Classes ---

/// get_monitoring
///
/// [Authenticated Route] The monitoring dashboard: reports joined with their
/// courses, attendance figures alongside the descriptive fields. Visibility
/// is the *report* scope; the façade holds no predicate logic of its own.
#[utoipa::path(
    get,
    path = "/monitoring",
    responses((status = 200, description = "Monitoring rows", body = [MonitoringRow]))
)]
pub async fn get_monitoring(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<MonitoringRow>>, ApiError> {
    let scope = scope_for(Resource::Reports, &user)?;
    Ok(Json(state.repo.monitoring_rows(&scope).await?))
}

/// list_classes
///
/// [Authenticated Route] The class-oriented course listing, ordered by class
/// name. Students have no entry in the policy table for this family and are
/// denied outright.
#[utoipa::path(
    get,
    path = "/classes",
    responses(
        (status = 200, description = "Classes visible to the caller", body = [Course]),
        (status = 403, description = "Access denied")
    )
)]
pub async fn list_classes(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Course>>, ApiError> {
    let scope = scope_for(Resource::Classes, &user)?;
    Ok(Json(state.repo.list_classes(&scope).await?))
}
