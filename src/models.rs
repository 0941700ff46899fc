use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// Role
///
/// The RBAC discriminator stored in the `user_role` Postgres enum.
/// Every query and mutation is gated on this value; it is resolved from the
/// database on each request, never trusted from the client.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    Student,
    Lecturer,
    /// Program Reviewer/Leader for one faculty. Faculty-scoped reads, sole
    /// writer of report feedback.
    Prl,
    /// Program Leader. Unrestricted reads, sole writer for courses and
    /// lecture assignments.
    Pl,
}

/// User
///
/// The public identity record from the `users` table. The password hash never
/// leaves the repository layer (see `StoredUser`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// The faculty this account belongs to. Required for 'prl' accounts,
    /// optional for everyone else.
    pub faculty: Option<String>,
}

/// StoredUser
///
/// Internal row used only by the login flow: the `User` fields plus the
/// opaque Argon2id credential for verification. Never serialized to clients.
#[derive(Debug, Clone, FromRow)]
pub struct StoredUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub faculty: Option<String>,
    pub password_hash: String,
}

impl From<StoredUser> for User {
    fn from(stored: StoredUser) -> Self {
        User {
            id: stored.id,
            name: stored.name,
            email: stored.email,
            role: stored.role,
            faculty: stored.faculty,
        }
    }
}

/// NewUser
///
/// The validated, hash-carrying insert payload produced by the registration
/// handler after the Mutation Guard checks (prl faculty, duplicate email).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub faculty: Option<String>,
}

/// Course
///
/// A course record from the `courses` table. Created explicitly by a PL, or
/// implicitly when a lecturer's report references a course that does not
/// exist yet.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Course {
    pub id: i32,
    pub faculty_name: String,
    pub class_name: String,
    pub course_name: String,
    pub course_code: String,
    // Optional on input, but stored as empty string rather than NULL so
    // downstream aggregation never has to handle missing text.
    pub venue: String,
    pub scheduled_time: String,
    pub total_registered: i32,
}

/// CourseWithLecturers
///
/// The PL view of a course: one row per course with the names of all assigned
/// lecturers folded into a single comma-separated string, sorted by name so
/// the aggregate is deterministic regardless of assignment order.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CourseWithLecturers {
    pub id: i32,
    pub faculty_name: String,
    pub class_name: String,
    pub course_name: String,
    pub course_code: String,
    pub venue: String,
    pub scheduled_time: String,
    pub total_registered: i32,
    /// `STRING_AGG` result; None when no lecturer is assigned yet.
    pub lecturers: Option<String>,
}

/// Enrollment
///
/// A single (student, course) membership pair from the `enrollments` table.
/// The pair is the composite primary key; duplicates are rejected by the
/// database, not merged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Enrollment {
    pub student_id: i32,
    pub course_id: i32,
}

/// AssignmentRow
///
/// A lecture assignment joined with its course and lecturer identity. This is
/// the shape returned by every assignment read, including the pre-deletion
/// record handed back when a PL unassigns a lecturer.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct AssignmentRow {
    pub id: i32,
    pub course_id: i32,
    pub lecturer_id: i32,
    pub course_name: String,
    pub course_code: String,
    pub lecturer_name: String,
    pub lecturer_email: String,
}

/// ReportWithCourse
///
/// A lecture report joined with its course's name and code. `lecturer_name`
/// and `total_registered` are write-time snapshots stored on the report
/// itself; they do not change when the user or course is later edited.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ReportWithCourse {
    pub id: i32,
    pub course_id: i32,
    pub lecturer_id: i32,
    pub faculty_name: String,
    pub class_name: String,
    pub week_of_reporting: String,
    #[ts(type = "string")]
    pub date_of_lecture: NaiveDate,
    pub lecturer_name: String,
    pub actual_number_present: i32,
    pub total_registered: i32,
    pub venue: String,
    pub scheduled_lecture_time: String,
    pub topic_taught: String,
    pub learning_outcomes: String,
    pub lecturer_recommendations: String,
    /// Set only by a PRL after creation; a later update overwrites it
    /// (last-writer-wins).
    pub prl_feedback: Option<String>,
    pub course_name: String,
    pub course_code: String,
}

/// Rating
///
/// A student's score for a course, from the `ratings` table. Append-only from
/// the student's perspective; no update or delete is exposed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Rating {
    pub id: i32,
    pub student_id: i32,
    pub course_id: i32,
    pub score: i32,
    pub feedback: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// RatingRow
///
/// A rating enriched for listings: course and student context joined in.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct RatingRow {
    pub id: i32,
    pub course_id: i32,
    pub course_name: String,
    pub class_name: String,
    pub faculty_name: String,
    pub score: i32,
    pub feedback: String,
    pub student_name: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// MonitoringRow
///
/// One row of the monitoring dashboard: report + course context with the
/// attendance figures next to the descriptive fields. Visibility matches the
/// report listing exactly (same scope predicate).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct MonitoringRow {
    pub id: i32,
    #[ts(type = "string")]
    pub date_of_lecture: NaiveDate,
    pub topic_taught: String,
    pub learning_outcomes: String,
    pub actual_number_present: i32,
    pub total_registered: i32,
    pub course_name: String,
    pub class_name: String,
    pub faculty_name: String,
    pub lecturer_name: String,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for POST /auth/register. The password is hashed immediately
/// and never persisted or logged in clear text. Role defaults to student.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
    pub faculty: Option<String>,
}

/// LoginRequest
///
/// Input payload for POST /auth/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// CreateCourseRequest
///
/// Input payload for POST /courses (PL only). The optional fields are
/// normalized by the Mutation Guard, never stored as NULL.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCourseRequest {
    pub faculty_name: String,
    pub class_name: String,
    pub course_name: String,
    pub course_code: String,
    pub venue: Option<String>,
    pub scheduled_time: Option<String>,
    pub total_registered: Option<i32>,
}

/// NewCourse
///
/// The normalized course insert produced from a `CreateCourseRequest`:
/// venue/scheduled_time default to "" and total_registered to 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub faculty_name: String,
    pub class_name: String,
    pub course_name: String,
    pub course_code: String,
    pub venue: String,
    pub scheduled_time: String,
    pub total_registered: i32,
}

impl From<CreateCourseRequest> for NewCourse {
    fn from(req: CreateCourseRequest) -> Self {
        NewCourse {
            faculty_name: req.faculty_name,
            class_name: req.class_name,
            course_name: req.course_name,
            course_code: req.course_code,
            venue: req.venue.unwrap_or_default(),
            scheduled_time: req.scheduled_time.unwrap_or_default(),
            total_registered: req.total_registered.unwrap_or(0),
        }
    }
}

/// EnrollRequest
///
/// Input payload for POST /enrollments.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct EnrollRequest {
    pub course_id: i32,
}

/// AssignLecturerRequest
///
/// Input payload for POST /assignments (PL only).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AssignLecturerRequest {
    pub course_id: i32,
    pub lecturer_id: i32,
}

/// CreateReportRequest
///
/// Input payload for POST /reports (lecturer only).
///
/// Either `course_id` references an existing course, or `course_name` and
/// `course_code` must both be present so the course can be created first,
/// atomically with the report. `total_registered`, when omitted alongside a
/// `course_id`, is copied from the course at write time.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateReportRequest {
    pub course_id: Option<i32>,
    pub course_name: Option<String>,
    pub course_code: Option<String>,
    pub faculty_name: String,
    pub class_name: String,
    pub week_of_reporting: String,
    #[ts(type = "string")]
    pub date_of_lecture: NaiveDate,
    pub actual_number_present: i32,
    pub total_registered: Option<i32>,
    pub venue: Option<String>,
    pub scheduled_lecture_time: Option<String>,
    pub topic_taught: String,
    pub learning_outcomes: String,
    pub lecturer_recommendations: String,
}

/// FeedbackRequest
///
/// Input payload for PUT /reports/{id}/feedback (PRL only). Full overwrite.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct FeedbackRequest {
    pub feedback: String,
}

/// CreateRatingRequest
///
/// Input payload for POST /ratings (student only). Score must be within 1-5.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateRatingRequest {
    pub course_id: i32,
    pub score: i32,
    pub feedback: String,
}

// --- Response Payloads (Output Schemas) ---

/// AuthResponse
///
/// Output of register/login: the signed bearer token plus the public user
/// record it was issued for.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// UserProfile
///
/// Output schema for GET /me: the identity context the request was resolved
/// to.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub role: Role,
    pub faculty: Option<String>,
}

/// CourseCreated
///
/// Write confirmation for POST /courses.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CourseCreated {
    pub message: String,
    pub course: Course,
}

/// EnrollmentChanged
///
/// Write confirmation for enroll/unenroll. For deletions, `enrollment` is the
/// pair as it existed immediately before removal.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct EnrollmentChanged {
    pub message: String,
    pub enrollment: Enrollment,
}

/// AssignmentChanged
///
/// Write confirmation for assignment create/delete. For deletions,
/// `assignment` is the joined record read immediately before the delete.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AssignmentChanged {
    pub message: String,
    pub assignment: AssignmentRow,
}

/// ReportCreated
///
/// Write confirmation for POST /reports and the feedback update.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ReportCreated {
    pub message: String,
    pub report: ReportWithCourse,
}

/// RatingCreated
///
/// Write confirmation for POST /ratings.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RatingCreated {
    pub message: String,
    pub rating: Rating,
}
