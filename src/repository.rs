use crate::error::ApiError;
use crate::models::{
    AssignmentRow, Course, CourseWithLecturers, CreateRatingRequest, CreateReportRequest,
    Enrollment, MonitoringRow, NewCourse, NewUser, Rating, RatingRow, ReportWithCourse, Role,
    StoredUser, User,
};
use crate::policy::Scope;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};
use std::sync::Arc;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, allowing the
/// handlers to interact with the data layer without knowing the specific
/// implementation (Postgres, Mock, etc.).
///
/// Every read that is subject to role scoping takes a `Scope` produced by the
/// policy table; the implementation must encode the scope in the selection
/// itself, never filter after the fetch.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's asynchronous task
/// boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: i32) -> Result<Option<User>, ApiError>;
    // Includes the stored credential; used only by the login flow.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<StoredUser>, ApiError>;
    async fn create_user(&self, user: NewUser) -> Result<User, ApiError>;
    // Directory listing, optionally restricted to one role, ordered by name.
    async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, ApiError>;

    // --- Courses ---
    async fn list_courses(&self, scope: &Scope) -> Result<Vec<Course>, ApiError>;
    // PL view: one row per course, assigned lecturer names aggregated.
    async fn list_courses_with_lecturers(&self) -> Result<Vec<CourseWithLecturers>, ApiError>;
    // Courses the student has not enrolled in yet.
    async fn list_available_courses(&self, student_id: i32) -> Result<Vec<Course>, ApiError>;
    async fn create_course(&self, course: NewCourse) -> Result<Course, ApiError>;
    // Same table as courses, ordered by class_name (see policy for who may ask).
    async fn list_classes(&self, scope: &Scope) -> Result<Vec<Course>, ApiError>;

    // --- Enrollments ---
    // Returns false when the pair already exists (settled by the database
    // constraint, not a pre-check).
    async fn enroll(&self, enrollment: Enrollment) -> Result<bool, ApiError>;
    // Returns the pre-deletion pair, or None when there was nothing to delete.
    async fn unenroll(&self, enrollment: Enrollment) -> Result<Option<Enrollment>, ApiError>;
    async fn enrolled_courses(&self, student_id: i32) -> Result<Vec<Course>, ApiError>;

    // --- Lecture Assignments ---
    async fn list_assignments(&self) -> Result<Vec<AssignmentRow>, ApiError>;
    async fn create_assignment(
        &self,
        course_id: i32,
        lecturer_id: i32,
    ) -> Result<AssignmentRow, ApiError>;
    async fn get_assignment(&self, id: i32) -> Result<Option<AssignmentRow>, ApiError>;
    async fn delete_assignment(&self, id: i32) -> Result<bool, ApiError>;

    // --- Lecture Reports ---
    // Creates the course first when the request carries none, in the same
    // transaction as the report insert.
    async fn create_report(
        &self,
        req: CreateReportRequest,
        lecturer_id: i32,
        lecturer_name: &str,
    ) -> Result<ReportWithCourse, ApiError>;
    async fn list_reports(&self, scope: &Scope) -> Result<Vec<ReportWithCourse>, ApiError>;
    async fn get_report(
        &self,
        id: i32,
        scope: &Scope,
    ) -> Result<Option<ReportWithCourse>, ApiError>;
    // Full overwrite of prl_feedback; last writer wins.
    async fn set_report_feedback(
        &self,
        id: i32,
        feedback: &str,
    ) -> Result<Option<ReportWithCourse>, ApiError>;

    // --- Ratings ---
    async fn create_rating(
        &self,
        student_id: i32,
        req: CreateRatingRequest,
        one_per_course: bool,
    ) -> Result<Rating, ApiError>;
    async fn list_ratings(&self, scope: &Scope) -> Result<Vec<RatingRow>, ApiError>;

    // --- Monitoring (Aggregation Façade) ---
    // Scoped with the *report* scope so dashboard visibility can never drift
    // from report visibility.
    async fn monitoring_rows(&self, scope: &Scope) -> Result<Vec<MonitoringRow>, ApiError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Shared SELECT heads. Joined column lists are spelled out once so every
// reader of a family returns the same shape.
const COURSE_COLUMNS: &str = "SELECT c.id, c.faculty_name, c.class_name, c.course_name, \
     c.course_code, c.venue, c.scheduled_time, c.total_registered FROM courses c";

const REPORT_COLUMNS: &str = "SELECT r.id, r.course_id, r.lecturer_id, r.faculty_name, \
     r.class_name, r.week_of_reporting, r.date_of_lecture, r.lecturer_name, \
     r.actual_number_present, r.total_registered, r.venue, r.scheduled_lecture_time, \
     r.topic_taught, r.learning_outcomes, r.lecturer_recommendations, r.prl_feedback, \
     c.course_name, c.course_code FROM reports r JOIN courses c ON r.course_id = c.id";

const MONITORING_COLUMNS: &str = "SELECT r.id, r.date_of_lecture, r.topic_taught, \
     r.learning_outcomes, r.actual_number_present, r.total_registered, c.course_name, \
     c.class_name, c.faculty_name, r.lecturer_name \
     FROM reports r JOIN courses c ON r.course_id = c.id";

const ASSIGNMENT_COLUMNS: &str = "SELECT la.id, la.course_id, la.lecturer_id, c.course_name, \
     c.course_code, u.name AS lecturer_name, u.email AS lecturer_email \
     FROM lecture_assignments la \
     JOIN courses c ON la.course_id = c.id \
     JOIN users u ON la.lecturer_id = u.id";

/// Renders a course-family scope into the selection. Aliases assumed:
/// `c` = courses.
fn push_course_scope(builder: &mut QueryBuilder<'_, Postgres>, scope: &Scope) -> Result<(), ApiError> {
    match scope {
        Scope::All => {}
        Scope::Enrolled(student_id) => {
            builder.push(" JOIN enrollments e ON e.course_id = c.id WHERE e.student_id = ");
            builder.push_bind(*student_id);
        }
        Scope::Assigned(lecturer_id) => {
            builder.push(" JOIN lecture_assignments la ON la.course_id = c.id WHERE la.lecturer_id = ");
            builder.push_bind(*lecturer_id);
        }
        Scope::Faculty(faculty) => {
            builder.push(" WHERE c.faculty_name = ");
            builder.push_bind(faculty.clone());
        }
        Scope::Authored(_) => {
            return Err(ApiError::internal("authored scope does not apply to courses"));
        }
    }
    Ok(())
}

/// Renders a report-family scope into the selection. Used by the report
/// listing, the by-id lookup and the monitoring façade alike, so all three
/// share one notion of visibility. Aliases assumed: `r` = reports,
/// `c` = courses.
fn push_report_scope(builder: &mut QueryBuilder<'_, Postgres>, scope: &Scope) -> Result<(), ApiError> {
    match scope {
        Scope::All => {}
        Scope::Enrolled(student_id) => {
            builder.push(" JOIN enrollments e ON e.course_id = c.id WHERE e.student_id = ");
            builder.push_bind(*student_id);
        }
        Scope::Authored(lecturer_id) => {
            builder.push(" WHERE r.lecturer_id = ");
            builder.push_bind(*lecturer_id);
        }
        Scope::Faculty(faculty) => {
            builder.push(" WHERE c.faculty_name = ");
            builder.push_bind(faculty.clone());
        }
        Scope::Assigned(_) => {
            return Err(ApiError::internal("assignment scope does not apply to reports"));
        }
    }
    Ok(())
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn get_user(&self, id: i32) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, faculty FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<StoredUser>, ApiError> {
        let user = sqlx::query_as::<_, StoredUser>(
            "SELECT id, name, email, role, faculty, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// create_user
    ///
    /// Inserts the registration row. The unique index on `email` is the
    /// authority for duplicates; a violation surfaces as DuplicateConflict.
    async fn create_user(&self, user: NewUser) -> Result<User, ApiError> {
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash, role, faculty) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id, name, email, role, faculty",
        )
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role)
        .bind(user.faculty)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, ApiError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT id, name, email, role, faculty FROM users");
        if let Some(role) = role {
            builder.push(" WHERE role = ");
            builder.push_bind(role);
        }
        builder.push(" ORDER BY name");

        let users = builder
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    // --- COURSES ---

    /// list_courses
    ///
    /// The role-scoped course listing. The caller's scope is rendered into
    /// the selection (JOIN/WHERE); rows outside it are never fetched.
    async fn list_courses(&self, scope: &Scope) -> Result<Vec<Course>, ApiError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(COURSE_COLUMNS);
        push_course_scope(&mut builder, scope)?;
        builder.push(" ORDER BY c.course_name");

        let courses = builder
            .build_query_as::<Course>()
            .fetch_all(&self.pool)
            .await?;
        Ok(courses)
    }

    /// list_courses_with_lecturers
    ///
    /// The PL course view: all courses, each with the names of its assigned
    /// lecturers folded into one string. `ORDER BY u.name` inside the
    /// aggregate keeps the fold deterministic regardless of assignment order.
    async fn list_courses_with_lecturers(&self) -> Result<Vec<CourseWithLecturers>, ApiError> {
        let courses = sqlx::query_as::<_, CourseWithLecturers>(
            "SELECT c.id, c.faculty_name, c.class_name, c.course_name, c.course_code, \
                    c.venue, c.scheduled_time, c.total_registered, \
                    STRING_AGG(u.name, ', ' ORDER BY u.name) AS lecturers \
             FROM courses c \
             LEFT JOIN lecture_assignments la ON la.course_id = c.id \
             LEFT JOIN users u ON la.lecturer_id = u.id \
             GROUP BY c.id \
             ORDER BY c.course_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    async fn list_available_courses(&self, student_id: i32) -> Result<Vec<Course>, ApiError> {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT c.id, c.faculty_name, c.class_name, c.course_name, c.course_code, \
                    c.venue, c.scheduled_time, c.total_registered \
             FROM courses c \
             WHERE c.id NOT IN (SELECT course_id FROM enrollments WHERE student_id = $1) \
             ORDER BY c.course_name",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    async fn create_course(&self, course: NewCourse) -> Result<Course, ApiError> {
        let created = sqlx::query_as::<_, Course>(
            "INSERT INTO courses (faculty_name, class_name, course_name, course_code, venue, \
             scheduled_time, total_registered) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, faculty_name, class_name, course_name, course_code, venue, \
             scheduled_time, total_registered",
        )
        .bind(course.faculty_name)
        .bind(course.class_name)
        .bind(course.course_name)
        .bind(course.course_code)
        .bind(course.venue)
        .bind(course.scheduled_time)
        .bind(course.total_registered)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_classes(&self, scope: &Scope) -> Result<Vec<Course>, ApiError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(COURSE_COLUMNS);
        push_course_scope(&mut builder, scope)?;
        builder.push(" ORDER BY c.class_name");

        let classes = builder
            .build_query_as::<Course>()
            .fetch_all(&self.pool)
            .await?;
        Ok(classes)
    }

    // --- ENROLLMENTS ---

    /// enroll
    ///
    /// Inserts the enrollment pair. `ON CONFLICT DO NOTHING` lets the
    /// composite primary key settle concurrent duplicate attempts; the
    /// function returns true only if a new row was inserted.
    async fn enroll(&self, enrollment: Enrollment) -> Result<bool, ApiError> {
        let result = sqlx::query(
            "INSERT INTO enrollments (student_id, course_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(enrollment.student_id)
        .bind(enrollment.course_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// unenroll
    ///
    /// Deletes the pair and returns it as it existed before deletion, or
    /// None when the student was not enrolled.
    async fn unenroll(&self, enrollment: Enrollment) -> Result<Option<Enrollment>, ApiError> {
        let deleted = sqlx::query_as::<_, Enrollment>(
            "DELETE FROM enrollments WHERE student_id = $1 AND course_id = $2 \
             RETURNING student_id, course_id",
        )
        .bind(enrollment.student_id)
        .bind(enrollment.course_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(deleted)
    }

    async fn enrolled_courses(&self, student_id: i32) -> Result<Vec<Course>, ApiError> {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT c.id, c.faculty_name, c.class_name, c.course_name, c.course_code, \
                    c.venue, c.scheduled_time, c.total_registered \
             FROM enrollments e \
             JOIN courses c ON e.course_id = c.id \
             WHERE e.student_id = $1 \
             ORDER BY c.course_name",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    // --- LECTURE ASSIGNMENTS ---

    async fn list_assignments(&self) -> Result<Vec<AssignmentRow>, ApiError> {
        let mut sql = String::from(ASSIGNMENT_COLUMNS);
        sql.push_str(" ORDER BY c.course_name");
        let assignments = sqlx::query_as::<_, AssignmentRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(assignments)
    }

    /// create_assignment
    ///
    /// Inserts the pair and returns the joined record. The unique index on
    /// (course_id, lecturer_id) turns a duplicate into DuplicateConflict; a
    /// missing course or lecturer surfaces as NotFound via the foreign keys.
    async fn create_assignment(
        &self,
        course_id: i32,
        lecturer_id: i32,
    ) -> Result<AssignmentRow, ApiError> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO lecture_assignments (course_id, lecturer_id) VALUES ($1, $2) \
             RETURNING id",
        )
        .bind(course_id)
        .bind(lecturer_id)
        .fetch_one(&self.pool)
        .await?;

        self.get_assignment(id)
            .await?
            .ok_or_else(|| ApiError::internal("assignment vanished after insert"))
    }

    async fn get_assignment(&self, id: i32) -> Result<Option<AssignmentRow>, ApiError> {
        let mut sql = String::from(ASSIGNMENT_COLUMNS);
        sql.push_str(" WHERE la.id = $1");
        let assignment = sqlx::query_as::<_, AssignmentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(assignment)
    }

    async fn delete_assignment(&self, id: i32) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM lecture_assignments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- LECTURE REPORTS ---

    /// create_report
    ///
    /// One transaction covers the whole write: when the request carries no
    /// `course_id`, the course is inserted first and the fresh id used for
    /// the report: either both rows commit or neither does. When
    /// `total_registered` is omitted, the course's current value is copied
    /// verbatim into the report (snapshot, immune to later course edits).
    ///
    /// `lecturer_name` is the authenticated caller's name, passed down by the
    /// handler; client payloads cannot spoof authorship.
    async fn create_report(
        &self,
        req: CreateReportRequest,
        lecturer_id: i32,
        lecturer_name: &str,
    ) -> Result<ReportWithCourse, ApiError> {
        let mut tx = self.pool.begin().await?;

        let course_id = match req.course_id {
            Some(id) => id,
            None => {
                // Presence of course_name/course_code was validated upstream.
                sqlx::query_scalar::<_, i32>(
                    "INSERT INTO courses (faculty_name, class_name, course_name, course_code, \
                     venue, scheduled_time, total_registered) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
                )
                .bind(&req.faculty_name)
                .bind(&req.class_name)
                .bind(req.course_name.clone().unwrap_or_default())
                .bind(req.course_code.clone().unwrap_or_default())
                .bind(req.venue.clone().unwrap_or_default())
                .bind(req.scheduled_lecture_time.clone().unwrap_or_default())
                .bind(req.total_registered.unwrap_or(0))
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let total_registered = match req.total_registered {
            Some(count) => count,
            None => sqlx::query_scalar::<_, i32>(
                "SELECT total_registered FROM courses WHERE id = $1",
            )
            .bind(course_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ApiError::not_found("course not found"))?,
        };

        let report_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO reports (course_id, lecturer_id, faculty_name, class_name, \
             week_of_reporting, date_of_lecture, lecturer_name, actual_number_present, \
             total_registered, venue, scheduled_lecture_time, topic_taught, \
             learning_outcomes, lecturer_recommendations) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING id",
        )
        .bind(course_id)
        .bind(lecturer_id)
        .bind(&req.faculty_name)
        .bind(&req.class_name)
        .bind(&req.week_of_reporting)
        .bind(req.date_of_lecture)
        .bind(lecturer_name)
        .bind(req.actual_number_present)
        .bind(total_registered)
        .bind(req.venue.clone().unwrap_or_default())
        .bind(req.scheduled_lecture_time.clone().unwrap_or_default())
        .bind(&req.topic_taught)
        .bind(&req.learning_outcomes)
        .bind(&req.lecturer_recommendations)
        .fetch_one(&mut *tx)
        .await?;

        let mut sql = String::from(REPORT_COLUMNS);
        sql.push_str(" WHERE r.id = $1");
        let report = sqlx::query_as::<_, ReportWithCourse>(&sql)
            .bind(report_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(report)
    }

    async fn list_reports(&self, scope: &Scope) -> Result<Vec<ReportWithCourse>, ApiError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(REPORT_COLUMNS);
        push_report_scope(&mut builder, scope)?;
        builder.push(" ORDER BY r.date_of_lecture DESC, r.id ASC");

        let reports = builder
            .build_query_as::<ReportWithCourse>()
            .fetch_all(&self.pool)
            .await?;
        Ok(reports)
    }

    /// get_report
    ///
    /// By-id lookup under the same scope predicate as the listing: a report
    /// outside the caller's scope is indistinguishable from an absent one.
    async fn get_report(
        &self,
        id: i32,
        scope: &Scope,
    ) -> Result<Option<ReportWithCourse>, ApiError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(REPORT_COLUMNS);
        push_report_scope(&mut builder, scope)?;
        builder.push(if matches!(scope, Scope::All) {
            " WHERE r.id = "
        } else {
            " AND r.id = "
        });
        builder.push_bind(id);

        let report = builder
            .build_query_as::<ReportWithCourse>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(report)
    }

    async fn set_report_feedback(
        &self,
        id: i32,
        feedback: &str,
    ) -> Result<Option<ReportWithCourse>, ApiError> {
        let updated = sqlx::query_scalar::<_, i32>(
            "UPDATE reports SET prl_feedback = $1 WHERE id = $2 RETURNING id",
        )
        .bind(feedback)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            None => Ok(None),
            Some(report_id) => {
                let mut sql = String::from(REPORT_COLUMNS);
                sql.push_str(" WHERE r.id = $1");
                let report = sqlx::query_as::<_, ReportWithCourse>(&sql)
                    .bind(report_id)
                    .fetch_one(&self.pool)
                    .await?;
                Ok(Some(report))
            }
        }
    }

    // --- RATINGS ---

    /// create_rating
    ///
    /// With one_per_course enabled, `ON CONFLICT DO NOTHING` turns a repeat
    /// rating into DuplicateConflict without racing concurrent submissions.
    /// With it disabled, the insert is unconditional (deployments opting out
    /// also drop the unique index, see the migration).
    async fn create_rating(
        &self,
        student_id: i32,
        req: CreateRatingRequest,
        one_per_course: bool,
    ) -> Result<Rating, ApiError> {
        if one_per_course {
            let rating = sqlx::query_as::<_, Rating>(
                "INSERT INTO ratings (student_id, course_id, score, feedback) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (student_id, course_id) DO NOTHING \
                 RETURNING id, student_id, course_id, score, feedback, created_at",
            )
            .bind(student_id)
            .bind(req.course_id)
            .bind(req.score)
            .bind(&req.feedback)
            .fetch_optional(&self.pool)
            .await?;

            rating.ok_or_else(|| ApiError::duplicate("course already rated"))
        } else {
            let rating = sqlx::query_as::<_, Rating>(
                "INSERT INTO ratings (student_id, course_id, score, feedback) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING id, student_id, course_id, score, feedback, created_at",
            )
            .bind(student_id)
            .bind(req.course_id)
            .bind(req.score)
            .bind(&req.feedback)
            .fetch_one(&self.pool)
            .await?;
            Ok(rating)
        }
    }

    async fn list_ratings(&self, scope: &Scope) -> Result<Vec<RatingRow>, ApiError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT r.id, r.course_id, c.course_name, c.class_name, c.faculty_name, \
             r.score, r.feedback, u.name AS student_name, r.created_at \
             FROM ratings r \
             JOIN courses c ON r.course_id = c.id \
             JOIN users u ON r.student_id = u.id",
        );
        match scope {
            Scope::All => {}
            Scope::Authored(student_id) => {
                builder.push(" WHERE r.student_id = ");
                builder.push_bind(*student_id);
            }
            Scope::Assigned(lecturer_id) => {
                builder.push(
                    " JOIN lecture_assignments la ON la.course_id = c.id WHERE la.lecturer_id = ",
                );
                builder.push_bind(*lecturer_id);
            }
            Scope::Faculty(faculty) => {
                builder.push(" WHERE c.faculty_name = ");
                builder.push_bind(faculty.clone());
            }
            Scope::Enrolled(_) => {
                return Err(ApiError::internal("enrollment scope does not apply to ratings"));
            }
        }
        builder.push(" ORDER BY r.created_at DESC, r.id ASC");

        let ratings = builder
            .build_query_as::<RatingRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(ratings)
    }

    // --- MONITORING ---

    /// monitoring_rows
    ///
    /// The dashboard projection: attendance figures next to the descriptive
    /// fields, under the caller's *report* scope. The predicate rendering is
    /// shared with list_reports/get_report, so the two surfaces cannot
    /// diverge.
    async fn monitoring_rows(&self, scope: &Scope) -> Result<Vec<MonitoringRow>, ApiError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(MONITORING_COLUMNS);
        push_report_scope(&mut builder, scope)?;
        builder.push(" ORDER BY r.date_of_lecture DESC, r.id ASC");

        let rows = builder
            .build_query_as::<MonitoringRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
