use async_trait::async_trait;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use reporting_portal::{
    AppState,
    auth::AuthUser,
    config::AppConfig,
    error::ApiError,
    handlers,
    models::{
        AssignLecturerRequest, AssignmentRow, Course, CourseWithLecturers, CreateCourseRequest,
        CreateRatingRequest, CreateReportRequest, Enrollment, EnrollRequest, FeedbackRequest,
        MonitoringRow, NewCourse, NewUser, Rating, RatingRow, ReportWithCourse, Role, StoredUser,
        User,
    },
    policy::Scope,
    repository::Repository,
};
use std::sync::Arc;
use tokio::test;

// --- MOCK REPOSITORY IMPLEMENTATION ---

// This struct is the central control point for testing handler logic.
// Handlers rely on the Repository trait, so we mock the trait implementation
// with pre-canned outputs.
pub struct MockRepoControl {
    pub user_to_return: Option<User>,
    pub enroll_result: bool,
    pub unenroll_result: Option<Enrollment>,
    pub courses_to_return: Vec<Course>,
    pub courses_with_lecturers: Vec<CourseWithLecturers>,
    pub assignments_to_return: Vec<AssignmentRow>,
    pub assignment_to_return: Option<AssignmentRow>,
    pub delete_assignment_result: bool,
    pub reports_to_return: Vec<ReportWithCourse>,
    pub report_to_return: Option<ReportWithCourse>,
    pub rating_duplicate: bool,
    pub monitoring_to_return: Vec<MonitoringRow>,
}

impl Default for MockRepoControl {
    fn default() -> Self {
        MockRepoControl {
            user_to_return: Some(User::default()),
            enroll_result: true, // Default to success for simpler tests
            unenroll_result: Some(Enrollment::default()),
            courses_to_return: vec![],
            courses_with_lecturers: vec![],
            assignments_to_return: vec![],
            assignment_to_return: Some(AssignmentRow::default()),
            delete_assignment_result: true,
            reports_to_return: vec![],
            report_to_return: Some(ReportWithCourse::default()),
            rating_duplicate: false,
            monitoring_to_return: vec![],
        }
    }
}

#[async_trait]
impl Repository for MockRepoControl {
    async fn get_user(&self, _id: i32) -> Result<Option<User>, ApiError> {
        Ok(self.user_to_return.clone())
    }
    async fn find_user_by_email(&self, _email: &str) -> Result<Option<StoredUser>, ApiError> {
        Ok(None)
    }
    async fn create_user(&self, user: NewUser) -> Result<User, ApiError> {
        Ok(User {
            id: 1,
            name: user.name,
            email: user.email,
            role: user.role,
            faculty: user.faculty,
        })
    }
    async fn list_users(&self, _role: Option<Role>) -> Result<Vec<User>, ApiError> {
        Ok(self.user_to_return.clone().into_iter().collect())
    }

    async fn list_courses(&self, _scope: &Scope) -> Result<Vec<Course>, ApiError> {
        Ok(self.courses_to_return.clone())
    }
    async fn list_courses_with_lecturers(&self) -> Result<Vec<CourseWithLecturers>, ApiError> {
        Ok(self.courses_with_lecturers.clone())
    }
    async fn list_available_courses(&self, _student_id: i32) -> Result<Vec<Course>, ApiError> {
        Ok(self.courses_to_return.clone())
    }
    async fn create_course(&self, course: NewCourse) -> Result<Course, ApiError> {
        Ok(Course {
            id: 1,
            faculty_name: course.faculty_name,
            class_name: course.class_name,
            course_name: course.course_name,
            course_code: course.course_code,
            venue: course.venue,
            scheduled_time: course.scheduled_time,
            total_registered: course.total_registered,
        })
    }
    async fn list_classes(&self, _scope: &Scope) -> Result<Vec<Course>, ApiError> {
        Ok(self.courses_to_return.clone())
    }

    async fn enroll(&self, _enrollment: Enrollment) -> Result<bool, ApiError> {
        Ok(self.enroll_result)
    }
    async fn unenroll(&self, _enrollment: Enrollment) -> Result<Option<Enrollment>, ApiError> {
        Ok(self.unenroll_result.clone())
    }
    async fn enrolled_courses(&self, _student_id: i32) -> Result<Vec<Course>, ApiError> {
        Ok(self.courses_to_return.clone())
    }

    async fn list_assignments(&self) -> Result<Vec<AssignmentRow>, ApiError> {
        Ok(self.assignments_to_return.clone())
    }
    async fn create_assignment(
        &self,
        course_id: i32,
        lecturer_id: i32,
    ) -> Result<AssignmentRow, ApiError> {
        Ok(AssignmentRow {
            id: 1,
            course_id,
            lecturer_id,
            ..AssignmentRow::default()
        })
    }
    async fn get_assignment(&self, _id: i32) -> Result<Option<AssignmentRow>, ApiError> {
        Ok(self.assignment_to_return.clone())
    }
    async fn delete_assignment(&self, _id: i32) -> Result<bool, ApiError> {
        Ok(self.delete_assignment_result)
    }

    async fn create_report(
        &self,
        req: CreateReportRequest,
        lecturer_id: i32,
        lecturer_name: &str,
    ) -> Result<ReportWithCourse, ApiError> {
        // Echo enough of the input back that tests can assert the handler
        // passed identity-derived authorship down.
        Ok(ReportWithCourse {
            id: 1,
            course_id: req.course_id.unwrap_or(99),
            lecturer_id,
            lecturer_name: lecturer_name.to_string(),
            faculty_name: req.faculty_name,
            class_name: req.class_name,
            topic_taught: req.topic_taught,
            ..ReportWithCourse::default()
        })
    }
    async fn list_reports(&self, _scope: &Scope) -> Result<Vec<ReportWithCourse>, ApiError> {
        Ok(self.reports_to_return.clone())
    }
    async fn get_report(
        &self,
        _id: i32,
        _scope: &Scope,
    ) -> Result<Option<ReportWithCourse>, ApiError> {
        Ok(self.report_to_return.clone())
    }
    async fn set_report_feedback(
        &self,
        _id: i32,
        feedback: &str,
    ) -> Result<Option<ReportWithCourse>, ApiError> {
        Ok(self.report_to_return.clone().map(|mut report| {
            report.prl_feedback = Some(feedback.to_string());
            report
        }))
    }

    async fn create_rating(
        &self,
        student_id: i32,
        req: CreateRatingRequest,
        _one_per_course: bool,
    ) -> Result<Rating, ApiError> {
        if self.rating_duplicate {
            return Err(ApiError::duplicate("course already rated"));
        }
        Ok(Rating {
            id: 1,
            student_id,
            course_id: req.course_id,
            score: req.score,
            feedback: req.feedback,
            ..Rating::default()
        })
    }
    async fn list_ratings(&self, _scope: &Scope) -> Result<Vec<RatingRow>, ApiError> {
        Ok(vec![])
    }

    async fn monitoring_rows(&self, _scope: &Scope) -> Result<Vec<MonitoringRow>, ApiError> {
        Ok(self.monitoring_to_return.clone())
    }
}

// --- TEST UTILITIES ---

fn create_test_state(repo_control: MockRepoControl) -> AppState {
    AppState {
        repo: Arc::new(repo_control),
        config: AppConfig::default(),
    }
}

fn student_user() -> AuthUser {
    AuthUser {
        id: 10,
        name: "Thabo Student".to_string(),
        role: Role::Student,
        faculty: None,
    }
}

fn lecturer_user() -> AuthUser {
    AuthUser {
        id: 20,
        name: "Dr. Molefe".to_string(),
        role: Role::Lecturer,
        faculty: None,
    }
}

fn prl_user() -> AuthUser {
    AuthUser {
        id: 30,
        name: "Ms. Reviewer".to_string(),
        role: Role::Prl,
        faculty: Some("ICT".to_string()),
    }
}

fn pl_user() -> AuthUser {
    AuthUser {
        id: 40,
        name: "Prof. Leader".to_string(),
        role: Role::Pl,
        faculty: None,
    }
}

fn sample_report_request() -> CreateReportRequest {
    CreateReportRequest {
        course_id: Some(5),
        faculty_name: "ICT".to_string(),
        class_name: "BSCSM1".to_string(),
        week_of_reporting: "Week 6".to_string(),
        actual_number_present: 28,
        topic_taught: "Ownership and borrowing".to_string(),
        learning_outcomes: "Students can explain move semantics".to_string(),
        lecturer_recommendations: "More lab time".to_string(),
        ..CreateReportRequest::default()
    }
}

// --- ASSIGNMENT TESTS ---

#[test]
async fn test_list_assignments_forbidden_for_prl() {
    // A PRL must receive Forbidden, not an empty list.
    let state = create_test_state(MockRepoControl::default());

    let result = handlers::list_assignments(prl_user(), State(state)).await;

    let err = result.unwrap_err();
    assert_eq!(err.kind(), "forbidden");
}

#[test]
async fn test_list_assignments_forbidden_for_student_and_lecturer() {
    for user in [student_user(), lecturer_user()] {
        let state = create_test_state(MockRepoControl::default());
        let result = handlers::list_assignments(user, State(state)).await;
        assert_eq!(result.unwrap_err().kind(), "forbidden");
    }
}

#[test]
async fn test_list_assignments_success_for_pl() {
    let state = create_test_state(MockRepoControl {
        assignments_to_return: vec![AssignmentRow::default()],
        ..MockRepoControl::default()
    });

    let result = handlers::list_assignments(pl_user(), State(state)).await;

    let Json(assignments) = result.unwrap();
    assert_eq!(assignments.len(), 1);
}

#[test]
async fn test_delete_assignment_returns_pre_deletion_record() {
    let assignment = AssignmentRow {
        id: 7,
        course_id: 3,
        lecturer_id: 20,
        course_name: "Web Application Development".to_string(),
        course_code: "DIWA2110".to_string(),
        lecturer_name: "Dr. Molefe".to_string(),
        lecturer_email: "molefe@example.ac.ls".to_string(),
    };
    let state = create_test_state(MockRepoControl {
        assignment_to_return: Some(assignment.clone()),
        delete_assignment_result: true,
        ..MockRepoControl::default()
    });

    let result = handlers::delete_assignment(pl_user(), State(state), Path(7)).await;

    let Json(response) = result.unwrap();
    assert_eq!(response.assignment.course_name, assignment.course_name);
    assert_eq!(response.assignment.course_code, assignment.course_code);
    assert_eq!(response.assignment.lecturer_name, assignment.lecturer_name);
    assert_eq!(response.assignment.lecturer_email, assignment.lecturer_email);
}

#[test]
async fn test_delete_assignment_not_found() {
    let state = create_test_state(MockRepoControl {
        assignment_to_return: None,
        ..MockRepoControl::default()
    });

    let result = handlers::delete_assignment(pl_user(), State(state), Path(99)).await;

    assert_eq!(result.unwrap_err().kind(), "not_found");
}

#[test]
async fn test_delete_assignment_lost_race_is_not_found() {
    // The record existed at read time but was deleted concurrently.
    let state = create_test_state(MockRepoControl {
        assignment_to_return: Some(AssignmentRow::default()),
        delete_assignment_result: false,
        ..MockRepoControl::default()
    });

    let result = handlers::delete_assignment(pl_user(), State(state), Path(7)).await;

    assert_eq!(result.unwrap_err().kind(), "not_found");
}

#[test]
async fn test_create_assignment_forbidden_for_non_pl() {
    let state = create_test_state(MockRepoControl::default());
    let payload = AssignLecturerRequest {
        course_id: 1,
        lecturer_id: 2,
    };

    let result = handlers::create_assignment(lecturer_user(), State(state), Json(payload)).await;

    assert_eq!(result.unwrap_err().kind(), "forbidden");
}

// --- ENROLLMENT TESTS ---

#[test]
async fn test_enroll_success() {
    let state = create_test_state(MockRepoControl {
        enroll_result: true,
        ..MockRepoControl::default()
    });

    let result = handlers::enroll(
        student_user(),
        State(state),
        Json(EnrollRequest { course_id: 3 }),
    )
    .await;

    let Json(response) = result.unwrap();
    assert_eq!(response.enrollment.student_id, 10);
    assert_eq!(response.enrollment.course_id, 3);
}

#[test]
async fn test_enroll_duplicate_conflict() {
    let state = create_test_state(MockRepoControl {
        enroll_result: false,
        ..MockRepoControl::default()
    });

    let result = handlers::enroll(
        student_user(),
        State(state),
        Json(EnrollRequest { course_id: 3 }),
    )
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.kind(), "duplicate_conflict");
}

#[test]
async fn test_enroll_forbidden_for_lecturer() {
    let state = create_test_state(MockRepoControl::default());

    let result = handlers::enroll(
        lecturer_user(),
        State(state),
        Json(EnrollRequest { course_id: 3 }),
    )
    .await;

    assert_eq!(result.unwrap_err().kind(), "forbidden");
}

#[test]
async fn test_unenroll_returns_pre_deletion_pair() {
    let state = create_test_state(MockRepoControl {
        unenroll_result: Some(Enrollment {
            student_id: 10,
            course_id: 3,
        }),
        ..MockRepoControl::default()
    });

    let result = handlers::unenroll(student_user(), State(state), Path(3)).await;

    let Json(response) = result.unwrap();
    assert_eq!(response.enrollment.course_id, 3);
}

#[test]
async fn test_unenroll_not_enrolled() {
    let state = create_test_state(MockRepoControl {
        unenroll_result: None,
        ..MockRepoControl::default()
    });

    let result = handlers::unenroll(student_user(), State(state), Path(3)).await;

    assert_eq!(result.unwrap_err().kind(), "not_found");
}

// --- COURSE TESTS ---

#[test]
async fn test_create_course_forbidden_for_prl() {
    let state = create_test_state(MockRepoControl::default());
    let payload = CreateCourseRequest {
        faculty_name: "ICT".to_string(),
        class_name: "BSCSM1".to_string(),
        course_name: "Web Application Development".to_string(),
        course_code: "DIWA2110".to_string(),
        ..CreateCourseRequest::default()
    };

    let result = handlers::create_course(prl_user(), State(state), Json(payload)).await;

    assert_eq!(result.unwrap_err().kind(), "forbidden");
}

#[test]
async fn test_create_course_defaults_optional_fields() {
    let state = create_test_state(MockRepoControl::default());
    let payload = CreateCourseRequest {
        faculty_name: "ICT".to_string(),
        class_name: "BSCSM1".to_string(),
        course_name: "Web Application Development".to_string(),
        course_code: "DIWA2110".to_string(),
        venue: None,
        scheduled_time: None,
        total_registered: None,
    };

    let result = handlers::create_course(pl_user(), State(state), Json(payload)).await;

    // The mock echoes the normalized insert back, so the defaults the
    // Mutation Guard applied are visible here.
    let Json(response) = result.unwrap();
    assert_eq!(response.course.venue, "");
    assert_eq!(response.course.scheduled_time, "");
    assert_eq!(response.course.total_registered, 0);
}

#[test]
async fn test_list_courses_pl_gets_lecturer_aggregate() {
    let state = create_test_state(MockRepoControl {
        courses_with_lecturers: vec![CourseWithLecturers {
            id: 1,
            course_name: "Web Application Development".to_string(),
            lecturers: Some("Dr. Adams, Dr. Molefe".to_string()),
            ..CourseWithLecturers::default()
        }],
        ..MockRepoControl::default()
    });

    let result = handlers::list_courses(pl_user(), State(state)).await;

    let response = result.unwrap().into_response();
    let (_parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let courses: Vec<CourseWithLecturers> = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].lecturers.as_deref(), Some("Dr. Adams, Dr. Molefe"));
}

#[test]
async fn test_list_courses_student_gets_plain_rows() {
    let state = create_test_state(MockRepoControl {
        courses_to_return: vec![Course::default()],
        ..MockRepoControl::default()
    });

    let result = handlers::list_courses(student_user(), State(state)).await;

    let response = result.unwrap().into_response();
    let (_parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let courses: Vec<Course> = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(courses.len(), 1);
}

#[test]
async fn test_available_courses_forbidden_for_lecturer() {
    let state = create_test_state(MockRepoControl::default());

    let result = handlers::list_available_courses(lecturer_user(), State(state)).await;

    assert_eq!(result.unwrap_err().kind(), "forbidden");
}

// --- REPORT TESTS ---

#[test]
async fn test_create_report_forbidden_for_student() {
    let state = create_test_state(MockRepoControl::default());

    let result =
        handlers::create_report(student_user(), State(state), Json(sample_report_request())).await;

    assert_eq!(result.unwrap_err().kind(), "forbidden");
}

#[test]
async fn test_create_report_requires_course_details_when_no_id() {
    let state = create_test_state(MockRepoControl::default());
    let payload = CreateReportRequest {
        course_id: None,
        course_name: Some("Web Application Development".to_string()),
        course_code: None, // missing
        ..sample_report_request()
    };

    let result = handlers::create_report(lecturer_user(), State(state), Json(payload)).await;

    let err = result.unwrap_err();
    assert_eq!(err.kind(), "validation_failed");
}

#[test]
async fn test_create_report_accepts_course_details_in_place_of_id() {
    let state = create_test_state(MockRepoControl::default());
    let payload = CreateReportRequest {
        course_id: None,
        course_name: Some("Web Application Development".to_string()),
        course_code: Some("DIWA2110".to_string()),
        ..sample_report_request()
    };

    let result = handlers::create_report(lecturer_user(), State(state), Json(payload)).await;

    assert!(result.is_ok());
}

#[test]
async fn test_create_report_stamps_author_from_identity() {
    // The payload carries no lecturer name anywhere; the handler must pass
    // the authenticated identity down to the repository.
    let state = create_test_state(MockRepoControl::default());

    let result =
        handlers::create_report(lecturer_user(), State(state), Json(sample_report_request()))
            .await;

    let Json(response) = result.unwrap();
    assert_eq!(response.report.lecturer_name, "Dr. Molefe");
    assert_eq!(response.report.lecturer_id, 20);
}

#[test]
async fn test_get_report_not_found() {
    let state = create_test_state(MockRepoControl {
        report_to_return: None,
        ..MockRepoControl::default()
    });

    let result = handlers::get_report(pl_user(), State(state), Path(42)).await;

    assert_eq!(result.unwrap_err().kind(), "not_found");
}

#[test]
async fn test_report_feedback_forbidden_for_lecturer() {
    let state = create_test_state(MockRepoControl::default());
    let payload = FeedbackRequest {
        feedback: "Cover recursion next time".to_string(),
    };

    let result =
        handlers::update_report_feedback(lecturer_user(), State(state), Path(1), Json(payload))
            .await;

    assert_eq!(result.unwrap_err().kind(), "forbidden");
}

#[test]
async fn test_report_feedback_overwrites_field() {
    let state = create_test_state(MockRepoControl {
        report_to_return: Some(ReportWithCourse {
            prl_feedback: Some("old note".to_string()),
            ..ReportWithCourse::default()
        }),
        ..MockRepoControl::default()
    });
    let payload = FeedbackRequest {
        feedback: "Cover recursion next time".to_string(),
    };

    let result =
        handlers::update_report_feedback(prl_user(), State(state), Path(1), Json(payload)).await;

    let Json(response) = result.unwrap();
    assert_eq!(
        response.report.prl_feedback.as_deref(),
        Some("Cover recursion next time")
    );
}

#[test]
async fn test_report_feedback_not_found() {
    let state = create_test_state(MockRepoControl {
        report_to_return: None,
        ..MockRepoControl::default()
    });
    let payload = FeedbackRequest {
        feedback: "anything".to_string(),
    };

    let result =
        handlers::update_report_feedback(prl_user(), State(state), Path(1), Json(payload)).await;

    assert_eq!(result.unwrap_err().kind(), "not_found");
}

// --- RATING TESTS ---

#[test]
async fn test_create_rating_forbidden_for_lecturer() {
    let state = create_test_state(MockRepoControl::default());
    let payload = CreateRatingRequest {
        course_id: 1,
        score: 4,
        feedback: "Great course".to_string(),
    };

    let result = handlers::create_rating(lecturer_user(), State(state), Json(payload)).await;

    assert_eq!(result.unwrap_err().kind(), "forbidden");
}

#[test]
async fn test_create_rating_score_bounds() {
    for score in [0, 6, -1] {
        let state = create_test_state(MockRepoControl::default());
        let payload = CreateRatingRequest {
            course_id: 1,
            score,
            feedback: String::new(),
        };

        let result = handlers::create_rating(student_user(), State(state), Json(payload)).await;

        assert_eq!(result.unwrap_err().kind(), "validation_failed");
    }
}

#[test]
async fn test_create_rating_duplicate_conflict() {
    let state = create_test_state(MockRepoControl {
        rating_duplicate: true,
        ..MockRepoControl::default()
    });
    let payload = CreateRatingRequest {
        course_id: 1,
        score: 5,
        feedback: "Again!".to_string(),
    };

    let result = handlers::create_rating(student_user(), State(state), Json(payload)).await;

    assert_eq!(result.unwrap_err().kind(), "duplicate_conflict");
}

#[test]
async fn test_create_rating_success() {
    let state = create_test_state(MockRepoControl::default());
    let payload = CreateRatingRequest {
        course_id: 1,
        score: 5,
        feedback: "Excellent".to_string(),
    };

    let result = handlers::create_rating(student_user(), State(state), Json(payload)).await;

    let Json(response) = result.unwrap();
    assert_eq!(response.rating.student_id, 10);
    assert_eq!(response.rating.score, 5);
}

// --- DIRECTORY / DASHBOARD TESTS ---

#[test]
async fn test_list_users_forbidden_for_prl() {
    let state = create_test_state(MockRepoControl::default());

    let result =
        handlers::list_users(prl_user(), State(state), Query(handlers::UserFilter { role: None }))
            .await;

    assert_eq!(result.unwrap_err().kind(), "forbidden");
}

#[test]
async fn test_list_students_allowed_for_prl_and_pl() {
    for user in [prl_user(), pl_user()] {
        let state = create_test_state(MockRepoControl::default());
        let result = handlers::list_students(user, State(state)).await;
        assert!(result.is_ok());
    }
}

#[test]
async fn test_list_students_forbidden_for_student() {
    let state = create_test_state(MockRepoControl::default());

    let result = handlers::list_students(student_user(), State(state)).await;

    assert_eq!(result.unwrap_err().kind(), "forbidden");
}

#[test]
async fn test_monitoring_success_for_all_roles() {
    for user in [student_user(), lecturer_user(), prl_user(), pl_user()] {
        let state = create_test_state(MockRepoControl {
            monitoring_to_return: vec![MonitoringRow::default()],
            ..MockRepoControl::default()
        });
        let result = handlers::get_monitoring(user, State(state)).await;
        let Json(rows) = result.unwrap();
        assert_eq!(rows.len(), 1);
    }
}

#[test]
async fn test_classes_forbidden_for_student() {
    let state = create_test_state(MockRepoControl::default());

    let result = handlers::list_classes(student_user(), State(state)).await;

    assert_eq!(result.unwrap_err().kind(), "forbidden");
}
