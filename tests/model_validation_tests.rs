use reporting_portal::{
    error::ApiError,
    models::{CreateCourseRequest, NewCourse, ReportWithCourse, Role},
};

#[test]
fn test_role_serializes_lowercase() {
    // The wire format and the database enum both use lowercase tags.
    assert_eq!(serde_json::to_string(&Role::Student).unwrap(), r#""student""#);
    assert_eq!(serde_json::to_string(&Role::Lecturer).unwrap(), r#""lecturer""#);
    assert_eq!(serde_json::to_string(&Role::Prl).unwrap(), r#""prl""#);
    assert_eq!(serde_json::to_string(&Role::Pl).unwrap(), r#""pl""#);

    let parsed: Role = serde_json::from_str(r#""prl""#).unwrap();
    assert_eq!(parsed, Role::Prl);
}

#[test]
fn test_new_course_defaults_optional_fields() {
    // The Mutation Guard normalization: optional inputs become empty string /
    // zero, never NULL, so aggregation downstream always has totals.
    let req = CreateCourseRequest {
        faculty_name: "ICT".to_string(),
        class_name: "BSCSM1".to_string(),
        course_name: "Web Application Development".to_string(),
        course_code: "DIWA2110".to_string(),
        venue: None,
        scheduled_time: None,
        total_registered: None,
    };

    let course = NewCourse::from(req);

    assert_eq!(course.venue, "");
    assert_eq!(course.scheduled_time, "");
    assert_eq!(course.total_registered, 0);
}

#[test]
fn test_new_course_keeps_supplied_fields() {
    let req = CreateCourseRequest {
        faculty_name: "ICT".to_string(),
        class_name: "BSCSM1".to_string(),
        course_name: "Web Application Development".to_string(),
        course_code: "DIWA2110".to_string(),
        venue: Some("Hall 7".to_string()),
        scheduled_time: Some("Mon 09:00".to_string()),
        total_registered: Some(45),
    };

    let course = NewCourse::from(req);

    assert_eq!(course.venue, "Hall 7");
    assert_eq!(course.scheduled_time, "Mon 09:00");
    assert_eq!(course.total_registered, 45);
}

#[test]
fn test_report_feedback_serializes_as_null_when_absent() {
    // prl_feedback is the one genuinely nullable field on a report; clients
    // rely on an explicit null rather than a missing key.
    let report = ReportWithCourse::default();
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains(r#""prl_feedback":null"#));
}

#[test]
fn test_error_kinds_are_pairwise_distinct() {
    // Forbidden, NotFound and ValidationFailed must be distinguishable both
    // by kind and by HTTP status.
    let errors = [
        ApiError::unauthenticated("a"),
        ApiError::forbidden("b"),
        ApiError::validation("c"),
        ApiError::duplicate("d"),
        ApiError::not_found("e"),
        ApiError::unavailable("f"),
        ApiError::internal("g"),
    ];

    for (i, left) in errors.iter().enumerate() {
        for (j, right) in errors.iter().enumerate() {
            if i != j {
                assert_ne!(left.kind(), right.kind());
                assert_ne!(left.status(), right.status());
            }
        }
    }
}

#[test]
fn test_error_status_mapping() {
    use axum::http::StatusCode;

    assert_eq!(ApiError::unauthenticated("x").status(), StatusCode::UNAUTHORIZED);
    assert_eq!(ApiError::forbidden("x").status(), StatusCode::FORBIDDEN);
    assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
    assert_eq!(ApiError::duplicate("x").status(), StatusCode::CONFLICT);
    assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
    assert_eq!(ApiError::unavailable("x").status(), StatusCode::SERVICE_UNAVAILABLE);
}
