use crate::{auth::AuthUser, error::ApiError, models::Role};

/// Resource
///
/// The resource families subject to role-scoped visibility. Monitoring is
/// deliberately absent: the dashboard is a projection over reports and reuses
/// `Resource::Reports`, so the two can never disagree on who sees what.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Courses,
    Classes,
    Assignments,
    Reports,
    Ratings,
}

/// Scope
///
/// The selection predicate a caller is entitled to for one resource family.
/// The repository renders the scope into the query itself (JOIN/WHERE);
/// nothing outside the scope is ever fetched and then filtered away.
///
/// The id-carrying variants are interpreted per family:
/// - `Enrolled(student_id)`: rows joined through the student's enrollments.
/// - `Assigned(lecturer_id)`: rows joined through the lecturer's
///   assignments.
/// - `Authored(user_id)`: rows whose author column matches the caller
///   (`lecturer_id` on reports, `student_id` on ratings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Enrolled(i32),
    Assigned(i32),
    Authored(i32),
    Faculty(String),
}

/// scope_for
///
/// The single declarative policy table: (resource, role) → scope. Every
/// role-scoped read in the application (listings, by-id lookups and the
/// monitoring façade alike) obtains its predicate here, so there is exactly
/// one place where visibility can be right or wrong.
///
/// A (resource, role) pair with no entry is a terminal access denial,
/// distinguishable from an empty result set.
pub fn scope_for(resource: Resource, user: &AuthUser) -> Result<Scope, ApiError> {
    let scope = match (resource, user.role) {
        (Resource::Courses, Role::Student) => Scope::Enrolled(user.id),
        (Resource::Courses, Role::Lecturer) => Scope::Assigned(user.id),
        (Resource::Courses, Role::Prl) => Scope::Faculty(faculty_of(user)?),
        (Resource::Courses, Role::Pl) => Scope::All,

        (Resource::Classes, Role::Lecturer) => Scope::Assigned(user.id),
        (Resource::Classes, Role::Prl) => Scope::Faculty(faculty_of(user)?),
        (Resource::Classes, Role::Pl) => Scope::All,

        (Resource::Assignments, Role::Pl) => Scope::All,

        (Resource::Reports, Role::Student) => Scope::Enrolled(user.id),
        (Resource::Reports, Role::Lecturer) => Scope::Authored(user.id),
        (Resource::Reports, Role::Prl) => Scope::Faculty(faculty_of(user)?),
        (Resource::Reports, Role::Pl) => Scope::All,

        (Resource::Ratings, Role::Student) => Scope::Authored(user.id),
        (Resource::Ratings, Role::Lecturer) => Scope::Assigned(user.id),
        (Resource::Ratings, Role::Prl) => Scope::Faculty(faculty_of(user)?),
        (Resource::Ratings, Role::Pl) => Scope::All,

        _ => {
            return Err(ApiError::forbidden(format!(
                "role is not allowed to access {resource:?}"
            )));
        }
    };
    Ok(scope)
}

/// A PRL without a faculty on record has no valid scope; the account is
/// malformed and the read is denied rather than silently widened.
fn faculty_of(user: &AuthUser) -> Result<String, ApiError> {
    user.faculty
        .clone()
        .ok_or_else(|| ApiError::forbidden("no faculty assigned to this account"))
}
