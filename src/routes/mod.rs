/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated
/// modules. Access control is applied explicitly at the module level (via
/// Axum layers), preventing accidental exposure of protected endpoints.

/// Routes accessible without a session (health, register, login).
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a validated user session; per-role checks happen inside the
/// handlers against the policy table.
pub mod authenticated;

/// Routes restricted exclusively to users with the 'pl' role
/// (lecture assignment management).
pub mod pl;
