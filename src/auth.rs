use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    models::{Role, User},
    repository::RepositoryState,
};

/// Claims
///
/// The payload signed into every issued JWT. Only the subject and the
/// timestamps are trusted from the token; role and faculty are re-read from
/// the database on every request so a role change takes effect immediately.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's id in the `users` table.
    pub sub: i32,
    /// Expiration Time (exp): timestamp after which the JWT must not be
    /// accepted.
    pub exp: usize,
    /// Issued At (iat): timestamp when the JWT was issued.
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity context of an authenticated request:
/// `{id, name, role, faculty}`. Every query and mutation function receives
/// this value explicitly; there is no ambient request identity anywhere in
/// the application.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub name: String,
    pub role: Role,
    pub faculty: Option<String>,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        AuthUser {
            id: user.id,
            name: user.name,
            role: user.role,
            faculty: user.faculty,
        }
    }
}

/// issue_token
///
/// Signs a bearer token for a freshly registered or logged-in user. The
/// token carries only the subject id; everything else is resolved per
/// request.
pub fn issue_token(user: &User, config: &AppConfig) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(config.token_ttl_hours)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("token issuance failed: {e:?}");
        ApiError::internal("failed to issue token")
    })
}

/// hash_password
///
/// One-way Argon2id hash of a clear-text password. The resulting string
/// embeds algorithm, parameters and salt; it is the only credential form the
/// application ever stores.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("password hashing failed: {e:?}");
            ApiError::internal("failed to process credentials")
        })
}

/// verify_password
///
/// Compares a clear-text password against a stored hash. A mismatch is
/// `Ok(false)`; only a malformed hash or an internal hasher failure is an
/// error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        tracing::error!("stored password hash is malformed: {e:?}");
        ApiError::internal("failed to process credentials")
    })?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => {
            tracing::error!("password verification failed: {e:?}");
            Err(ApiError::internal("failed to process credentials"))
        }
    }
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a
/// function argument in any authenticated handler. This cleanly separates
/// authentication (extractor) from authorization and business logic (the
/// handler).
///
/// The process:
/// 1. Dependency Resolution: Repository and AppConfig from the app state.
/// 2. Local Bypass: development-time access via the 'x-user-id' header.
/// 3. Token Validation: Bearer token extraction and JWT decoding.
/// 4. DB Lookup: the user's current name, role and faculty from Postgres.
///
/// Rejection: `ApiError::Unauthenticated` (401) on any failure, before any
/// role check runs.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 1. Dependency Resolution
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // 2. Local Development Bypass Check
        // In Env::Local only, a known user id in the 'x-user-id' header
        // authenticates the request. The id must still resolve to a real row
        // so the role and faculty are loaded correctly.
        if config.env == Env::Local {
            if let Some(user_id_header) = parts.headers.get("x-user-id") {
                if let Ok(id_str) = user_id_header.to_str() {
                    if let Ok(user_id) = id_str.parse::<i32>() {
                        if let Ok(Some(user)) = repo.get_user(user_id).await {
                            return Ok(AuthUser::from(user));
                        }
                    }
                }
            }
        }
        // In Production, or when the bypass did not resolve, execution falls
        // through to the standard JWT validation flow.

        // 3. Token Extraction
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthenticated("missing bearer token"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthenticated("missing bearer token"))?;

        // 4. JWT Decoding
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|_| ApiError::unauthenticated("invalid or expired token"))?;

        // 5. Database Lookup (Final Verification)
        // A token for a deleted user is valid cryptographically but must not
        // authenticate; the row is also the source of the current role.
        let user = repo
            .get_user(token_data.claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthenticated("unknown user"))?;

        Ok(AuthUser::from(user))
    }
}
