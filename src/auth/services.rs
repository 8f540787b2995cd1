use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::warn;

use crate::{
    auth::{
        password::{hash_password, verify_password},
        repo::{self, NewUser, RoleProfile, User},
    },
    error::ApiError,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registration: duplicate check, hash, insert. Hashing is an explicit step
/// on this single write path, not a save hook. The pre-insert lookup and
/// the unique index report the same conflict outcome, so two concurrent
/// registrations racing past the lookup still leave exactly one record.
pub async fn register(
    db: &PgPool,
    username: String,
    email: String,
    password: &str,
    profile: RoleProfile,
) -> Result<User, ApiError> {
    if repo::find_by_email(db, &email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash = hash_password(password)?;
    let candidate = NewUser {
        username,
        email,
        password_hash,
        profile,
    };
    match repo::create(db, &candidate).await {
        Ok(user) => Ok(user),
        Err(e) if repo::is_unique_violation(&e) => {
            warn!(email = %candidate.email, "duplicate insert lost the race");
            Err(ApiError::DuplicateEmail)
        }
        Err(e) => Err(ApiError::Internal(e)),
    }
}

/// Login: lookup plus hash comparison. Unknown email and wrong password
/// collapse into one generic failure so the response never reveals whether
/// an account exists.
pub async fn authenticate(db: &PgPool, email: &str, password: &str) -> Result<User, ApiError> {
    let user = match repo::find_by_email(db, email).await? {
        Some(u) => u,
        None => {
            warn!(%email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }
    Ok(user)
}
