use tracing::{error, info, warn};
use uuid::Uuid;

use super::password::{hash_password, verify_password};
use super::repo_types::User;
use crate::{error::AppError, state::AppState, validation::Validator};

pub const MIN_PASSWORD_LEN: usize = 5;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register_user(
    st: &AppState,
    name: &str,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let name = name.trim();
    let email = normalize_email(email);

    let mut v = Validator::new();
    v.required("name", name)
        .required("email", &email)
        .email("email", &email)
        .required("password", password)
        .min_len("password", password, MIN_PASSWORD_LEN);
    v.finish()?;

    if st.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(password)?;

    // The unique index still decides races between concurrent sign-ups.
    let Some(user) = st.users.create(name, &email, &hash).await? else {
        warn!(email = %email, "email taken during insert");
        return Err(AppError::Conflict("Email already registered".into()));
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

pub async fn sign_in(st: &AppState, email: &str, password: &str) -> Result<String, AppError> {
    let email = normalize_email(email);

    let mut v = Validator::new();
    v.required("email", &email)
        .email("email", &email)
        .required("password", password);
    v.finish()?;

    let invalid = || AppError::Auth("Invalid credentials".into());

    let Some(user) = st.users.find_by_email(&email).await? else {
        warn!(email = %email, "sign-in unknown email");
        return Err(invalid());
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "sign-in invalid password");
        return Err(invalid());
    }

    let token = st.tokens.issue(user.id).map_err(|e| {
        error!(error = %e, user_id = %user.id, "token issue failed");
        AppError::TokenIssuance(e.to_string())
    })?;

    info!(user_id = %user.id, "user signed in");
    Ok(token)
}

/// Resolve a token-verified id to a stored user.
pub async fn require_caller(st: &AppState, caller: Uuid) -> Result<User, AppError> {
    match st.users.find_by_id(caller).await? {
        Some(user) => Ok(user),
        None => {
            warn!(user_id = %caller, "token subject has no user");
            Err(AppError::user_not_found())
        }
    }
}
