use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::{error, info, warn};

use super::{
    claims::Role,
    dto::{LoginRequest, RegisterRequest},
    jwt::TokenError,
};
use crate::{
    error::{AppError, FieldError},
    state::AppState,
    store::{StoreError, UniqueField},
    users::repo_types::NewUser,
};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid input")]
    Validation(Vec<FieldError>),
    #[error("email already registered")]
    EmailTaken,
    #[error("username already taken")]
    UsernameTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Storage(StoreError),
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<StoreError> for AccountError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(UniqueField::Email) => AccountError::EmailTaken,
            StoreError::Conflict(UniqueField::Username) => AccountError::UsernameTaken,
            other => AccountError::Storage(other),
        }
    }
}

impl From<AccountError> for AppError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::Validation(errors) => AppError::Validation(errors),
            AccountError::EmailTaken => AppError::Conflict("Email already registered"),
            AccountError::UsernameTaken => AppError::Conflict("Username already taken"),
            AccountError::InvalidCredentials => AppError::InvalidCredentials,
            AccountError::Hash(msg) => AppError::Internal(msg),
            AccountError::Storage(e) => e.into(),
            AccountError::Token(e) => AppError::Internal(e.to_string()),
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

/// Canonical form used for storage and uniqueness comparison.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

struct Registration {
    username: String,
    email: String,
    password: String,
    role: Option<Role>,
}

fn validate_registration(req: RegisterRequest) -> Result<Registration, Vec<FieldError>> {
    let mut errors = Vec::new();

    let username = req.username.trim().to_string();
    if username.is_empty() {
        errors.push(FieldError {
            field: "username",
            msg: "Username is required",
        });
    }

    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        errors.push(FieldError {
            field: "email",
            msg: "Invalid email",
        });
    }

    if req.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError {
            field: "password",
            msg: "Password must be at least 6 characters",
        });
    }

    let role = match req.role.as_deref() {
        None => None,
        Some(r) => match r.parse::<Role>() {
            Ok(role) => Some(role),
            Err(()) => {
                errors.push(FieldError {
                    field: "role",
                    msg: "Role must be 'user' or 'admin'",
                });
                None
            }
        },
    };

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(Registration {
        username,
        email,
        password: req.password,
        role,
    })
}

/// Creates the account and returns a session token for it.
pub async fn register(state: &AppState, req: RegisterRequest) -> Result<String, AccountError> {
    let reg = validate_registration(req).map_err(|errors| {
        warn!(count = errors.len(), "registration rejected by validation");
        AccountError::Validation(errors)
    })?;

    let role = match reg.role {
        None => Role::default(),
        Some(role) if state.config.allow_self_assigned_role => role,
        Some(Role::Admin) => {
            warn!(username = %reg.username, "self-assigned admin role ignored");
            Role::User
        }
        Some(role) => role,
    };

    if state.store.find_user_by_email(&reg.email).await?.is_some() {
        warn!(email = %reg.email, "email already registered");
        return Err(AccountError::EmailTaken);
    }
    if state.store.find_user_by_username(&reg.username).await?.is_some() {
        warn!(username = %reg.username, "username already taken");
        return Err(AccountError::UsernameTaken);
    }

    let hasher = state.hasher.clone();
    let password = reg.password;
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| AccountError::Hash(e.to_string()))?
        .map_err(|e| AccountError::Hash(e.to_string()))?;

    // The pre-checks above can race; the unique constraints are authoritative.
    let user = state
        .store
        .insert_user(NewUser {
            username: reg.username,
            email: reg.email,
            password_hash,
            role,
        })
        .await
        .map_err(|e| {
            let e = AccountError::from(e);
            match &e {
                AccountError::Storage(inner) => error!(error = %inner, "create user failed"),
                other => warn!(error = %other, "create user lost uniqueness race"),
            }
            e
        })?;

    let token = state.tokens.issue(user.id, user.role)?;
    info!(user_id = user.id, username = %user.username, role = %user.role, "user registered");
    Ok(token)
}

/// Same error for unknown email and wrong password.
pub async fn login(state: &AppState, req: LoginRequest) -> Result<String, AccountError> {
    let email = normalize_email(&req.email);

    let mut errors = Vec::new();
    if !is_valid_email(&email) {
        errors.push(FieldError {
            field: "email",
            msg: "Invalid email",
        });
    }
    if req.password.is_empty() {
        errors.push(FieldError {
            field: "password",
            msg: "Password is required",
        });
    }
    if !errors.is_empty() {
        return Err(AccountError::Validation(errors));
    }

    let user = match state.store.find_user_by_email(&email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AccountError::InvalidCredentials);
        }
    };

    let hasher = state.hasher.clone();
    let digest = user.password_hash.clone();
    let password = req.password;
    let ok = tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
        .await
        .map_err(|e| AccountError::Hash(e.to_string()))?;

    if !ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(AccountError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id, user.role)?;
    info!(user_id = user.id, role = %user.role, "user logged in");
    Ok(token)
}
