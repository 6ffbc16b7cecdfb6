use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::debug;

use super::{
    claims::{Principal, Role},
    guard::require_role,
    jwt::TokenCodec,
};
use crate::error::AppError;

/// Resolves the caller from `Authorization: Bearer <token>`. Stateless: only
/// the token codec is consulted.
pub fn resolve_bearer(headers: &HeaderMap, codec: &TokenCodec) -> Result<Principal, AppError> {
    let Some(auth) = headers.get(AUTHORIZATION) else {
        debug!("request without authorization header");
        return Err(AppError::Unauthenticated("No token provided"));
    };

    let token = auth
        .to_str()
        .ok()
        .and_then(|auth| {
            auth.strip_prefix("Bearer ")
                .or_else(|| auth.strip_prefix("bearer "))
        })
        .ok_or_else(|| {
            debug!("authorization header without bearer scheme");
            AppError::Unauthenticated("Invalid or expired token")
        })?
        .trim();
    if token.is_empty() {
        return Err(AppError::Unauthenticated("No token provided"));
    }

    Ok(codec.verify(token)?)
}

/// Any authenticated caller.
pub struct AuthUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<TokenCodec>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let codec = Arc::<TokenCodec>::from_ref(state);
        resolve_bearer(&parts.headers, &codec).map(AuthUser)
    }
}

/// Authenticated caller holding the `admin` role.
pub struct AdminUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<TokenCodec>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(principal) = AuthUser::from_request_parts(parts, state).await?;
        require_role(&principal, Role::Admin)?;
        Ok(AdminUser(principal))
    }
}
