use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, TokenResponse},
        services,
    },
    error::AppError,
    extract::JsonBody,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let token = services::register(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = services::login(&state, payload).await?;
    Ok(Json(TokenResponse { token }))
}
