use axum::{
    extract::{Path, State},
    routing::{delete, get, patch},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        claims::Role,
        extractors::{AdminUser, AuthUser},
    },
    dto::MessageResponse,
    error::AppError,
    extract::JsonBody,
    state::AppState,
    users::{
        dto::{DashboardResponse, PublicUser, RoleChangeRequest},
        repo_types::ProfileUpdate,
    },
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/user/dashboard", get(dashboard))
        .route("/user/profile", get(get_profile).put(update_profile))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", delete(delete_user))
        .route("/admin/users/:id/role", patch(change_role))
}

#[instrument(skip_all)]
pub async fn dashboard(AuthUser(principal): AuthUser) -> Json<DashboardResponse> {
    Json(DashboardResponse {
        message: format!("Welcome user {}", principal.subject_id),
        user: principal,
    })
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = state
        .store
        .find_user_by_id(principal.subject_id)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    JsonBody(payload): JsonBody<ProfileUpdate>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.update_profile(principal.subject_id, payload).await? {
        return Err(AppError::NotFound("User not found"));
    }
    info!(user_id = principal.subject_id, "profile updated");
    Ok(Json(MessageResponse::new("Profile updated successfully")))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    let users = state.store.list_users().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.delete_user(id).await? {
        return Err(AppError::NotFound("User not found"));
    }
    info!(admin_id = admin.subject_id, user_id = id, "user deleted");
    Ok(Json(MessageResponse::new("User deleted")))
}

/// Takes effect at the user's next login; tokens already issued keep their role.
#[instrument(skip(state, payload))]
pub async fn change_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<RoleChangeRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let role: Role = payload
        .role
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid role"))?;
    if !state.store.set_role(id, role).await? {
        return Err(AppError::NotFound("User not found"));
    }
    info!(admin_id = admin.subject_id, user_id = id, role = %role, "user role changed");
    Ok(Json(MessageResponse::new(format!("User role updated to {role}"))))
}
