use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{CreatePostRequest, CreatedPostResponse, PostStatusResponse, StatusRequest, UpdatePostRequest};
use crate::{
    auth::{
        claims::Role,
        extractors::{AdminUser, AuthUser},
        guard::{require_owner, require_owner_or_role},
    },
    dto::MessageResponse,
    error::AppError,
    extract::JsonBody,
    posts::repo_types::{NewPost, PostPatch, PostStatus, PostSummary, PostView},
    state::AppState,
};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/mine", get(my_posts))
        .route("/posts/:id", get(get_post))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/:id", put(update_post).delete(delete_post))
        .route("/posts/:id/status", put(update_status))
}

// --- handlers ---

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    JsonBody(payload): JsonBody<CreatePostRequest>,
) -> Result<(StatusCode, Json<CreatedPostResponse>), AppError> {
    let title = payload.title.trim();
    let content = payload.content.trim();
    let category = payload.category.trim();
    if title.is_empty() || content.is_empty() || category.is_empty() {
        return Err(AppError::BadRequest("Title, content, and category are required"));
    }

    let category = state
        .store
        .find_category_by_name(category)
        .await?
        .ok_or(AppError::BadRequest("Invalid category"))?;

    let post = state
        .store
        .insert_post(NewPost {
            user_id: principal.subject_id,
            title: title.to_string(),
            content: content.to_string(),
            image: payload.image.filter(|s| !s.is_empty()),
            address: payload.address.filter(|s| !s.trim().is_empty()),
            category_id: category.id,
        })
        .await?;

    info!(user_id = principal.subject_id, post_id = post.id, "post created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedPostResponse {
            message: "Post created",
            post,
        }),
    ))
}

/// Approved posts, newest first.
#[instrument(skip(state))]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostView>>, AppError> {
    Ok(Json(state.store.list_posts_by_status(PostStatus::Approved).await?))
}

#[instrument(skip(state))]
pub async fn my_posts(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<Vec<PostSummary>>, AppError> {
    Ok(Json(state.store.list_posts_by_user(principal.subject_id).await?))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PostView>, AppError> {
    let post = state
        .store
        .find_post(id)
        .await?
        .ok_or(AppError::NotFound("Post not found"))?;
    Ok(Json(post))
}

/// Owner only; admins moderate through the status route instead.
#[instrument(skip(state, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<UpdatePostRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let existing = state
        .store
        .find_post(id)
        .await?
        .ok_or(AppError::NotFound("Post not found"))?;

    require_owner(&principal, existing.post.user_id)
        .map_err(|_| AppError::NotOwner("Not authorized to edit this post"))?;

    let patch = PostPatch::from(payload);
    if patch.is_empty() {
        return Err(AppError::BadRequest("No fields to update"));
    }

    if !state.store.update_post(id, patch).await? {
        return Err(AppError::NotFound("Post not found"));
    }
    info!(user_id = principal.subject_id, post_id = id, "post updated");
    Ok(Json(MessageResponse::new("Post updated")))
}

#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<StatusRequest>,
) -> Result<Json<PostStatusResponse>, AppError> {
    let status: PostStatus = payload
        .status
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid status"))?;

    if !state.store.set_post_status(id, status).await? {
        return Err(AppError::NotFound("Post not found"));
    }
    let post = state
        .store
        .find_post(id)
        .await?
        .ok_or(AppError::NotFound("Post not found"))?;

    info!(admin_id = admin.subject_id, post_id = id, ?status, "post status changed");
    Ok(Json(PostStatusResponse {
        message: "Post status updated",
        post,
    }))
}

/// Owner or admin.
#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let existing = state
        .store
        .find_post(id)
        .await?
        .ok_or(AppError::NotFound("Post not found"))?;

    require_owner_or_role(&principal, existing.post.user_id, Role::Admin)
        .map_err(|_| AppError::NotOwner("Not authorized to delete this post"))?;

    if !state.store.delete_post(id).await? {
        return Err(AppError::NotFound("Post not found or already deleted"));
    }
    info!(user_id = principal.subject_id, post_id = id, "post deleted");
    Ok(Json(MessageResponse::new("Post deleted")))
}
