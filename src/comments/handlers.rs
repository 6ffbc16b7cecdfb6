use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    auth::{claims::Role, extractors::AuthUser, guard::require_owner_or_role},
    comments::repo_types::CommentView,
    dto::MessageResponse,
    error::AppError,
    extract::JsonBody,
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedCommentResponse {
    pub message: &'static str,
    pub comment: CommentView,
}

pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/comments/post/:post_id",
            post(add_comment).get(list_comments),
        )
        .route("/comments/:id", delete(delete_comment))
}

#[instrument(skip(state, payload))]
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(post_id): Path<i64>,
    JsonBody(payload): JsonBody<CommentRequest>,
) -> Result<(StatusCode, Json<CreatedCommentResponse>), AppError> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("Content is required"));
    }
    if state.store.find_post(post_id).await?.is_none() {
        return Err(AppError::NotFound("Post not found"));
    }

    let comment = state
        .store
        .insert_comment(post_id, principal.subject_id, content)
        .await?;
    info!(user_id = principal.subject_id, post_id, comment_id = comment.comment.id, "comment added");
    Ok((
        StatusCode::CREATED,
        Json(CreatedCommentResponse {
            message: "Comment added",
            comment,
        }),
    ))
}

/// Newest first. An unknown post just has no comments.
#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<CommentView>>, AppError> {
    Ok(Json(state.store.list_comments_by_post(post_id).await?))
}

#[instrument(skip(state))]
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let existing = state
        .store
        .find_comment(id)
        .await?
        .ok_or(AppError::NotFound("Comment not found"))?;

    require_owner_or_role(&principal, existing.comment.user_id, Role::Admin)
        .map_err(|_| AppError::NotOwner("Not authorized to delete this comment"))?;

    if !state.store.delete_comment(id).await? {
        return Err(AppError::NotFound("Comment not found"));
    }
    info!(user_id = principal.subject_id, comment_id = id, "comment deleted");
    Ok(Json(MessageResponse::new("Comment deleted")))
}
