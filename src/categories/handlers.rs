use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
    auth::extractors::AdminUser,
    categories::repo_types::Category,
    dto::MessageResponse,
    error::AppError,
    extract::JsonBody,
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CategoryRequest {
    pub name: String,
}

impl CategoryRequest {
    fn name(&self) -> Result<&str, AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Name is required"));
        }
        Ok(name)
    }
}

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:id", put(update_category).delete(delete_category))
}

#[instrument(skip(state))]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.store.list_categories().await?))
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(payload): JsonBody<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = state.store.insert_category(payload.name()?).await?;
    info!(admin_id = admin.subject_id, category_id = category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<CategoryRequest>,
) -> Result<Json<Category>, AppError> {
    let category = state
        .store
        .rename_category(id, payload.name()?)
        .await?
        .ok_or(AppError::NotFound("Category not found"))?;
    info!(admin_id = admin.subject_id, category_id = id, "category renamed");
    Ok(Json(category))
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.delete_category(id).await? {
        return Err(AppError::NotFound("Category not found"));
    }
    info!(admin_id = admin.subject_id, category_id = id, "category deleted");
    Ok(Json(MessageResponse::new("Category deleted successfully")))
}
