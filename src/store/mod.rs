//! Persistence capabilities.
//!
//! Handlers and services only see these traits; [`crate::db::PgStore`] is the
//! production implementation and [`memory::MemoryStore`] backs the tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    auth::claims::Role,
    categories::repo_types::Category,
    comments::repo_types::CommentView,
    posts::repo_types::{NewPost, Post, PostPatch, PostStatus, PostSummary, PostView},
    users::repo_types::{NewUser, ProfileUpdate, User},
};

#[cfg(test)]
pub mod memory;

/// Unique constraint a write collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
    CategoryName,
}

/// Parent row a write referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    User,
    Post,
    Category,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0:?}")]
    Conflict(UniqueField),
    #[error("referenced {0:?} does not exist")]
    MissingReference(Reference),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>>;
    /// Single-row insert. Duplicate email/username yields [`StoreError::Conflict`].
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn update_profile(&self, id: i64, profile: ProfileUpdate) -> StoreResult<bool>;
    async fn set_role(&self, id: i64, role: Role) -> StoreResult<bool>;
    async fn delete_user(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<Category>>;
    async fn insert_category(&self, name: &str) -> StoreResult<Category>;
    async fn rename_category(&self, id: i64, name: &str) -> StoreResult<Option<Category>>;
    async fn delete_category(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, post: NewPost) -> StoreResult<Post>;
    async fn find_post(&self, id: i64) -> StoreResult<Option<PostView>>;
    async fn list_posts_by_status(&self, status: PostStatus) -> StoreResult<Vec<PostView>>;
    async fn list_posts_by_user(&self, user_id: i64) -> StoreResult<Vec<PostSummary>>;
    async fn update_post(&self, id: i64, patch: PostPatch) -> StoreResult<bool>;
    async fn set_post_status(&self, id: i64, status: PostStatus) -> StoreResult<bool>;
    async fn delete_post(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert_comment(&self, post_id: i64, user_id: i64, content: &str)
        -> StoreResult<CommentView>;
    async fn find_comment(&self, id: i64) -> StoreResult<Option<CommentView>>;
    async fn list_comments_by_post(&self, post_id: i64) -> StoreResult<Vec<CommentView>>;
    async fn delete_comment(&self, id: i64) -> StoreResult<bool>;
}

/// Everything the HTTP layer needs from persistence.
pub trait Store: UserStore + CategoryStore + PostStore + CommentStore {}

impl<T> Store for T where T: UserStore + CategoryStore + PostStore + CommentStore {}
