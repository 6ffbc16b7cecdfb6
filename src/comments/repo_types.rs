use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64, // owner, immutable
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Comment joined with its author's username.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CommentView {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub comment: Comment,
    pub username: String,
}
