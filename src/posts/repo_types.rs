use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Moderation/progress state of a post. Stored as the `post_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "post_status", rename_all = "snake_case")]
pub enum PostStatus {
    Pending,
    Approved,
    Rejected,
    Open,
    InProgress,
    Closed,
}

impl FromStr for PostStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pending" => PostStatus::Pending,
            "approved" => PostStatus::Approved,
            "rejected" => PostStatus::Rejected,
            "open" => PostStatus::Open,
            "in_progress" => PostStatus::InProgress,
            "closed" => PostStatus::Closed,
            _ => return Err(()),
        })
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub user_id: i64, // owner, immutable
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub address: Option<String>,
    pub category_id: Option<i64>,
    pub status: PostStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Post joined with author and category name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PostView {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub post: Post,
    pub username: String,
    pub category_name: Option<String>,
}

/// Row of the caller's own post list.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub address: Option<String>,
    pub status: PostStatus,
    pub category: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub address: Option<String>,
    pub category_id: i64,
}

/// Partial edit; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub address: Option<String>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.address.is_none()
    }
}
