use serde::{Deserialize, Serialize};

use crate::posts::repo_types::{Post, PostPatch, PostView};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    /// Category name, not id.
    pub category: String,
    pub address: Option<String>,
    /// Path or URL of an already-stored image.
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub address: Option<String>,
}

impl From<UpdatePostRequest> for PostPatch {
    /// Blank strings count as "not provided".
    fn from(r: UpdatePostRequest) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        PostPatch {
            title: keep(r.title),
            content: keep(r.content),
            address: keep(r.address),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedPostResponse {
    pub message: &'static str,
    pub post: Post,
}

#[derive(Debug, Serialize)]
pub struct PostStatusResponse {
    pub message: &'static str,
    pub post: PostView,
}
