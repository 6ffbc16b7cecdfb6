use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::{
    CategoryStore, CommentStore, PostStore, Reference, StoreError, StoreResult, UniqueField,
    UserStore,
};
use crate::{
    auth::claims::Role,
    categories::repo_types::Category,
    comments::repo_types::{Comment, CommentView},
    posts::repo_types::{NewPost, Post, PostPatch, PostStatus, PostSummary, PostView},
    users::repo_types::{NewUser, ProfileUpdate, User},
};

#[derive(Default)]
struct Tables {
    seq: i64,
    users: Vec<User>,
    categories: Vec<Category>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.seq += 1;
        self.seq
    }

    fn post_view(&self, post: &Post) -> PostView {
        PostView {
            post: post.clone(),
            username: self.username(post.user_id),
            category_name: post
                .category_id
                .and_then(|cid| self.categories.iter().find(|c| c.id == cid))
                .map(|c| c.name.clone()),
        }
    }

    fn comment_view(&self, comment: &Comment) -> CommentView {
        CommentView {
            comment: comment.clone(),
            username: self.username(comment.user_id),
        }
    }

    fn username(&self, user_id: i64) -> String {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }
}

/// In-process store with the same uniqueness, foreign-key and cascade rules as
/// the schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.lock();
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(UniqueField::Email));
        }
        if t.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(UniqueField::Username));
        }
        let row = User {
            id: t.next_id(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            full_name: None,
            phone: None,
            address: None,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(row.clone());
        Ok(row)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.lock().users.clone())
    }

    async fn update_profile(&self, id: i64, profile: ProfileUpdate) -> StoreResult<bool> {
        let mut t = self.lock();
        let Some(user) = t.users.iter_mut().find(|u| u.id == id) else {
            return Ok(false);
        };
        user.full_name = profile.full_name;
        user.phone = profile.phone;
        user.address = profile.address;
        Ok(true)
    }

    async fn set_role(&self, id: i64, role: Role) -> StoreResult<bool> {
        let mut t = self.lock();
        let Some(user) = t.users.iter_mut().find(|u| u.id == id) else {
            return Ok(false);
        };
        user.role = role;
        Ok(true)
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let mut t = self.lock();
        let before = t.users.len();
        t.users.retain(|u| u.id != id);
        if t.users.len() == before {
            return Ok(false);
        }
        let owned_posts: Vec<i64> = t
            .posts
            .iter()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        t.posts.retain(|p| p.user_id != id);
        t.comments
            .retain(|c| c.user_id != id && !owned_posts.contains(&c.post_id));
        Ok(true)
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let mut rows = self.lock().categories.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        Ok(self.lock().categories.iter().find(|c| c.name == name).cloned())
    }

    async fn insert_category(&self, name: &str) -> StoreResult<Category> {
        let mut t = self.lock();
        if t.categories.iter().any(|c| c.name == name) {
            return Err(StoreError::Conflict(UniqueField::CategoryName));
        }
        let row = Category {
            id: t.next_id(),
            name: name.to_string(),
        };
        t.categories.push(row.clone());
        Ok(row)
    }

    async fn rename_category(&self, id: i64, name: &str) -> StoreResult<Option<Category>> {
        let mut t = self.lock();
        if t.categories.iter().any(|c| c.name == name && c.id != id) {
            return Err(StoreError::Conflict(UniqueField::CategoryName));
        }
        let Some(cat) = t.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        cat.name = name.to_string();
        Ok(Some(cat.clone()))
    }

    async fn delete_category(&self, id: i64) -> StoreResult<bool> {
        let mut t = self.lock();
        let before = t.categories.len();
        t.categories.retain(|c| c.id != id);
        if t.categories.len() == before {
            return Ok(false);
        }
        for p in t.posts.iter_mut().filter(|p| p.category_id == Some(id)) {
            p.category_id = None;
        }
        Ok(true)
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, post: NewPost) -> StoreResult<Post> {
        let mut t = self.lock();
        if !t.users.iter().any(|u| u.id == post.user_id) {
            return Err(StoreError::MissingReference(Reference::User));
        }
        if !t.categories.iter().any(|c| c.id == post.category_id) {
            return Err(StoreError::MissingReference(Reference::Category));
        }
        let row = Post {
            id: t.next_id(),
            user_id: post.user_id,
            title: post.title,
            content: post.content,
            image: post.image,
            address: post.address,
            category_id: Some(post.category_id),
            status: PostStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
        };
        t.posts.push(row.clone());
        Ok(row)
    }

    async fn find_post(&self, id: i64) -> StoreResult<Option<PostView>> {
        let t = self.lock();
        Ok(t.posts.iter().find(|p| p.id == id).map(|p| t.post_view(p)))
    }

    async fn list_posts_by_status(&self, status: PostStatus) -> StoreResult<Vec<PostView>> {
        let t = self.lock();
        Ok(t.posts
            .iter()
            .rev()
            .filter(|p| p.status == status)
            .map(|p| t.post_view(p))
            .collect())
    }

    async fn list_posts_by_user(&self, user_id: i64) -> StoreResult<Vec<PostSummary>> {
        let t = self.lock();
        Ok(t.posts
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .map(|p| PostSummary {
                id: p.id,
                title: p.title.clone(),
                content: p.content.clone(),
                address: p.address.clone(),
                status: p.status,
                category: t.post_view(p).category_name,
                created_at: p.created_at,
            })
            .collect())
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> StoreResult<bool> {
        let mut t = self.lock();
        let Some(post) = t.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(address) = patch.address {
            post.address = Some(address);
        }
        Ok(true)
    }

    async fn set_post_status(&self, id: i64, status: PostStatus) -> StoreResult<bool> {
        let mut t = self.lock();
        let Some(post) = t.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        post.status = status;
        Ok(true)
    }

    async fn delete_post(&self, id: i64) -> StoreResult<bool> {
        let mut t = self.lock();
        let before = t.posts.len();
        t.posts.retain(|p| p.id != id);
        t.comments.retain(|c| c.post_id != id);
        Ok(t.posts.len() != before)
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn insert_comment(
        &self,
        post_id: i64,
        user_id: i64,
        content: &str,
    ) -> StoreResult<CommentView> {
        let mut t = self.lock();
        if !t.posts.iter().any(|p| p.id == post_id) {
            return Err(StoreError::MissingReference(Reference::Post));
        }
        if !t.users.iter().any(|u| u.id == user_id) {
            return Err(StoreError::MissingReference(Reference::User));
        }
        let row = Comment {
            id: t.next_id(),
            post_id,
            user_id,
            content: content.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        t.comments.push(row.clone());
        Ok(t.comment_view(&row))
    }

    async fn find_comment(&self, id: i64) -> StoreResult<Option<CommentView>> {
        let t = self.lock();
        Ok(t.comments
            .iter()
            .find(|c| c.id == id)
            .map(|c| t.comment_view(c)))
    }

    async fn list_comments_by_post(&self, post_id: i64) -> StoreResult<Vec<CommentView>> {
        let t = self.lock();
        Ok(t.comments
            .iter()
            .rev()
            .filter(|c| c.post_id == post_id)
            .map(|c| t.comment_view(c))
            .collect())
    }

    async fn delete_comment(&self, id: i64) -> StoreResult<bool> {
        let mut t = self.lock();
        let before = t.comments.len();
        t.comments.retain(|c| c.id != id);
        Ok(t.comments.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            username: name.into(),
            email: email.into(),
            password_hash: "x".into(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn enforces_unique_email_and_username() {
        let store = MemoryStore::new();
        store.insert_user(new_user("a", "a@x.com")).await.unwrap();

        let err = store.insert_user(new_user("b", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(UniqueField::Email)));

        let err = store.insert_user(new_user("a", "b@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(UniqueField::Username)));
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_posts_and_comments() {
        let store = MemoryStore::new();
        let alice = store.insert_user(new_user("alice", "a@x.com")).await.unwrap();
        let bob = store.insert_user(new_user("bob", "b@x.com")).await.unwrap();
        let cat = store.insert_category("Errands").await.unwrap();
        let post = store
            .insert_post(NewPost {
                user_id: alice.id,
                title: "t".into(),
                content: "c".into(),
                image: None,
                address: None,
                category_id: cat.id,
            })
            .await
            .unwrap();
        let comment = store.insert_comment(post.id, bob.id, "hi").await.unwrap();

        assert!(store.delete_user(alice.id).await.unwrap());
        assert!(store.find_post(post.id).await.unwrap().is_none());
        assert!(store.find_comment(comment.comment.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_rows_pointing_at_missing_parents() {
        let store = MemoryStore::new();
        let alice = store.insert_user(new_user("alice", "a@x.com")).await.unwrap();
        let cat = store.insert_category("Errands").await.unwrap();
        let new_post = |user_id, category_id| NewPost {
            user_id,
            title: "t".into(),
            content: "c".into(),
            image: None,
            address: None,
            category_id,
        };

        let err = store.insert_post(new_post(999, cat.id)).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(Reference::User)));
        let err = store.insert_post(new_post(alice.id, 999)).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(Reference::Category)));

        let post = store.insert_post(new_post(alice.id, cat.id)).await.unwrap();
        let err = store.insert_comment(999, alice.id, "hi").await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(Reference::Post)));
        let err = store.insert_comment(post.id, 999, "hi").await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(Reference::User)));
    }
}
