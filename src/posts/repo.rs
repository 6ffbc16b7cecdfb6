use async_trait::async_trait;

use crate::{
    db::{map_err, PgStore},
    posts::repo_types::{NewPost, Post, PostPatch, PostStatus, PostSummary, PostView},
    store::{PostStore, StoreResult},
};

const POST_VIEW_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.title, p.content, p.image, p.address, p.category_id,
           p.status, p.created_at, u.username, c.name AS category_name
      FROM posts p
      JOIN users u ON p.user_id = u.id
      LEFT JOIN categories c ON p.category_id = c.id
"#;

#[async_trait]
impl PostStore for PgStore {
    async fn insert_post(&self, post: NewPost) -> StoreResult<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (user_id, title, content, image, address, category_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            RETURNING id, user_id, title, content, image, address, category_id, status, created_at
            "#,
        )
        .bind(post.user_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.image)
        .bind(&post.address)
        .bind(post.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn find_post(&self, id: i64) -> StoreResult<Option<PostView>> {
        let sql = format!("{POST_VIEW_SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, PostView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn list_posts_by_status(&self, status: PostStatus) -> StoreResult<Vec<PostView>> {
        let sql = format!("{POST_VIEW_SELECT} WHERE p.status = $1 ORDER BY p.created_at DESC");
        sqlx::query_as::<_, PostView>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn list_posts_by_user(&self, user_id: i64) -> StoreResult<Vec<PostSummary>> {
        sqlx::query_as::<_, PostSummary>(
            r#"
            SELECT p.id, p.title, p.content, p.address, p.status, p.created_at,
                   c.name AS category
              FROM posts p
              LEFT JOIN categories c ON p.category_id = c.id
             WHERE p.user_id = $1
             ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> StoreResult<bool> {
        let res = sqlx::query(
            r#"
            UPDATE posts
               SET title   = COALESCE($1, title),
                   content = COALESCE($2, content),
                   address = COALESCE($3, address)
             WHERE id = $4
            "#,
        )
        .bind(patch.title)
        .bind(patch.content)
        .bind(patch.address)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(res.rows_affected() > 0)
    }

    async fn set_post_status(&self, id: i64, status: PostStatus) -> StoreResult<bool> {
        let res = sqlx::query("UPDATE posts SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_post(&self, id: i64) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(res.rows_affected() > 0)
    }
}
