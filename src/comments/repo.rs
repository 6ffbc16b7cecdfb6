use async_trait::async_trait;

use crate::{
    comments::repo_types::CommentView,
    db::{map_err, PgStore},
    store::{CommentStore, StoreResult},
};

const COMMENT_VIEW_SELECT: &str = r#"
    SELECT c.id, c.post_id, c.user_id, c.content, c.created_at, u.username
      FROM comments c
      JOIN users u ON c.user_id = u.id
"#;

#[async_trait]
impl CommentStore for PgStore {
    async fn insert_comment(
        &self,
        post_id: i64,
        user_id: i64,
        content: &str,
    ) -> StoreResult<CommentView> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO comments (post_id, user_id, content) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)?;

        let sql = format!("{COMMENT_VIEW_SELECT} WHERE c.id = $1");
        sqlx::query_as::<_, CommentView>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn find_comment(&self, id: i64) -> StoreResult<Option<CommentView>> {
        let sql = format!("{COMMENT_VIEW_SELECT} WHERE c.id = $1");
        sqlx::query_as::<_, CommentView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn list_comments_by_post(&self, post_id: i64) -> StoreResult<Vec<CommentView>> {
        let sql = format!("{COMMENT_VIEW_SELECT} WHERE c.post_id = $1 ORDER BY c.created_at DESC");
        sqlx::query_as::<_, CommentView>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn delete_comment(&self, id: i64) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(res.rows_affected() > 0)
    }
}
