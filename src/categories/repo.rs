use async_trait::async_trait;

use crate::{
    categories::repo_types::Category,
    db::{map_err, PgStore},
    store::{CategoryStore, StoreResult},
};

#[async_trait]
impl CategoryStore for PgStore {
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn insert_category(&self, name: &str) -> StoreResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn rename_category(&self, id: i64, name: &str) -> StoreResult<Option<Category>> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn delete_category(&self, id: i64) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(res.rows_affected() > 0)
    }
}
