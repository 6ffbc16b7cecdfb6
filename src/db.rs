use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    config::AppConfig,
    store::{Reference, StoreError, UniqueField},
};

/// PostgreSQL-backed [`crate::store::Store`].
#[derive(Clone)]
pub struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

/// Maps unique and foreign-key violations onto typed errors; everything else
/// stays a database error.
pub(crate) fn map_err(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_foreign_key_violation() {
            let parent = match db.constraint() {
                Some("posts_user_id_fkey") | Some("comments_user_id_fkey") => Some(Reference::User),
                Some("comments_post_id_fkey") => Some(Reference::Post),
                Some("posts_category_id_fkey") => Some(Reference::Category),
                _ => None,
            };
            if let Some(parent) = parent {
                return StoreError::MissingReference(parent);
            }
        }
        if db.is_unique_violation() {
            let field = match db.constraint() {
                Some("users_email_key") => Some(UniqueField::Email),
                Some("users_username_key") => Some(UniqueField::Username),
                Some("categories_name_key") => Some(UniqueField::CategoryName),
                _ => None,
            };
            if let Some(field) = field {
                return StoreError::Conflict(field);
            }
        }
    }
    StoreError::Database(e)
}
