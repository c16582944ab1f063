use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::db::Repository;
use crate::models::{Member, TrackedProduct};
use crate::utils::error::{AppError, Result};

/// SQLite-backed repository. All statements are parameterized; values are
/// never interpolated into query text.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout))
            .connect(&config.url)
            .await?;

        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS members (
                id            TEXT PRIMARY KEY,
                name          TEXT NOT NULL,
                email         TEXT NOT NULL,
                password_hash TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tracked_products (
                id            TEXT PRIMARY KEY,
                member_id     TEXT NOT NULL REFERENCES members(id),
                name          TEXT NOT NULL,
                url           TEXT NOT NULL,
                current_price INTEGER NOT NULL,
                target_price  INTEGER NOT NULL,
                last_checked  TEXT,
                image_url     TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn product_not_found(product_id: &str) -> AppError {
        AppError::NotFound {
            resource: format!("tracked product {}", product_id),
        }
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn list_products(&self) -> Result<Vec<TrackedProduct>> {
        let products = sqlx::query_as::<_, TrackedProduct>(
            "SELECT id, member_id, name, url, current_price, target_price, last_checked, image_url \
             FROM tracked_products ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn get_product(&self, product_id: &str) -> Result<TrackedProduct> {
        sqlx::query_as::<_, TrackedProduct>(
            "SELECT id, member_id, name, url, current_price, target_price, last_checked, image_url \
             FROM tracked_products WHERE id = ?",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Self::product_not_found(product_id))
    }

    async fn insert_product(&self, product: &TrackedProduct) -> Result<()> {
        sqlx::query(
            "INSERT INTO tracked_products \
             (id, member_id, name, url, current_price, target_price, last_checked, image_url) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.id)
        .bind(&product.member_id)
        .bind(&product.name)
        .bind(&product.url)
        .bind(product.current_price)
        .bind(product.target_price)
        .bind(product.last_checked)
        .bind(&product.image_url)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_product(&self, product: &TrackedProduct) -> Result<()> {
        let result = sqlx::query(
            "UPDATE tracked_products \
             SET name = ?, url = ?, current_price = ?, target_price = ?, image_url = ? \
             WHERE id = ?",
        )
        .bind(&product.name)
        .bind(&product.url)
        .bind(product.current_price)
        .bind(product.target_price)
        .bind(&product.image_url)
        .bind(&product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Self::product_not_found(&product.id));
        }
        Ok(())
    }

    async fn update_price(
        &self,
        product_id: &str,
        price: i64,
        checked_at: NaiveDateTime,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE tracked_products SET current_price = ?, last_checked = ? WHERE id = ?",
        )
        .bind(price)
        .bind(checked_at)
        .bind(product_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Self::product_not_found(product_id));
        }
        Ok(())
    }

    async fn touch_last_checked(&self, product_id: &str, checked_at: NaiveDateTime) -> Result<()> {
        let result = sqlx::query("UPDATE tracked_products SET last_checked = ? WHERE id = ?")
            .bind(checked_at)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::product_not_found(product_id));
        }
        Ok(())
    }

    async fn delete_product(&self, product_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM tracked_products WHERE id = ?")
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::product_not_found(product_id));
        }
        Ok(())
    }

    async fn get_member(&self, member_id: &str) -> Result<Member> {
        sqlx::query_as::<_, Member>(
            "SELECT id, name, email, password_hash FROM members WHERE id = ?",
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound {
            resource: format!("member {}", member_id),
        })
    }

    async fn insert_member(&self, member: &Member) -> Result<()> {
        sqlx::query("INSERT INTO members (id, name, email, password_hash) VALUES (?, ?, ?, ?)")
            .bind(&member.id)
            .bind(&member.name)
            .bind(&member.email)
            .bind(&member.password_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
