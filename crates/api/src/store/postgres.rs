//! `PostgreSQL` document store.
//!
//! # Schema
//!
//! All logical tables share `store.document (collection, key, body JSONB)`.
//! Scans page through a collection in key order (keyset pagination), so the
//! cursor is simply the last key returned.
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p mini-shop-cli -- migrate
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use tracing::debug;

use mini_shop_core::Document;

use super::{Cursor, DocumentStore, Result, ScanPage, ScanRequest, Table};

/// Embedded migrations for the `store` schema.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> std::result::Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// `PostgreSQL` implementation of `DocumentStore`.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn scan(&self, table: &Table, request: ScanRequest) -> Result<ScanPage> {
        let after = request
            .cursor
            .as_ref()
            .map(|cursor| cursor.start_key(table))
            .transpose()?;

        // Fetch one extra row to learn whether another page exists.
        let limit = i64::from(request.limit);
        let mut rows: Vec<(String, Json<Document>)> = sqlx::query_as(
            r"
            SELECT key, body
            FROM store.document
            WHERE collection = $1
              AND ($2::text IS NULL OR key > $2)
            ORDER BY key
            LIMIT $3
            ",
        )
        .bind(&table.name)
        .bind(after)
        .bind(limit + 1)
        .fetch_all(&self.pool)
        .await?;

        let has_more = rows.len() > request.limit as usize;
        rows.truncate(request.limit as usize);

        let next = match rows.last() {
            Some((last_key, _)) if has_more => Some(Cursor::after_key(table, last_key)?),
            _ => None,
        };

        let items: Vec<Document> = rows.into_iter().map(|(_, Json(body))| body).collect();
        debug!(
            table = %table.name,
            count = items.len(),
            more = next.is_some(),
            "Scanned postgres page"
        );

        Ok(ScanPage { items, next })
    }

    async fn get(&self, table: &Table, key: &str) -> Result<Option<Document>> {
        let row: Option<(Json<Document>,)> = sqlx::query_as(
            r"
            SELECT body
            FROM store.document
            WHERE collection = $1 AND key = $2
            ",
        )
        .bind(&table.name)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(Json(body),)| body))
    }

    async fn put(&self, table: &Table, item: Document) -> Result<()> {
        let key = table.key_of(&item)?.to_string();

        sqlx::query(
            r"
            INSERT INTO store.document (collection, key, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, key)
            DO UPDATE SET body = EXCLUDED.body, updated_at = now()
            ",
        )
        .bind(&table.name)
        .bind(&key)
        .bind(Json(&item))
        .execute(&self.pool)
        .await?;

        debug!(table = %table.name, key = %key, "Stored item in postgres");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
