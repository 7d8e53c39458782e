use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;

use super::{LedgerStore, StoreError};
use crate::models::Table;

/// Postgres-backed store: one `ledger_tables` row per logical table.
#[derive(Debug, Clone)]
pub struct PgTableStore {
    pool: PgPool,
}

impl PgTableStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, verify connectivity and apply migrations.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LedgerStore for PgTableStore {
    async fn read_table(&self, name: &str) -> Result<Table, StoreError> {
        let row: Option<(Json<Table>,)> =
            sqlx::query_as("SELECT payload FROM ledger_tables WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(Json(table),)| table)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn write_table(&self, name: &str, table: &Table) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO ledger_tables (name, payload, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (name) DO UPDATE SET payload = $2, updated_at = NOW()
            "#,
        )
        .bind(name)
        .bind(Json(table))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
