use crate::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let url = config
        .resolved_url()
        .ok_or_else(|| sqlx::Error::Configuration("database.url / DATABASE_URL not set".into()))?;

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&url)
        .await
}

pub async fn health_check(pool: &PgPool) -> Result<String, sqlx::Error> {
    let row: (String,) = sqlx::query_as("SELECT version()").fetch_one(pool).await?;
    Ok(row.0)
}

/// Create the `conversations` table if missing. Safe to run on every start.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS conversations (
            id         BIGSERIAL PRIMARY KEY,
            name       TEXT NOT NULL,
            summary    TEXT NOT NULL,
            context    TEXT NOT NULL,
            draft      JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
