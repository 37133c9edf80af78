use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS applications (
        id            UUID PRIMARY KEY,
        status        TEXT NOT NULL DEFAULT 'DRAFT',
        data          TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL,
        updated_at    TIMESTAMPTZ NOT NULL,
        submitted_at  TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS applications_status_created_idx ON applications (status, created_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS uploads (
        id              UUID PRIMARY KEY,
        application_id  UUID NOT NULL REFERENCES applications (id) ON DELETE CASCADE,
        filename        TEXT NOT NULL,
        mime_type       TEXT NOT NULL,
        size            BIGINT NOT NULL,
        category        TEXT NOT NULL,
        storage_path    TEXT NOT NULL,
        uploaded_at     TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS uploads_application_idx ON uploads (application_id, uploaded_at DESC)",
];

/// Creates the tables if they do not exist yet. Safe to run on every start.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema verified");
    Ok(())
}
