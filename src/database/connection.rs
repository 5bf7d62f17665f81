use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager, Pool, PooledConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;

/// Type alias for PostgreSQL connection pool
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Type alias for pooled connection
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// Migrations compiled into the binary, applied at startup
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    ConnectionPoolError(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Diesel error: {0}")]
    DieselError(#[from] diesel::result::Error),
}

/// Establish the application connection pool and bring the schema up to
/// date. Any failure here is fatal to startup.
pub fn establish_connection_pool(
    database_url: &str,
    pool_size: u32,
) -> Result<PgPool, DatabaseError> {
    tracing::info!("Establishing database connection pool...");

    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(pool_size)
        .build(manager)
        .map_err(|e| DatabaseError::ConnectionPoolError(e.to_string()))?;

    tracing::info!("Database pool created with max size: {}", pool_size);

    // Test a connection and run pending migrations on it
    let mut conn = get_conn(&pool)?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    if applied.is_empty() {
        tracing::info!("Database schema is up to date");
    } else {
        tracing::info!("Applied {} pending migration(s)", applied.len());
    }

    Ok(pool)
}

/// Check a connection out of the pool
pub fn get_conn(pool: &PgPool) -> Result<PgPooledConnection, DatabaseError> {
    pool.get()
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))
}
