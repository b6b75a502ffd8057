/// Database migration runner and startup setup
///
/// This module wraps sqlx's migration system and performs the one piece of
/// seed state the schema cannot declare: the reserved anonymous account that
/// anonymized reviews are reassigned to.
///
/// # Migration Files
///
/// Migrations are stored in the `migrations/` directory of this crate.
///
/// # Example
///
/// ```no_run
/// use firmrate_shared::db::pool::{create_pool, DatabaseConfig};
/// use firmrate_shared::db::migrations::{run_migrations, ensure_anonymous_user};
/// use uuid::Uuid;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     })
///     .await?;
///
///     run_migrations(&pool).await?;
///     ensure_anonymous_user(&pool, Uuid::nil()).await?;
///
///     Ok(())
/// }
/// ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Runs all pending database migrations
///
/// # Errors
///
/// Returns an error if:
/// - A migration file is malformed
/// - A migration fails to execute
/// - Database connection is lost during migration
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Ensures the reserved anonymous account exists
///
/// Anonymized reviews are reassigned to this account instead of a NULL
/// user id, which keeps referential integrity while severing personal
/// attribution. The id comes from configuration so it is declared in one
/// place and never handed out to a real registration.
///
/// Idempotent: inserting an id that already exists is a no-op. Must run
/// after migrations, before the server starts accepting requests.
///
/// # Errors
///
/// Returns an error if the insert fails for any reason other than the
/// account already existing.
pub async fn ensure_anonymous_user(pool: &PgPool, anonymous_id: Uuid) -> Result<(), sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (id, email, name, password_hash, role)
        VALUES ($1, 'anonymous@firmrate.invalid', 'Anonym', '!', 'user')
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(anonymous_id)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        info!(%anonymous_id, "Created reserved anonymous account");
    } else {
        debug!(%anonymous_id, "Reserved anonymous account already present");
    }

    Ok(())
}

/// Creates the database if it doesn't exist
///
/// Useful for development and testing. In production the database should
/// already exist.
///
/// # Errors
///
/// Returns an error if:
/// - Cannot connect to the PostgreSQL server
/// - Database creation fails
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    info!("Checking if database exists");

    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
        info!("Database created successfully");
    } else {
        debug!("Database already exists");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    // Migration behavior needs a running database; covered by the
    // integration tests in firmrate-api/tests/.
}
