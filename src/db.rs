use std::time::Duration;

use migration::Migrator;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;

use crate::error::AppResult;

const PRAGMAS: &[&str] =
    &["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL", "PRAGMA cache_size=-64000"];

// Keeps the single in-memory connection from being recycled, which would drop the database.
const MEMORY_CONN_LIFETIME: Duration = Duration::from_secs(365 * 86_400);

pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    let in_memory = is_in_memory(database_url);

    let mut opts = ConnectOptions::new(database_url.to_string());
    opts.sqlx_logging(false);
    if in_memory {
        // Every pooled connection would otherwise open its own empty database.
        opts.max_connections(1)
            .min_connections(1)
            .idle_timeout(MEMORY_CONN_LIFETIME)
            .max_lifetime(MEMORY_CONN_LIFETIME);
    }

    let db = Database::connect(opts).await?;

    if !in_memory {
        for pragma in PRAGMAS {
            db.execute(Statement::from_string(db.get_database_backend(), pragma.to_string()))
                .await?;
        }
    }

    Migrator::up(&db, None).await?;
    tracing::debug!(in_memory, "database ready");
    Ok(db)
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
