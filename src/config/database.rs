//! Database configuration module for `GarageBuddy`.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema (including foreign keys) always matches the Rust models.

use crate::entities::{Customer, OrderHistory, OrderPart, Part, ServiceOrder, Vehicle};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/garage_buddy.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back to
/// a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Creates the parent directory of a file-backed `SQLite` URL so the driver can create
/// the database file. In-memory URLs are left alone.
fn ensure_sqlite_directory(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.contains(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        debug!("Ensuring database directory {:?} exists", parent);
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
#[instrument]
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    ensure_sqlite_directory(&database_url)?;

    let db = Database::connect(&database_url).await?;
    info!("Connected to database");
    Ok(db)
}

/// Creates every table that does not exist yet.
///
/// Parents are created before the tables that reference them: customers, vehicles,
/// parts, service orders, part usages, status history.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        schema.create_table_from_entity(Customer),
        schema.create_table_from_entity(Vehicle),
        schema.create_table_from_entity(Part),
        schema.create_table_from_entity(ServiceOrder),
        schema.create_table_from_entity(OrderPart),
        schema.create_table_from_entity(OrderHistory),
    ];

    for mut table in tables {
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }

    debug!("Database tables ensured");
    Ok(())
}
