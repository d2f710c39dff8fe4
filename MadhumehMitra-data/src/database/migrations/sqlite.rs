use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_kv_entries_table(conn)?;
    create_kv_entries_index(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the key-value table that backs logs, profiles and preferences
fn create_kv_entries_table(conn: &Connection) -> Result<(), String> {
    info!("Creating kv_entries table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_entries (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Index on update time, used when inspecting recent writes
fn create_kv_entries_index(conn: &Connection) -> Result<(), String> {
    info!("Creating index on updated_at");

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_kv_entries_updated_at
        ON kv_entries (updated_at DESC)",
        [],
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}
