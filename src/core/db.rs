use crate::core::error::RosterError;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

/// Open an existing roster database. A missing file is `StoreUnavailable`,
/// never silently created.
pub fn db_connect(db_path: &Path, busy_timeout_secs: u64) -> Result<Connection, RosterError> {
    if !db_path.exists() {
        return Err(RosterError::StoreUnavailable(format!(
            "{} does not exist; run `skyroster init` first",
            db_path.display()
        )));
    }
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| unavailable(db_path, e))?;
    configure(conn, db_path, busy_timeout_secs)
}

/// Open the roster database, creating the file if needed. Only bootstrap uses this.
pub fn db_create(db_path: &Path, busy_timeout_secs: u64) -> Result<Connection, RosterError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            RosterError::StoreUnavailable(format!("{}: {}", parent.display(), e))
        })?;
    }
    let conn = Connection::open(db_path).map_err(|e| unavailable(db_path, e))?;
    configure(conn, db_path, busy_timeout_secs)
}

fn configure(
    conn: Connection,
    db_path: &Path,
    busy_timeout_secs: u64,
) -> Result<Connection, RosterError> {
    conn.busy_timeout(Duration::from_secs(busy_timeout_secs))
        .map_err(|e| unavailable(db_path, e))?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(|e| unavailable(db_path, e))?;
    conn.execute("PRAGMA foreign_keys=ON;", [])
        .map_err(|e| unavailable(db_path, e))?;
    Ok(conn)
}

fn unavailable(db_path: &Path, err: rusqlite::Error) -> RosterError {
    RosterError::StoreUnavailable(format!("{}: {}", db_path.display(), err))
}
