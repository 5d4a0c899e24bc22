use crate::core::db;
use crate::core::error::RosterError;
use crate::core::output::{self, Tabular};
use crate::core::store::Store;
use crate::core::time;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

pub const AUDIT_LOG_NAME: &str = "roster.events.jsonl";

/// The DB Broker is the single path to the roster database.
/// Every operation gets a fresh connection that is dropped on return, and every
/// write runs inside one transaction that either commits or rolls back whole.
pub struct DbBroker {
    db_path: PathBuf,
    audit_log_path: Option<PathBuf>,
    actor: String,
    busy_timeout_secs: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BrokerEvent {
    pub ts: String,
    pub event_id: String,
    pub actor: String,
    pub op: String,
    pub db_id: String,
    pub status: String,
}

impl Tabular for BrokerEvent {
    fn headers() -> &'static [&'static str] {
        &["ts", "eventID", "actor", "op", "db", "status"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.ts.clone(),
            self.event_id.clone(),
            self.actor.clone(),
            self.op.clone(),
            self.db_id.clone(),
            self.status.clone(),
        ]
    }
}

impl DbBroker {
    pub fn new(store: &Store) -> Self {
        let audit_log_path = store
            .config
            .audit_log
            .then(|| store.root.join(AUDIT_LOG_NAME));
        Self {
            db_path: store.db_path(),
            audit_log_path,
            actor: store.config.actor.clone(),
            busy_timeout_secs: store.config.busy_timeout_secs,
        }
    }

    /// Run a read-only closure against the database.
    pub fn with_read<F, R>(&self, op_name: &str, f: F) -> Result<R, RosterError>
    where
        F: FnOnce(&Connection) -> Result<R, RosterError>,
    {
        let result =
            db::db_connect(&self.db_path, self.busy_timeout_secs).and_then(|conn| f(&conn));
        self.finish(op_name, result)
    }

    /// Run a write closure inside a single transaction.
    pub fn with_write<F, R>(&self, op_name: &str, f: F) -> Result<R, RosterError>
    where
        F: FnOnce(&Connection) -> Result<R, RosterError>,
    {
        let conn = db::db_connect(&self.db_path, self.busy_timeout_secs);
        let result = conn.and_then(|mut conn| in_transaction(&mut conn, f));
        self.finish(op_name, result)
    }

    /// Like `with_write`, but creates the database file when it does not exist yet.
    pub fn with_bootstrap<F, R>(&self, op_name: &str, f: F) -> Result<R, RosterError>
    where
        F: FnOnce(&Connection) -> Result<R, RosterError>,
    {
        let conn = db::db_create(&self.db_path, self.busy_timeout_secs);
        let result = conn.and_then(|mut conn| in_transaction(&mut conn, f));
        self.finish(op_name, result)
    }

    /// Record the outcome. An audit failure is printed as a warning and never
    /// replaces the operation's result.
    fn finish<R>(
        &self,
        op_name: &str,
        result: Result<R, RosterError>,
    ) -> Result<R, RosterError> {
        let status = if result.is_ok() { "success" } else { "error" };
        if let Err(err) = self.log_event(op_name, status) {
            output::print_warning(&format!("audit event for {} not recorded: {}", op_name, err));
        }
        result
    }

    fn log_event(&self, op: &str, status: &str) -> Result<(), RosterError> {
        let Some(audit_log_path) = &self.audit_log_path else {
            return Ok(());
        };
        let db_id = self
            .db_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let ev = BrokerEvent {
            ts: time::now_epoch_z(),
            event_id: time::new_event_id(),
            actor: self.actor.clone(),
            op: op.to_string(),
            db_id,
            status: status.to_string(),
        };

        if let Some(parent) = audit_log_path.parent() {
            std::fs::create_dir_all(parent).map_err(RosterError::IoError)?;
        }
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(audit_log_path)
            .map_err(RosterError::IoError)?;
        let line = serde_json::to_string(&ev)
            .map_err(|e| RosterError::IoError(std::io::Error::other(e)))?;
        writeln!(f, "{}", line).map_err(RosterError::IoError)?;
        Ok(())
    }
}

/// Commit when the closure succeeds; dropping the transaction on error rolls it back.
fn in_transaction<F, R>(conn: &mut Connection, f: F) -> Result<R, RosterError>
where
    F: FnOnce(&Connection) -> Result<R, RosterError>,
{
    let tx = conn.transaction().map_err(RosterError::RusqliteError)?;
    let value = f(&tx)?;
    tx.commit().map_err(RosterError::from_write)?;
    Ok(value)
}

/// Read back the audit log, oldest first.
pub fn read_audit_log(store: &Store) -> Result<Vec<BrokerEvent>, RosterError> {
    let path = store.root.join(AUDIT_LOG_NAME);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path).map_err(RosterError::IoError)?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|e| {
                RosterError::InvalidInput(format!("corrupt audit line in {}: {}", path.display(), e))
            })
        })
        .collect()
}
