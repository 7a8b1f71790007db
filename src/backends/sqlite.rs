//! SQLite backend
//!
//! Runs rusqlite on tokio's blocking pool. Useful for local tools and for
//! exercising the helper without a server.

use crate::core::{
    config::{ConnectionConfig, TlsConfig},
    database::{Connector, QueryOutcome, Session},
    database_types::DatabaseType,
    error::{DatabaseError, Result},
    value::{DatabaseRow, DatabaseValue},
};
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection, Row};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default timeout for database operations (30 seconds)
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Generic SQLite error code reported when rusqlite gives none
const SQLITE_ERROR: u32 = 1;

/// Opens SQLite sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteConnector;

impl SqliteConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for SqliteConnector {
    type Session = SqliteSession;

    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    async fn connect(
        &self,
        config: &ConnectionConfig,
        tls: Option<&TlsConfig>,
    ) -> Result<SqliteSession> {
        if tls.is_some() {
            return Err(DatabaseError::unsupported("TLS is not available for SQLite"));
        }

        let path = config.database().unwrap_or(":memory:").to_string();
        debug!(path = %path, "opening SQLite database");

        let conn = run_blocking(
            move || -> Result<Connection> {
                let conn = Connection::open(&path)?;
                conn.execute("PRAGMA foreign_keys = ON", [])?;
                Ok(conn)
            },
            DatabaseError::connection_timeout,
        )
        .await?;

        Ok(SqliteSession {
            connection: Some(Arc::new(Mutex::new(conn))),
            affected_rows: 0,
            last_insert_id: None,
            last_error: None,
        })
    }
}

/// One open SQLite connection
pub struct SqliteSession {
    connection: Option<Arc<Mutex<Connection>>>,
    affected_rows: u64,
    last_insert_id: Option<u64>,
    last_error: Option<(u32, String)>,
}

impl SqliteSession {
    fn handle(&self) -> Result<Arc<Mutex<Connection>>> {
        self.connection
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| DatabaseError::connection("Not connected to database"))
    }

    /// Convert a rusqlite Row to a DatabaseRow
    fn row_to_database_row(row: &Row) -> rusqlite::Result<DatabaseRow> {
        let mut db_row = DatabaseRow::new();
        let column_count = row.as_ref().column_count();

        for i in 0..column_count {
            let column_name = row.as_ref().column_name(i)?.to_string();
            let value = match row.get_ref(i)? {
                rusqlite::types::ValueRef::Null => DatabaseValue::Null,
                rusqlite::types::ValueRef::Integer(v) => DatabaseValue::Long(v),
                rusqlite::types::ValueRef::Real(v) => DatabaseValue::Double(v),
                rusqlite::types::ValueRef::Text(v) => {
                    DatabaseValue::String(String::from_utf8_lossy(v).to_string())
                }
                rusqlite::types::ValueRef::Blob(v) => DatabaseValue::Bytes(v.to_vec()),
            };
            db_row.insert(column_name, value);
        }

        Ok(db_row)
    }

    /// Record the statement's result in the session's last-statement state
    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Ok(value)
            }
            Err(DatabaseError::SqliteError(e)) => {
                let code = sqlite_error_code(&e);
                let message = e.to_string();
                self.affected_rows = 0;
                self.last_error = Some((code, message.clone()));
                Err(DatabaseError::query(code, message))
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl Session for SqliteSession {
    async fn ping(&mut self) -> Result<bool> {
        let handle = self.handle()?;
        run_blocking(
            move || -> Result<bool> {
                let conn = handle.lock();
                let one: i64 = conn.query_row("SELECT 1", [], |r| r.get(0))?;
                Ok(one == 1)
            },
            DatabaseError::query_timeout,
        )
        .await
    }

    async fn query(&mut self, sql: &str) -> Result<QueryOutcome> {
        let handle = self.handle()?;
        let sql = sql.to_string();
        let result = run_blocking(
            move || -> Result<QueryOutcome> {
                let conn = handle.lock();
                let mut stmt = conn.prepare(&sql)?;
                if stmt.column_count() > 0 {
                    let rows = stmt.query_map([], Self::row_to_database_row)?;
                    let mut results = Vec::new();
                    for row_result in rows {
                        results.push(row_result?);
                    }
                    Ok(QueryOutcome::Rows(results))
                } else {
                    let affected = stmt.execute([])?;
                    let last_id = conn.last_insert_rowid();
                    Ok(QueryOutcome::Done {
                        affected_rows: affected as u64,
                        last_insert_id: u64::try_from(last_id).ok().filter(|id| *id > 0),
                    })
                }
            },
            DatabaseError::query_timeout,
        )
        .await;

        let outcome = self.record(result)?;
        match &outcome {
            QueryOutcome::Rows(rows) => self.affected_rows = rows.len() as u64,
            QueryOutcome::Done {
                affected_rows,
                last_insert_id,
            } => {
                self.affected_rows = *affected_rows;
                if last_insert_id.is_some() {
                    self.last_insert_id = *last_insert_id;
                }
            }
        }
        Ok(outcome)
    }

    async fn multi_query(&mut self, sql: &str) -> Result<Vec<QueryOutcome>> {
        let handle = self.handle()?;
        let sql = sql.to_string();
        let result = run_blocking(
            move || -> Result<u64> {
                let conn = handle.lock();
                conn.execute_batch(&sql)?;
                Ok(conn.changes() as u64)
            },
            DatabaseError::query_timeout,
        )
        .await;

        let affected = self.record(result)?;
        self.affected_rows = affected;
        Ok(vec![QueryOutcome::Done {
            affected_rows: affected,
            last_insert_id: None,
        }])
    }

    fn escape_string(&self, text: &str) -> String {
        text.replace('\'', "''")
    }

    fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    fn last_insert_id(&self) -> Option<u64> {
        self.last_insert_id
    }

    fn last_error_code(&self) -> u32 {
        self.last_error.as_ref().map_or(0, |(code, _)| *code)
    }

    fn last_error_message(&self) -> Option<&str> {
        self.last_error.as_ref().map(|(_, message)| message.as_str())
    }

    async fn close(&mut self) -> Result<()> {
        self.connection = None;
        Ok(())
    }
}

fn sqlite_error_code(e: &rusqlite::Error) -> u32 {
    match e {
        rusqlite::Error::SqliteFailure(err, _) => err.extended_code as u32,
        _ => SQLITE_ERROR,
    }
}

/// Offload blocking work to the blocking pool, aborting it on timeout
async fn run_blocking<T, F>(work: F, on_timeout: fn(u64) -> DatabaseError) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let mut task = tokio::task::spawn_blocking(work);

    tokio::select! {
        result = &mut task => {
            result.map_err(|e| DatabaseError::other(format!("Task join error: {}", e)))?
        }
        _ = tokio::time::sleep(DEFAULT_OPERATION_TIMEOUT) => {
            task.abort();
            Err(on_timeout(DEFAULT_OPERATION_TIMEOUT.as_millis() as u64))
        }
    }
}
