//! Client traits
//!
//! The helper never speaks a wire protocol itself. Everything below the
//! reconnect policy and the result shaping goes through these two traits:
//! a [`Connector`] opens sessions, a [`Session`] is one live handle.

use super::config::{ConnectionConfig, TlsConfig};
use super::database_types::DatabaseType;
use super::error::Result;
use super::value::DatabaseResult;
use async_trait::async_trait;

/// What a single statement produced
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// A result set
    Rows(DatabaseResult),
    /// A statement without a result set (INSERT, UPDATE, DDL, ...)
    Done {
        affected_rows: u64,
        last_insert_id: Option<u64>,
    },
}

impl QueryOutcome {
    /// Rows of the result set; statements without one yield no rows
    pub fn into_rows(self) -> DatabaseResult {
        match self {
            QueryOutcome::Rows(rows) => rows,
            QueryOutcome::Done { .. } => Vec::new(),
        }
    }

    /// Number of rows returned or affected
    pub fn row_count(&self) -> u64 {
        match self {
            QueryOutcome::Rows(rows) => rows.len() as u64,
            QueryOutcome::Done { affected_rows, .. } => *affected_rows,
        }
    }
}

/// Opens sessions against one kind of database
#[async_trait]
pub trait Connector: Send + Sync {
    /// Live handle produced by [`Connector::connect`]
    type Session: Session;

    /// Get the database type
    fn database_type(&self) -> DatabaseType;

    /// Open a new session
    ///
    /// `tls` is `Some` only when the configuration enables TLS; a connector
    /// must not set up any TLS state when it is `None`.
    async fn connect(
        &self,
        config: &ConnectionConfig,
        tls: Option<&TlsConfig>,
    ) -> Result<Self::Session>;
}

/// One live session to the database server
///
/// Statement errors are returned as `Err(DatabaseError::QueryError)` and also
/// recorded, so that [`Session::last_error_code`] reflects the last statement.
#[async_trait]
pub trait Session: Send {
    /// Round trip to the server; `Ok(false)` or `Err` both mean the session is unusable
    async fn ping(&mut self) -> Result<bool>;

    /// Run one SQL statement verbatim
    async fn query(&mut self, sql: &str) -> Result<QueryOutcome>;

    /// Run a string holding several statements, one outcome per statement
    async fn multi_query(&mut self, sql: &str) -> Result<Vec<QueryOutcome>>;

    /// Escape text for inclusion inside a quoted SQL string literal
    fn escape_string(&self, text: &str) -> String {
        escape_mysql_string(text)
    }

    /// Rows affected by the last statement
    fn affected_rows(&self) -> u64;

    /// Auto-increment id generated by the last statement, if any
    fn last_insert_id(&self) -> Option<u64>;

    /// Error code of the last statement, 0 when it succeeded
    fn last_error_code(&self) -> u32;

    /// Error message of the last statement
    fn last_error_message(&self) -> Option<&str>;

    /// Close the session; further calls fail
    async fn close(&mut self) -> Result<()>;
}

/// Escape a string the way MySQL's `mysql_real_escape_string` does for
/// single-byte-safe character sets.
pub fn escape_mysql_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '\0' => escaped.push_str("\\0"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\x1a' => escaped.push_str("\\Z"),
            other => escaped.push(other),
        }
    }
    escaped
}
