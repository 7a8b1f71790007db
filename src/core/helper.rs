//! Convenience façade over one managed connection
//!
//! Every data-access method first acquires a live session from the
//! [`ConnectionManager`], so a stale connection is replaced before the query
//! goes out. Failing to connect is always an `Err`. What happens when the
//! statement itself fails depends on the method:
//!
//! - [`DatabaseHelper::execute`] and [`DatabaseHelper::multi_execute`] return `Ok(false)`
//! - [`DatabaseHelper::fetch_one`] returns `Ok(None)`
//! - everything else returns `Err(DatabaseError::QueryError)`

use super::config::ConnectionConfig;
use super::database::{Connector, QueryOutcome, Session};
use super::error::Result;
use super::manager::{ConnectionManager, ConnectionState};
use super::shaper::{FieldSpec, ResultShaper, Shaped};
use super::value::DatabaseRow;
use tracing::{debug, warn};

/// Counters returned by [`DatabaseHelper::fetch_each`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationCount {
    /// Rows handed to the callback
    pub processed: usize,
    /// Rows for which the callback returned `true`
    pub succeeded: usize,
}

impl IterationCount {
    /// True when the query produced no rows
    pub fn is_empty(&self) -> bool {
        self.processed == 0
    }
}

/// Query helpers on top of a lazily reconnecting connection
pub struct DatabaseHelper<C: Connector> {
    manager: ConnectionManager<C>,
}

impl<C: Connector> DatabaseHelper<C> {
    /// Create a helper; the first query opens the connection
    pub fn new(connector: C, config: ConnectionConfig) -> Self {
        Self {
            manager: ConnectionManager::new(connector, config),
        }
    }

    /// Open the connection now instead of on first use
    pub async fn connect(&mut self) -> Result<()> {
        self.manager.ensure_connected(true).await
    }

    /// Close the connection; the next query reconnects
    pub async fn close(&mut self) {
        self.manager.disconnect().await;
    }

    pub fn manager(&self) -> &ConnectionManager<C> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ConnectionManager<C> {
        &mut self.manager
    }

    pub fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    /// Run one statement and return what it produced
    pub async fn query(&mut self, sql: &str) -> Result<QueryOutcome> {
        let session = self.manager.acquire().await?;
        session.query(sql).await
    }

    /// Run one statement; `Ok(false)` if the server rejected it
    pub async fn execute(&mut self, sql: &str) -> Result<bool> {
        let session = self.manager.acquire().await?;
        match session.query(sql).await {
            Ok(_) => Ok(session.last_error_code() == 0),
            Err(e) => {
                warn!(error = %e, "statement failed");
                Ok(false)
            }
        }
    }

    /// Run several `;`-separated statements; `Ok(false)` if any failed
    pub async fn multi_execute(&mut self, sql: &str) -> Result<bool> {
        let session = self.manager.acquire().await?;
        match session.multi_query(sql).await {
            Ok(outcomes) => {
                debug!(statements = outcomes.len(), "multi statement batch finished");
                Ok(session.last_error_code() == 0)
            }
            Err(e) => {
                warn!(error = %e, "multi statement batch failed");
                Ok(false)
            }
        }
    }

    /// First row of the result, `None` if there is none or the query failed
    pub async fn fetch_one(&mut self, sql: &str) -> Result<Option<DatabaseRow>> {
        let session = self.manager.acquire().await?;
        match session.query(sql).await {
            Ok(outcome) => Ok(outcome.into_rows().into_iter().next()),
            Err(e) => {
                warn!(error = %e, "single row fetch failed");
                Ok(None)
            }
        }
    }

    /// Call `callback` for every row in order
    ///
    /// Counts the rows processed and the rows for which the callback
    /// returned `true`.
    pub async fn fetch_each<F>(&mut self, sql: &str, mut callback: F) -> Result<IterationCount>
    where
        F: FnMut(&DatabaseRow) -> bool,
    {
        let rows = self.query(sql).await?.into_rows();
        let mut count = IterationCount::default();
        for row in &rows {
            count.processed += 1;
            if callback(row) {
                count.succeeded += 1;
            }
        }
        Ok(count)
    }

    /// Fetch every row and shape it; see [`ResultShaper`] for the layouts
    pub async fn fetch_all(
        &mut self,
        sql: &str,
        key_field: impl Into<FieldSpec>,
        key_value: impl Into<FieldSpec>,
    ) -> Result<Shaped> {
        let shaper = ResultShaper::new(key_field, key_value);
        let rows = self.query(sql).await?.into_rows();
        Ok(shaper.shape(rows))
    }

    /// Run several queries and shape all their rows into one collection
    ///
    /// Later rows overwrite earlier ones on key collisions, across queries too.
    pub async fn fetch_all_batch<S: AsRef<str>>(
        &mut self,
        queries: &[S],
        key_field: impl Into<FieldSpec>,
        key_value: impl Into<FieldSpec>,
    ) -> Result<Shaped> {
        let shaper = ResultShaper::new(key_field, key_value);
        let mut out = shaper.empty();
        for sql in queries {
            let rows = self.query(sql.as_ref()).await?.into_rows();
            shaper.shape_into(rows, &mut out)?;
        }
        Ok(out)
    }

    /// Escape text using the live session's rules
    pub async fn escape(&mut self, text: &str) -> Result<String> {
        let session = self.manager.acquire().await?;
        Ok(session.escape_string(text))
    }

    /// Rows affected by the last statement, 0 without a session
    pub fn affected_rows(&self) -> u64 {
        self.manager.session().map_or(0, Session::affected_rows)
    }

    pub fn last_insert_id(&self) -> Option<u64> {
        self.manager.session().and_then(Session::last_insert_id)
    }

    /// Error code of the last statement, 0 when it succeeded or nothing ran
    pub fn last_error_code(&self) -> u32 {
        self.manager.session().map_or(0, Session::last_error_code)
    }

    pub fn last_error_message(&self) -> Option<String> {
        self.manager
            .session()
            .and_then(Session::last_error_message)
            .map(str::to_string)
    }
}
