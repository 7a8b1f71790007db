//! Scripted in-memory client used by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_database_helper::core::config::ConnectionBuilder;
use rust_database_helper::prelude::*;
use rust_database_helper::row;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Answer the next ping will give
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingReply {
    Alive,
    Dead,
    Error,
}

#[derive(Default)]
pub struct MockState {
    pub connects: usize,
    pub closes: usize,
    pub pings: usize,
    pub tls_seen: Vec<Option<TlsConfig>>,
    pub fail_connect: bool,
    /// Replies consumed by successive pings; empty means alive
    pub ping_script: VecDeque<PingReply>,
    /// Result sets by exact SQL text
    pub results: HashMap<String, DatabaseResult>,
    pub queries: Vec<String>,
}

#[derive(Clone, Default)]
pub struct MockConnector {
    pub state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(self, sql: &str, rows: DatabaseResult) -> Self {
        self.state.lock().results.insert(sql.to_string(), rows);
        self
    }

    pub fn script_pings(&self, replies: impl IntoIterator<Item = PingReply>) {
        self.state.lock().ping_script.extend(replies);
    }

    pub fn connects(&self) -> usize {
        self.state.lock().connects
    }

    pub fn pings(&self) -> usize {
        self.state.lock().pings
    }

    pub fn closes(&self) -> usize {
        self.state.lock().closes
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Session = MockSession;

    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mysql
    }

    async fn connect(
        &self,
        _config: &ConnectionConfig,
        tls: Option<&TlsConfig>,
    ) -> Result<MockSession> {
        let mut state = self.state.lock();
        state.tls_seen.push(tls.cloned());
        if state.fail_connect {
            return Err(DatabaseError::connection("connection refused"));
        }
        state.connects += 1;
        Ok(MockSession {
            state: Arc::clone(&self.state),
            open: true,
            affected_rows: 0,
            last_insert_id: None,
            last_error: None,
        })
    }
}

pub struct MockSession {
    state: Arc<Mutex<MockState>>,
    open: bool,
    affected_rows: u64,
    last_insert_id: Option<u64>,
    last_error: Option<(u32, String)>,
}

impl MockSession {
    fn run(&mut self, sql: &str) -> Result<QueryOutcome> {
        let mut state = self.state.lock();
        state.queries.push(sql.to_string());

        if sql.starts_with("FAIL") {
            let message = format!("You have an error in your SQL syntax near '{}'", sql);
            self.affected_rows = 0;
            self.last_error = Some((1064, message.clone()));
            return Err(DatabaseError::query(1064, message));
        }

        self.last_error = None;
        if sql.starts_with("SELECT") {
            let rows = state.results.get(sql).cloned().unwrap_or_default();
            self.affected_rows = rows.len() as u64;
            Ok(QueryOutcome::Rows(rows))
        } else {
            self.affected_rows = 1;
            self.last_insert_id = Some(42);
            Ok(QueryOutcome::Done {
                affected_rows: 1,
                last_insert_id: Some(42),
            })
        }
    }
}

#[async_trait]
impl Session for MockSession {
    async fn ping(&mut self) -> Result<bool> {
        let mut state = self.state.lock();
        state.pings += 1;
        if !self.open {
            return Err(DatabaseError::connection("session closed"));
        }
        match state.ping_script.pop_front().unwrap_or(PingReply::Alive) {
            PingReply::Alive => Ok(true),
            PingReply::Dead => Ok(false),
            PingReply::Error => Err(DatabaseError::connection("MySQL server has gone away")),
        }
    }

    async fn query(&mut self, sql: &str) -> Result<QueryOutcome> {
        self.run(sql)
    }

    async fn multi_query(&mut self, sql: &str) -> Result<Vec<QueryOutcome>> {
        let mut outcomes = Vec::new();
        for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            outcomes.push(self.run(statement)?);
        }
        Ok(outcomes)
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
        self.open = false;
        self.state.lock().closes += 1;
        Ok(())
    }
}

pub fn mysql_config() -> ConnectionConfig {
    ConnectionBuilder::new(DatabaseType::Mysql)
        .host("db.test")
        .username("tester")
        .password("secret")
        .database("disney")
        .build()
        .expect("valid config")
}

pub fn tls_config() -> ConnectionConfig {
    ConnectionBuilder::new(DatabaseType::Mysql)
        .host("db.test")
        .username("tester")
        .tls(TlsConfig::insecure())
        .build()
        .expect("valid config")
}

pub fn disney_rows() -> DatabaseResult {
    [
        ("mmouse", "Mickey", "Mouse"),
        ("dduck", "Donald", "Duck"),
        ("mmouse", "Mickey", "Mouse"),
        ("ggoof", "Goofy", "Goof"),
    ]
    .into_iter()
    .map(|(id, first, last)| {
        row([
            ("id", DatabaseValue::from(id)),
            ("first_name", DatabaseValue::from(first)),
            ("last_name", DatabaseValue::from(last)),
        ])
    })
    .collect()
}
