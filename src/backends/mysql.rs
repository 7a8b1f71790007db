//! MySQL/MariaDB backend
//!
//! Sessions are single `mysql_async` connections using the text protocol, so
//! most values arrive as strings exactly as the server rendered them. TLS is
//! configured through `SslOpts` before the connection is opened.

use crate::core::{
    config::{ConnectionConfig, TlsConfig},
    database::{Connector, QueryOutcome, Session},
    database_types::DatabaseType,
    error::{DatabaseError, Result},
    value::{DatabaseRow, DatabaseValue},
};
use async_trait::async_trait;
use mysql_async::{prelude::*, ClientIdentity, Conn, OptsBuilder, Row, SslOpts};
use std::path::Path;
use tracing::{debug, info, warn};

/// Client-side "unknown error" code
const CR_UNKNOWN_ERROR: u32 = 2000;
/// Client-side "lost connection during query" code
const CR_SERVER_LOST: u32 = 2013;

/// Opens MySQL sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlConnector;

impl MysqlConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for MysqlConnector {
    type Session = MysqlSession;

    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mysql
    }

    async fn connect(
        &self,
        config: &ConnectionConfig,
        tls: Option<&TlsConfig>,
    ) -> Result<MysqlSession> {
        let mut builder = OptsBuilder::default()
            .ip_or_hostname(config.host())
            .tcp_port(config.port())
            .user(Some(config.username()))
            .pass(Some(config.password()))
            .db_name(config.database());

        if let Some(tls) = tls {
            builder = builder.ssl_opts(Some(build_ssl_opts(tls)?));
        }

        info!(
            host = %config.host(),
            port = config.port(),
            database = ?config.database(),
            tls = tls.is_some(),
            "connecting to MySQL"
        );
        let conn = Conn::new(builder).await?;

        Ok(MysqlSession {
            conn: Some(conn),
            affected_rows: 0,
            last_insert_id: None,
            last_error: None,
        })
    }
}

/// Build `SslOpts` from the TLS parameters
///
/// Certificate files are checked for existence here so that a typo in a path
/// is reported as a TLS error rather than a handshake failure.
pub fn build_ssl_opts(tls: &TlsConfig) -> Result<SslOpts> {
    tls.validate()?;

    let mut ssl_opts = SslOpts::default();

    if let Some((cert, key)) = tls.client_identity() {
        require_file(cert, "client certificate")?;
        require_file(key, "client key")?;
        debug!(cert = %cert.display(), key = %key.display(), "using TLS client identity");
        ssl_opts = ssl_opts.with_client_identity(Some(ClientIdentity::new(
            cert.to_path_buf().into(),
            key.to_path_buf().into(),
        )));
    }

    if let Some(ca_cert) = &tls.ca_cert {
        require_file(ca_cert, "CA certificate")?;
        debug!(path = %ca_cert.display(), "using custom TLS CA certificate");
        ssl_opts = ssl_opts
            .with_root_certs(vec![ca_cert.clone().into()])
            .with_disable_built_in_roots(true);
    }

    if !tls.verify_server_cert {
        warn!("TLS server certificate verification disabled");
        ssl_opts = ssl_opts
            .with_danger_accept_invalid_certs(true)
            .with_danger_skip_domain_validation(true);
    }

    Ok(ssl_opts)
}

fn require_file(path: &Path, what: &str) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(DatabaseError::tls(format!(
            "{} not found at {}",
            what,
            path.display()
        )))
    }
}

/// One open MySQL connection
pub struct MysqlSession {
    conn: Option<Conn>,
    affected_rows: u64,
    last_insert_id: Option<u64>,
    last_error: Option<(u32, String)>,
}

impl MysqlSession {
    fn conn(&mut self) -> Result<&mut Conn> {
        self.conn
            .as_mut()
            .ok_or_else(|| DatabaseError::connection("Not connected to database"))
    }

    /// Run a statement string and collect every result it produces
    async fn run(&mut self, sql: &str) -> Result<Vec<QueryOutcome>> {
        let conn = self.conn()?;
        match collect_outcomes(conn, sql).await {
            Ok(outcomes) => {
                self.last_error = None;
                if let Some(last) = outcomes.last() {
                    self.affected_rows = last.row_count();
                    if let QueryOutcome::Done {
                        last_insert_id: Some(id),
                        ..
                    } = last
                    {
                        self.last_insert_id = Some(*id);
                    }
                }
                Ok(outcomes)
            }
            Err(e) => {
                let code = mysql_error_code(&e);
                let message = e.to_string();
                self.affected_rows = 0;
                self.last_error = Some((code, message.clone()));
                Err(DatabaseError::query(code, message))
            }
        }
    }
}

/// One outcome per statement; an error on a later statement discards the earlier ones
///
/// Exercised against a live server by `tests/mysql_live_tests.rs`.
async fn collect_outcomes(
    conn: &mut Conn,
    sql: &str,
) -> std::result::Result<Vec<QueryOutcome>, mysql_async::Error> {
    let mut result = conn.query_iter(sql).await?;
    let mut outcomes = Vec::new();

    loop {
        let has_columns = result.columns().is_some_and(|columns| !columns.is_empty());
        let affected_rows = result.affected_rows();
        let last_insert_id = result.last_insert_id();
        let rows: Vec<Row> = result.collect().await?;

        outcomes.push(if has_columns {
            QueryOutcome::Rows(rows.iter().map(row_to_database_row).collect())
        } else {
            QueryOutcome::Done {
                affected_rows,
                last_insert_id,
            }
        });

        if result.is_empty() {
            break;
        }
    }

    Ok(outcomes)
}

fn mysql_error_code(e: &mysql_async::Error) -> u32 {
    match e {
        mysql_async::Error::Server(server) => server.code as u32,
        mysql_async::Error::Io(_) => CR_SERVER_LOST,
        _ => CR_UNKNOWN_ERROR,
    }
}

/// Convert a mysql_async Row to a DatabaseRow
fn row_to_database_row(row: &Row) -> DatabaseRow {
    row.columns_ref()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let value = row
                .as_ref(idx)
                .map(convert_value)
                .unwrap_or(DatabaseValue::Null);
            (column.name_str().into_owned(), value)
        })
        .collect()
}

fn convert_value(value: &mysql_async::Value) -> DatabaseValue {
    match value {
        mysql_async::Value::NULL => DatabaseValue::Null,
        mysql_async::Value::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(s) => DatabaseValue::String(s.to_string()),
            Err(_) => DatabaseValue::Bytes(bytes.clone()),
        },
        mysql_async::Value::Int(i) => DatabaseValue::Long(*i),
        mysql_async::Value::UInt(u) => match i64::try_from(*u) {
            Ok(i) => DatabaseValue::Long(i),
            Err(_) => DatabaseValue::String(u.to_string()),
        },
        mysql_async::Value::Float(f) => DatabaseValue::Double(*f as f64),
        mysql_async::Value::Double(d) => DatabaseValue::Double(*d),
        mysql_async::Value::Date(year, month, day, hour, min, sec, micro) => {
            let datetime = chrono::NaiveDate::from_ymd_opt(*year as i32, *month as u32, *day as u32)
                .and_then(|d| d.and_hms_micro_opt(*hour as u32, *min as u32, *sec as u32, *micro));
            DatabaseValue::String(match datetime {
                Some(dt) if *micro > 0 => dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
                Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
                None => format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, min, sec
                ),
            })
        }
        mysql_async::Value::Time(negative, days, hours, mins, secs, _micros) => {
            let total_hours = *days * 24 + *hours as u32;
            let sign = if *negative { "-" } else { "" };
            DatabaseValue::String(format!("{}{:02}:{:02}:{:02}", sign, total_hours, mins, secs))
        }
    }
}

#[async_trait]
impl Session for MysqlSession {
    async fn ping(&mut self) -> Result<bool> {
        self.conn()?.ping().await?;
        Ok(true)
    }

    async fn query(&mut self, sql: &str) -> Result<QueryOutcome> {
        let mut outcomes = self.run(sql).await?;
        if outcomes.is_empty() {
            return Ok(QueryOutcome::Done {
                affected_rows: 0,
                last_insert_id: None,
            });
        }
        Ok(outcomes.swap_remove(0))
    }

    async fn multi_query(&mut self, sql: &str) -> Result<Vec<QueryOutcome>> {
        self.run(sql).await
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
        if let Some(conn) = self.conn.take() {
            conn.disconnect().await?;
        }
        Ok(())
    }
}
