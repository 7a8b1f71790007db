//! MySQL over TLS example
//!
//! Connection settings come from the environment:
//! - `MYSQL_HOST`, `MYSQL_PORT`, `MYSQL_USER`, `MYSQL_PASSWORD`, `MYSQL_DATABASE`
//! - `MYSQL_SSL_CA`, `MYSQL_SSL_CERT`, `MYSQL_SSL_KEY` (any of them enables TLS)
//! - `MYSQL_SSL_INSECURE=1` to skip server certificate checks
//!
//! Run with: cargo run --example mysql_tls

use rust_database_helper::prelude::*;
use std::env;
use tracing_subscriber::EnvFilter;

fn tls_from_env() -> Option<TlsConfig> {
    let ca = env::var("MYSQL_SSL_CA").ok();
    let cert = env::var("MYSQL_SSL_CERT").ok();
    let key = env::var("MYSQL_SSL_KEY").ok();
    let insecure = env::var("MYSQL_SSL_INSECURE").is_ok_and(|v| v == "1");

    if ca.is_none() && cert.is_none() && key.is_none() && !insecure {
        return None;
    }

    let mut tls = if insecure {
        TlsConfig::insecure()
    } else {
        TlsConfig::new()
    };
    if let Some(ca) = ca {
        tls = tls.with_ca_cert(ca);
    }
    if let (Some(cert), Some(key)) = (cert, key) {
        tls = tls.with_client_identity(cert, key);
    }
    Some(tls)
}

fn config_from_env() -> Result<ConnectionConfig> {
    let mut builder = ConnectionConfig::builder(DatabaseType::Mysql)
        .host(env::var("MYSQL_HOST").unwrap_or_else(|_| "localhost".to_string()))
        .username(env::var("MYSQL_USER").unwrap_or_else(|_| "root".to_string()))
        .password(env::var("MYSQL_PASSWORD").unwrap_or_default());

    if let Some(port) = env::var("MYSQL_PORT").ok().and_then(|p| p.parse().ok()) {
        builder = builder.port(port);
    }
    if let Ok(database) = env::var("MYSQL_DATABASE") {
        builder = builder.database(database);
    }
    if let Some(tls) = tls_from_env() {
        builder = builder.tls(tls);
    }
    builder.build()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config_from_env()?;
    println!("Connecting to {}", config.connection_url());

    let mut db = DatabaseHelper::new(MysqlConnector::new(), config);
    db.connect().await?;

    if let Some(row) = db
        .fetch_one("SHOW SESSION STATUS LIKE 'Ssl_cipher'")
        .await?
    {
        let cipher = row.get("Value").map(DatabaseValue::as_string).unwrap_or_default();
        if cipher.is_empty() {
            println!("Connected without TLS");
        } else {
            println!("Connected with cipher {}", cipher);
        }
    }

    let variables = db
        .fetch_all(
            "SHOW VARIABLES LIKE 'version%'",
            "Variable_name",
            "Value",
        )
        .await?;
    if let Some(map) = variables.as_keyed() {
        for (name, value) in map {
            println!("  {:<24} {}", name, value.as_scalar().map(DatabaseValue::as_string).unwrap_or_default());
        }
    }

    db.close().await;
    Ok(())
}
