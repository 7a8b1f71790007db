//! Connection configuration
//!
//! [`ConnectionConfig`] is supplied once when a manager is created and is
//! never mutated afterwards. It can be assembled with [`ConnectionBuilder`]
//! or deserialized with serde from any format the application already uses.

use super::database_types::DatabaseType;
use super::error::{DatabaseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

fn default_host() -> String {
    "localhost".to_string()
}

fn default_true() -> bool {
    true
}

/// TLS parameters applied at connect time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    /// PEM-encoded client private key
    #[serde(default)]
    pub client_key: Option<PathBuf>,
    /// PEM-encoded client certificate chain
    #[serde(default)]
    pub client_cert: Option<PathBuf>,
    /// PEM-encoded CA certificate used instead of the built-in roots
    #[serde(default)]
    pub ca_cert: Option<PathBuf>,
    /// When false the server certificate and hostname are not verified
    #[serde(default = "default_true")]
    pub verify_server_cert: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            client_key: None,
            client_cert: None,
            ca_cert: None,
            verify_server_cert: true,
        }
    }
}

impl TlsConfig {
    /// TLS with full server verification against the built-in roots
    pub fn new() -> Self {
        Self::default()
    }

    /// TLS that skips server certificate verification
    pub fn insecure() -> Self {
        Self {
            verify_server_cert: false,
            ..Self::default()
        }
    }

    /// Present a client certificate and its private key
    pub fn with_client_identity(
        mut self,
        cert: impl Into<PathBuf>,
        key: impl Into<PathBuf>,
    ) -> Self {
        self.client_cert = Some(cert.into());
        self.client_key = Some(key.into());
        self
    }

    /// Trust the given CA certificate
    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert = Some(path.into());
        self
    }

    /// Both halves of the client identity, if configured
    pub fn client_identity(&self) -> Option<(&Path, &Path)> {
        match (&self.client_cert, &self.client_key) {
            (Some(cert), Some(key)) => Some((cert.as_path(), key.as_path())),
            _ => None,
        }
    }

    /// Check that the parameters are consistent
    pub fn validate(&self) -> Result<()> {
        match (&self.client_cert, &self.client_key) {
            (Some(_), None) => Err(DatabaseError::invalid_config(
                "TLS client certificate given without a client key",
            )),
            (None, Some(_)) => Err(DatabaseError::invalid_config(
                "TLS client key given without a client certificate",
            )),
            _ => Ok(()),
        }
    }
}

/// Immutable connection parameters
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default, rename = "type")]
    database_type: DatabaseType,
    #[serde(default = "default_host")]
    host: String,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    username: String,
    #[serde(default, skip_serializing)]
    password: String,
    #[serde(default)]
    database: Option<String>,
    #[serde(default)]
    tls: Option<TlsConfig>,
}

impl ConnectionConfig {
    /// Start building a configuration for the given backend
    pub fn builder(db_type: DatabaseType) -> ConnectionBuilder {
        ConnectionBuilder::new(db_type)
    }

    pub fn database_type(&self) -> DatabaseType {
        self.database_type
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Configured port, or the backend's default
    pub fn port(&self) -> u16 {
        self.port
            .unwrap_or_else(|| self.database_type.default_port())
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Schema to select (MySQL) or file path (SQLite)
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// TLS parameters, present only when TLS is enabled
    pub fn tls(&self) -> Option<&TlsConfig> {
        self.tls.as_ref()
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Check the configuration before the first connect
    pub fn validate(&self) -> Result<()> {
        if self.database_type.is_networked() {
            if self.host.trim().is_empty() {
                return Err(DatabaseError::invalid_config("host must not be empty"));
            }
            if self.port() == 0 {
                return Err(DatabaseError::invalid_config("port must not be zero"));
            }
            if self.username.is_empty() {
                return Err(DatabaseError::invalid_config("username must not be empty"));
            }
        }

        if let Some(tls) = &self.tls {
            if !self.database_type.supports_tls() {
                return Err(DatabaseError::invalid_config(format!(
                    "TLS is not available for {}",
                    self.database_type
                )));
            }
            tls.validate()?;
        }

        Ok(())
    }

    /// Connection URL with the password redacted, suitable for logs
    pub fn connection_url(&self) -> String {
        match self.database_type {
            DatabaseType::Sqlite => self.database.clone().unwrap_or_else(|| ":memory:".to_string()),
            DatabaseType::Mysql => {
                let password = if self.password.is_empty() { "" } else { ":***" };
                let mut url = format!(
                    "mysql://{}{}@{}:{}/{}",
                    self.username,
                    password,
                    self.host,
                    self.port(),
                    self.database.as_deref().unwrap_or("")
                );
                if let Some(tls) = &self.tls {
                    url.push_str(if tls.verify_server_cert {
                        "?ssl-mode=VERIFY_IDENTITY"
                    } else {
                        "?ssl-mode=REQUIRED"
                    });
                }
                url
            }
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("database_type", &self.database_type)
            .field("host", &self.host)
            .field("port", &self.port())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("tls", &self.tls)
            .finish()
    }
}

/// Database connection builder
pub struct ConnectionBuilder {
    db_type: DatabaseType,
    host: Option<String>,
    port: Option<u16>,
    database: Option<String>,
    username: Option<String>,
    password: Option<String>,
    tls: Option<TlsConfig>,
}

impl ConnectionBuilder {
    /// Create a new connection builder for the specified database type
    pub fn new(db_type: DatabaseType) -> Self {
        Self {
            db_type,
            host: None,
            port: None,
            database: None,
            username: None,
            password: None,
            tls: None,
        }
    }

    /// Set the database host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the database port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the database name
    pub fn database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the username
    pub fn username<S: Into<String>>(mut self, username: S) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the password
    pub fn password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Enable TLS with the given parameters
    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ConnectionConfig> {
        let config = ConnectionConfig {
            database_type: self.db_type,
            host: self.host.unwrap_or_else(default_host),
            port: self.port,
            username: self.username.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            database: self.database,
            tls: self.tls,
        };
        config.validate()?;
        Ok(config)
    }
}
