//! # Rust Database Helper
//!
//! A small convenience layer over a relational database client. It keeps one
//! connection alive without ceremony and turns query results into the shape
//! the caller wants.
//!
//! ## Features
//!
//! - **Lazy reconnect**: the connection is opened on first use and replaced
//!   whenever it stops answering pings
//! - **Debounced keep-alive**: a successful ping is trusted for 15 seconds, so
//!   a busy connection is not pinged before every statement
//! - **Optional TLS**: client certificate and key, custom CA, or an insecure
//!   mode that skips server verification
//! - **Result shaping**: single row, row callbacks, or every row as a list or
//!   as a map keyed by one or more columns
//! - **Pluggable clients**: MySQL via `mysql_async`, SQLite via `rusqlite`
//!
//! ## Supported Databases
//!
//! | Database | Feature | Notes |
//! |----------|---------|-------|
//! | MySQL / MariaDB | `mysql` (default) | TLS, multi statements |
//! | SQLite | `sqlite` | bundled, no TLS |
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! rust_database_helper = { version = "0.1", features = ["sqlite"] }
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! ### Fetching rows
//!
//! ```rust,no_run
//! # #[cfg(feature = "sqlite")]
//! # async fn demo() -> rust_database_helper::Result<()> {
//! use rust_database_helper::prelude::*;
//!
//! let config = ConnectionConfig::builder(DatabaseType::Sqlite).build()?;
//! let mut db = DatabaseHelper::new(SqliteConnector::new(), config);
//!
//! db.execute("CREATE TABLE users (id TEXT, first_name TEXT)").await?;
//! db.execute("INSERT INTO users VALUES ('mmouse', 'Mickey'), ('dduck', 'Donald')").await?;
//!
//! // id -> first_name
//! let names = db.fetch_all("SELECT * FROM users", "id", "first_name").await?;
//! assert_eq!(names.len(), 2);
//!
//! // count matching rows
//! let count = db
//!     .fetch_each("SELECT * FROM users", |row| row["id"].as_str() == Some("mmouse"))
//!     .await?;
//! assert_eq!((count.processed, count.succeeded), (2, 1));
//! # Ok(())
//! # }
//! ```
//!
//! ### Connecting over TLS
//!
//! ```rust,no_run
//! # #[cfg(feature = "mysql")]
//! # async fn demo() -> rust_database_helper::Result<()> {
//! use rust_database_helper::prelude::*;
//!
//! let config = ConnectionConfig::builder(DatabaseType::Mysql)
//!     .host("db.internal")
//!     .username("report")
//!     .password("secret")
//!     .database("sales")
//!     .tls(TlsConfig::new().with_ca_cert("/etc/mysql/ca.pem"))
//!     .build()?;
//!
//! let mut db = DatabaseHelper::new(MysqlConnector::new(), config);
//! db.connect().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error handling
//!
//! A connection that cannot be established is always an error. A statement
//! the server rejects is routine: [`DatabaseHelper::execute`] reports it as
//! `Ok(false)` and [`DatabaseHelper::fetch_one`] as `Ok(None)`, with the
//! details available from [`DatabaseHelper::last_error_code`].
//!
//! ## Project Structure
//!
//! ```text
//! rust_database_helper/
//! ├── src/
//! │   ├── core/              # Core types and traits
//! │   │   ├── config.rs      # Connection and TLS configuration
//! │   │   ├── database.rs    # Connector / Session traits
//! │   │   ├── helper.rs      # DatabaseHelper façade
//! │   │   ├── manager.rs     # Reconnect and keep-alive
//! │   │   ├── shaper.rs      # Result shaping
//! │   │   └── value.rs       # Value and row types
//! │   ├── backends/          # Client implementations
//! │   └── lib.rs
//! ├── demos/                 # Example programs
//! ├── tests/                 # Integration tests
//! └── Cargo.toml
//! ```

/// Core database helper types and traits
pub mod core;

/// Client backend implementations
pub mod backends;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::core::{
        ConnectionBuilder, ConnectionConfig, ConnectionState, Connector, DatabaseError,
        DatabaseHelper, DatabaseResult, DatabaseRow, DatabaseType, DatabaseValue, FieldSpec,
        IterationCount, KeyedCollection, QueryOutcome, Result, Session, Shaped, ShapedRecord,
        TlsConfig,
    };

    #[cfg(feature = "mysql")]
    pub use crate::backends::MysqlConnector;
    #[cfg(feature = "sqlite")]
    pub use crate::backends::SqliteConnector;
}

// Re-export at root level for convenience
pub use self::core::{
    row, ConnectionBuilder, ConnectionConfig, ConnectionManager, ConnectionState, Connector,
    DatabaseError, DatabaseHelper, DatabaseResult, DatabaseRow, DatabaseType, DatabaseValue,
    FieldSpec, IterationCount, KeyedCollection, QueryOutcome, Result, ResultShaper, Session,
    Shaped, ShapedRecord, TlsConfig,
};

#[cfg(feature = "mysql")]
pub use backends::MysqlConnector;
#[cfg(feature = "sqlite")]
pub use backends::SqliteConnector;
