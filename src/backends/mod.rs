//! Client backends
//!
//! Concrete [`Connector`](crate::core::Connector) implementations, one per
//! client library, each behind its own cargo feature.

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "mysql")]
pub use mysql::{MysqlConnector, MysqlSession};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteConnector, SqliteSession};
