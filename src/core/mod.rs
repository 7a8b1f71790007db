//! Core types and traits
//!
//! Error types, values, configuration, the client traits, the connection
//! manager, result shaping and the helper façade that ties them together.

pub mod config;
pub mod database;
pub mod database_types;
pub mod error;
pub mod helper;
pub mod manager;
pub mod shaper;
pub mod value;

// Re-export commonly used types
pub use config::{ConnectionBuilder, ConnectionConfig, TlsConfig};
pub use database::{escape_mysql_string, Connector, QueryOutcome, Session};
pub use database_types::DatabaseType;
pub use error::{DatabaseError, Result};
pub use helper::{DatabaseHelper, IterationCount};
pub use manager::{ConnectionManager, ConnectionState, LIVENESS_DEBOUNCE};
pub use shaper::{FieldSpec, KeyedCollection, ResultShaper, Shaped, ShapedRecord};
pub use value::{row, DatabaseResult, DatabaseRow, DatabaseValue};
