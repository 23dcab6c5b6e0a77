//! Table clearing for the local SQLite database.
//!
//! # Intention
//!
//! - Empty a fixed set of operational tables in a single transaction.
//! - Encapsulate SQLite-specific logic, types, and error handling.
//!
//! # Architectural Boundaries
//!
//! - Only SQLite/database code belongs here.
//! - No schema management, backups, or conditional deletes.

pub mod sqlite;

pub use sqlite::{
    open_database, ClearConfig, ClearError, ClearReport, DeleteOperation, TableCleared,
    TableClearer, DEFAULT_DB_PATH, DEFAULT_TABLES,
};
