//! Relational storage backed by SQLite.

mod migrations;
mod schema;
mod sqlite;

pub use schema::SCHEMA_VERSION;
pub use sqlite::SqliteStore;
