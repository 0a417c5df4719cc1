//! Linkbook storage on SQLite.
//!
//! `connection` opens the database file and `migrations` brings its schema to
//! [`migrations::CURRENT_SCHEMA_VERSION`]. The record store in
//! `crate::store::SqliteStore` takes the connection from there.
//!
//! ```no_run
//! use linkbook::database::Database;
//! use linkbook::store::SqliteStore;
//!
//! let db = Database::open("linkbook.db")?;
//! let store = SqliteStore::new(db);
//! # Ok::<(), rusqlite::Error>(())
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
