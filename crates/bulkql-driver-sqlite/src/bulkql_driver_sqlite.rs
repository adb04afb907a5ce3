//! SQLite execution and metadata collaborator for bulkql

mod connection;
mod schema;

pub use connection::SqliteConnection;
