//! bulkql Core - Core abstractions for the batched insert engine
//!
//! This crate provides the traits and types the insert engine is built on.
//! It defines:
//!
//! - `Connection` - The execution collaborator that runs raw SQL with bound parameters
//! - `SchemaIntrospection` - Column metadata discovery for a target table
//! - `InsertDialect` - Per-engine capabilities for multi-row INSERT generation
//! - `Clock` - Source of the per-flush batch timestamp
//! - Common types like `Value`, `QueryResult`, `StatementResult`

mod clock;
mod connection;
mod dialect;
pub mod dialects;
mod error;
mod schema;
mod types;

pub use clock::*;
pub use connection::*;
pub use dialect::*;
pub use dialects::{
    GenericDialect, MySqlDialect, PostgresDialect, SqliteDialect, INSERT_DIALECTS,
    get_insert_dialect,
};
pub use error::*;
pub use schema::*;
pub use types::*;
