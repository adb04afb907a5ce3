//! Connection trait consumed by the insert engine

use crate::{QueryResult, Result, SchemaIntrospection, StatementResult, Value};
use async_trait::async_trait;

/// A database connection
///
/// The insert engine only ever hands a connection one finished statement at a
/// time. Locking, pooling and transaction scope belong to the implementation.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "sqlite", "postgresql", "mysql")
    fn driver_name(&self) -> &str;

    /// Execute a statement that modifies data (INSERT/UPDATE/DELETE)
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult>;

    /// Execute a statement that returns rows (SELECT, or INSERT ... RETURNING)
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Get the dialect identifier for this connection (e.g., "sqlite", "postgresql")
    ///
    /// The insert engine resolves its `InsertDialect` from this once per worker.
    /// Returns None if the dialect is unknown, which selects the generic dialect.
    fn dialect_id(&self) -> Option<&'static str> {
        None
    }

    /// Get schema introspection interface if supported
    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        None
    }
}
