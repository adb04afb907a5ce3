//! bulkql Insert - batched multi-row INSERT engine
//!
//! Rows handed to a [`BulkInsertWorker`] are buffered and flushed as one
//! multi-row `INSERT` per `set_size` rows. Statement text follows the
//! connection's [`InsertDialect`](bulkql_core::InsertDialect): identifier
//! quoting, placeholders, ignore and upsert clauses, and `RETURNING`.
//!
//! ```ignore
//! let options = BulkInsertOptions::new().set_size(2);
//! let ((), results) = with_worker(conn, "users", options, async |worker| {
//!     worker.add(vec![("email", Value::from("a@x"))]).await?;
//!     worker.add(vec![("email", Value::from("b@x"))]).await?;
//!     worker.add(vec![("email", Value::from("c@x"))]).await?;
//!     Ok(())
//! })
//! .await?;
//! assert_eq!(results.len(), 2);
//! ```

mod column_set;
mod options;
mod result;
mod row;
mod statement;
mod worker;

pub use column_set::{ColumnSet, DefaultPolicy};
pub use options::{BulkInsertOptions, DEFAULT_SET_SIZE, UpdateDuplicates};
pub use result::{ExecutionResult, ResultSets};
pub use row::{Cell, Row, RowInput};
pub use statement::{InsertPlan, Statement, StatementBuilder, UpsertPlan};
pub use worker::{BulkInsertWorker, bulk_insert, run_worker, with_worker};
