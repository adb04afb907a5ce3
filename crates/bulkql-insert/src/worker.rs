//! Row buffer and flush state machine

use crate::column_set::ColumnSet;
use crate::options::BulkInsertOptions;
use crate::result::{ExecutionResult, ResultSets};
use crate::row::{Row, RowInput};
use crate::statement::{InsertPlan, Statement, StatementBuilder};
use bulkql_core::{
    BulkqlError, Clock, Connection, InsertDialect, Result, SystemClock, TableColumns, TableRef,
    Value, get_insert_dialect,
};
use std::sync::Arc;
use std::time::Instant;

/// Accumulates rows and flushes them as multi-row INSERT statements.
///
/// A worker is single-owner: `add` and `force_save` take `&mut self`, so one
/// worker never interleaves two flushes. Use one worker per task for parallel
/// loading.
///
/// Dropping a worker with buffered rows loses them. [`with_worker`] and
/// [`bulk_insert`] always run the final flush.
pub struct BulkInsertWorker {
    connection: Arc<dyn Connection>,
    dialect: Arc<dyn InsertDialect>,
    clock: Arc<dyn Clock>,
    column_set: ColumnSet,
    plan: InsertPlan,
    set_size: usize,
    rows: Vec<Row>,
    results: ResultSets,
    last_flush_failed: bool,
}

impl std::fmt::Debug for BulkInsertWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkInsertWorker")
            .field("table", self.column_set.table())
            .field("dialect", &self.dialect.id())
            .field("set_size", &self.set_size)
            .field("pending", &self.rows.len())
            .field("statements", &self.results.len())
            .finish()
    }
}

impl BulkInsertWorker {
    /// Create a worker for already-resolved table metadata.
    ///
    /// The dialect is chosen once from `Connection::dialect_id`.
    pub fn new(
        connection: Arc<dyn Connection>,
        table: &TableColumns,
        options: BulkInsertOptions,
    ) -> Result<Self> {
        let dialect = get_insert_dialect(connection.dialect_id());
        Self::with_dialect(connection, dialect, table, options)
    }

    /// Create a worker with an explicit dialect.
    ///
    /// Every option is checked here, before any row is buffered. Options the
    /// dialect cannot express fail as `BulkqlError::Configuration`.
    pub fn with_dialect(
        connection: Arc<dyn Connection>,
        dialect: Arc<dyn InsertDialect>,
        table: &TableColumns,
        options: BulkInsertOptions,
    ) -> Result<Self> {
        options.validate()?;
        let column_set = ColumnSet::resolve(&options.columns, table)?;
        let plan = InsertPlan::resolve(&options, &column_set, table, dialect.as_ref())
            .map_err(unsupported_as_configuration)?;
        StatementBuilder::new(dialect.as_ref(), &column_set, &plan)
            .check_capabilities()
            .map_err(unsupported_as_configuration)?;
        check_parameter_limit(dialect.as_ref(), &column_set, options.set_size)?;

        tracing::info!(
            table = %column_set.table(),
            dialect = dialect.id(),
            columns = column_set.len(),
            set_size = options.set_size,
            ignore = plan.ignore,
            upsert = plan.upsert.is_some(),
            returning = plan.returning.is_some(),
            "bulk insert worker created"
        );

        Ok(Self {
            connection,
            dialect,
            clock: Arc::new(SystemClock),
            column_set,
            plan,
            set_size: options.set_size,
            rows: Vec::with_capacity(options.set_size.min(1024)),
            results: ResultSets::default(),
            last_flush_failed: false,
        })
    }

    /// Resolve `table` through the connection's schema introspection, then
    /// create the worker.
    pub async fn open(
        connection: Arc<dyn Connection>,
        table: &TableRef,
        options: BulkInsertOptions,
    ) -> Result<Self> {
        let table_columns = {
            let introspection = connection.as_schema_introspection().ok_or_else(|| {
                BulkqlError::Configuration(format!(
                    "{} connection cannot describe table {}",
                    connection.driver_name(),
                    table
                ))
            })?;
            introspection.resolve_table_columns(table).await?
        };
        Self::new(connection, &table_columns, options)
    }

    /// Replace the clock used for batch timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Buffer one row, flushing the full buffer first if needed.
    ///
    /// A malformed row fails with `RowShape` and is not buffered. If the
    /// preceding flush fails, its error is returned and `input` is not
    /// buffered either.
    pub async fn add(&mut self, input: impl Into<RowInput>) -> Result<()> {
        let row = self.column_set.normalize(input.into())?;
        if self.rows.len() >= self.set_size {
            self.flush().await?;
        }
        self.rows.push(row);
        Ok(())
    }

    /// Flush buffered rows now. An empty buffer produces nothing.
    pub async fn save(&mut self) -> Result<()> {
        self.force_save().await
    }

    pub async fn force_save(&mut self) -> Result<()> {
        self.flush().await
    }

    pub fn result_sets(&self) -> &ResultSets {
        &self.results
    }

    pub fn into_result_sets(mut self) -> ResultSets {
        std::mem::take(&mut self.results)
    }

    pub fn column_set(&self) -> &ColumnSet {
        &self.column_set
    }

    pub fn dialect(&self) -> &dyn InsertDialect {
        self.dialect.as_ref()
    }

    pub fn pending_count(&self) -> usize {
        self.rows.len()
    }

    pub fn set_size(&self) -> usize {
        self.set_size
    }

    /// Change the flush threshold. Takes effect at the next flush; a buffer
    /// already larger than `set_size` is flushed in `set_size` chunks.
    pub fn set_set_size(&mut self, set_size: usize) -> Result<()> {
        if set_size == 0 {
            return Err(BulkqlError::Configuration(
                "set_size must be greater than zero".into(),
            ));
        }
        check_parameter_limit(self.dialect.as_ref(), &self.column_set, set_size)?;
        self.set_size = set_size;
        Ok(())
    }

    pub fn statement_count(&self) -> usize {
        self.results.len()
    }

    pub fn total_rows_flushed(&self) -> usize {
        self.results.total_rows()
    }

    /// Whether the most recent flush failed
    pub fn last_flush_failed(&self) -> bool {
        self.last_flush_failed
    }

    #[tracing::instrument(
        skip(self),
        fields(table = %self.column_set.table(), rows = self.rows.len())
    )]
    async fn flush(&mut self) -> Result<()> {
        // The buffer can exceed `set_size` after `set_set_size` lowered it.
        while !self.rows.is_empty() {
            let take = self.rows.len().min(self.set_size);
            let batch: Vec<Row> = self.rows.drain(..take).collect();
            self.flush_batch(batch).await?;
        }
        Ok(())
    }

    /// Run one statement for `rows`. A failed batch is not retried.
    async fn flush_batch(&mut self, rows: Vec<Row>) -> Result<()> {
        self.last_flush_failed = true;

        let batch_now = self.needs_batch_timestamp(&rows).then(|| self.clock.now());
        let Some(statement) = StatementBuilder::new(self.dialect.as_ref(), &self.column_set, &self.plan)
            .build(&rows, batch_now.as_ref())?
        else {
            self.last_flush_failed = false;
            return Ok(());
        };

        let result = self.run(&statement).await.map_err(|e| {
            let err = e.into_execution();
            tracing::warn!(error = %err, rows = statement.row_count, "bulk insert flush failed");
            err
        })?;

        tracing::debug!(
            rows = result.row_count,
            affected_rows = result.affected_rows,
            returned_keys = result.returned_keys.as_ref().map(Vec::len),
            execution_time_ms = result.execution_time_ms,
            "flushed bulk insert batch"
        );
        self.results.push(result);
        self.last_flush_failed = false;
        Ok(())
    }

    async fn run(&self, statement: &Statement) -> Result<ExecutionResult> {
        let start_time = Instant::now();
        if statement.returning {
            let result = self.connection.query(&statement.sql, &statement.params).await?;
            let key = self.plan.returning.as_deref().unwrap_or_default();
            let returned_keys: Vec<Value> = result
                .rows
                .iter()
                .map(|row| {
                    row.get_by_name(key)
                        .or_else(|| row.get(0))
                        .cloned()
                        .unwrap_or(Value::Null)
                })
                .collect();
            Ok(ExecutionResult {
                affected_rows: result.affected_rows.max(returned_keys.len() as u64),
                returned_keys: Some(returned_keys),
                row_count: statement.row_count,
                execution_time_ms: start_time.elapsed().as_millis() as u64,
            })
        } else {
            let result = self
                .connection
                .execute(&statement.sql, &statement.params)
                .await?;
            Ok(ExecutionResult {
                affected_rows: result.affected_rows,
                returned_keys: None,
                row_count: statement.row_count,
                execution_time_ms: start_time.elapsed().as_millis() as u64,
            })
        }
    }

    fn needs_batch_timestamp(&self, rows: &[Row]) -> bool {
        self.column_set.timestamp_indices().any(|column| {
            rows.iter()
                .any(|row| row.cell(column).is_some_and(|cell| cell.is_default()))
        })
    }
}

impl Drop for BulkInsertWorker {
    fn drop(&mut self) {
        if !self.rows.is_empty() {
            tracing::warn!(
                table = %self.column_set.table(),
                rows = self.rows.len(),
                "bulk insert worker dropped with unflushed rows"
            );
        }
    }
}

fn unsupported_as_configuration(err: BulkqlError) -> BulkqlError {
    match err {
        BulkqlError::UnsupportedOption { .. } => BulkqlError::Configuration(err.to_string()),
        other => other,
    }
}

fn check_parameter_limit(
    dialect: &dyn InsertDialect,
    column_set: &ColumnSet,
    set_size: usize,
) -> Result<()> {
    let Some(limit) = dialect.max_bind_parameters() else {
        return Ok(());
    };
    let needed = set_size.saturating_mul(column_set.len());
    if needed > limit {
        return Err(BulkqlError::Configuration(format!(
            "set_size {} with {} columns needs up to {} bind parameters; {} allows {}",
            set_size,
            column_set.len(),
            needed,
            dialect.display_name(),
            limit
        )));
    }
    Ok(())
}

/// Run `body` against a fresh worker and flush whatever it left buffered.
///
/// The final flush runs on every exit path of `body`. A batch whose flush
/// already failed is gone from the buffer, so only rows buffered after it are
/// flushed. If both `body` and the final flush fail, the body's error is
/// returned and the flush error is logged.
pub async fn with_worker<T, F>(
    connection: Arc<dyn Connection>,
    table: impl Into<TableRef>,
    options: BulkInsertOptions,
    body: F,
) -> Result<(T, ResultSets)>
where
    F: AsyncFnOnce(&mut BulkInsertWorker) -> Result<T>,
{
    let table = table.into();
    let mut worker = BulkInsertWorker::open(connection, &table, options).await?;
    let value = finish(&mut worker, body).await?;
    Ok((value, worker.into_result_sets()))
}

/// Like [`with_worker`], for a worker the caller configured (dialect, clock).
pub async fn run_worker<T, F>(mut worker: BulkInsertWorker, body: F) -> Result<(T, ResultSets)>
where
    F: AsyncFnOnce(&mut BulkInsertWorker) -> Result<T>,
{
    let value = finish(&mut worker, body).await?;
    Ok((value, worker.into_result_sets()))
}

async fn finish<T, F>(worker: &mut BulkInsertWorker, body: F) -> Result<T>
where
    F: AsyncFnOnce(&mut BulkInsertWorker) -> Result<T>,
{
    match body(worker).await {
        Ok(value) => {
            worker.force_save().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(flush_err) = worker.force_save().await {
                tracing::error!(
                    table = %worker.column_set().table(),
                    error = %flush_err,
                    "final flush failed after bulk insert body error"
                );
            }
            Err(err)
        }
    }
}

/// Insert every row of `rows` into `table` and return the per-statement results
pub async fn bulk_insert<I>(
    connection: Arc<dyn Connection>,
    table: impl Into<TableRef>,
    options: BulkInsertOptions,
    rows: I,
) -> Result<ResultSets>
where
    I: IntoIterator,
    I::Item: Into<RowInput>,
{
    let (_, results) = with_worker(connection, table, options, async move |worker| {
        for row in rows {
            worker.add(row).await?;
        }
        Ok(())
    })
    .await?;
    Ok(results)
}
