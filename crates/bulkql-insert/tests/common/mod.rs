//! Shared fixtures for worker tests: a recording connection and test clocks

#![allow(dead_code)]

use async_trait::async_trait;
use bulkql_core::{
    BulkqlError, Clock, ColumnInfo, Connection, QueryResult, Result, Row, SchemaIntrospection,
    StatementResult, Value,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

/// Initialize logging for tests if not already initialized
pub fn initialize_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("bulkql_insert=debug".parse().unwrap()),
            )
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// A statement the connection was asked to run
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Recorded {
    /// Number of row tuples in the VALUES list
    pub fn row_count(&self) -> usize {
        self.sql.matches("), (").count() + 1
    }
}

/// Connection that records every statement instead of running it.
///
/// `query` answers with one generated key per VALUES row, numbered from 1
/// across the connection's lifetime.
pub struct RecordingConnection {
    dialect: Option<&'static str>,
    columns: Option<Vec<ColumnInfo>>,
    statements: Mutex<Vec<Recorded>>,
    fail_on_call: Option<usize>,
    calls: AtomicUsize,
    next_key: AtomicI64,
}

impl RecordingConnection {
    pub fn new(dialect: Option<&'static str>) -> Self {
        Self {
            dialect,
            columns: Some(users_columns()),
            statements: Mutex::new(Vec::new()),
            fail_on_call: None,
            calls: AtomicUsize::new(0),
            next_key: AtomicI64::new(1),
        }
    }

    /// Fail the `call`-th statement (1-based) with a constraint violation
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn without_introspection(mut self) -> Self {
        self.columns = None;
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn statements(&self) -> Vec<Recorded> {
        self.statements.lock().clone()
    }

    fn record(&self, sql: &str, params: &[Value]) -> Result<Recorded> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(BulkqlError::Query(
                "UNIQUE constraint failed: users.email".into(),
            ));
        }
        let recorded = Recorded {
            sql: sql.to_string(),
            params: params.to_vec(),
        };
        self.statements.lock().push(recorded.clone());
        Ok(recorded)
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    fn driver_name(&self) -> &str {
        "recording"
    }

    fn dialect_id(&self) -> Option<&'static str> {
        self.dialect
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        let recorded = self.record(sql, params)?;
        Ok(StatementResult {
            affected_rows: recorded.row_count() as u64,
            execution_time_ms: 0,
        })
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let recorded = self.record(sql, params)?;
        let rows = (0..recorded.row_count())
            .map(|_| {
                let key = self.next_key.fetch_add(1, Ordering::SeqCst);
                Row::new(vec!["id".into()], vec![Value::Int64(key)])
            })
            .collect();
        Ok(QueryResult {
            rows,
            ..QueryResult::empty()
        })
    }

    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        self.columns.as_ref().map(|_| self as &dyn SchemaIntrospection)
    }
}

#[async_trait]
impl SchemaIntrospection for RecordingConnection {
    async fn get_columns(&self, _schema: Option<&str>, table: &str) -> Result<Vec<ColumnInfo>> {
        match (&self.columns, table) {
            (Some(columns), "users") => Ok(columns.clone()),
            _ => Ok(Vec::new()),
        }
    }
}

/// `users(id PK autoincrement, email, name, status DEFAULT 'active', created_at)`
pub fn users_columns() -> Vec<ColumnInfo> {
    let column = |name: &str, ordinal: usize| ColumnInfo {
        name: name.to_string(),
        ordinal,
        data_type: "TEXT".to_string(),
        nullable: true,
        ..Default::default()
    };
    vec![
        ColumnInfo {
            data_type: "INTEGER".into(),
            is_primary_key: true,
            is_auto_increment: true,
            nullable: false,
            ..column("id", 0)
        },
        column("email", 1),
        column("name", 2),
        ColumnInfo {
            default_value: Some("'active'".into()),
            ..column("status", 3)
        },
        column("created_at", 4),
    ]
}

pub fn base_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Advances one second on every call
#[derive(Debug, Default)]
pub struct SteppingClock {
    ticks: AtomicI64,
}

impl Clock for SteppingClock {
    fn now(&self) -> Value {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        Value::DateTimeUtc(base_instant() + Duration::seconds(tick))
    }
}

pub fn email(address: &str) -> Vec<(&'static str, Value)> {
    vec![("email", Value::from(address))]
}
