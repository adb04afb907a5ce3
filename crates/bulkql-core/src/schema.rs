//! Schema introspection traits and types

use crate::{BulkqlError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Column names treated as creation/update timestamps.
pub const TIMESTAMP_COLUMN_NAMES: &[&str] = &["created_at", "updated_at"];

/// Whether `name` is recognised as a creation/update timestamp column
pub fn is_timestamp_column_name(name: &str) -> bool {
    TIMESTAMP_COLUMN_NAMES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(name))
}

/// Schema introspection interface
///
/// Implementations only need to answer column and primary key lookups; the
/// insert engine derives everything else through `resolve_table_columns`.
#[async_trait]
pub trait SchemaIntrospection: Send + Sync {
    /// Get columns for a table, in table order
    async fn get_columns(&self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Get primary key for a table
    async fn get_primary_key(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Option<PrimaryKeyInfo>> {
        let columns = self.get_columns(schema, table).await?;
        let pk_columns: Vec<String> = columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.clone())
            .collect();

        if pk_columns.is_empty() {
            Ok(None)
        } else {
            Ok(Some(PrimaryKeyInfo {
                name: None,
                columns: pk_columns,
            }))
        }
    }

    /// Collect everything the insert engine needs to know about `table`.
    #[tracing::instrument(skip(self, table), fields(table = %table))]
    async fn resolve_table_columns(&self, table: &TableRef) -> Result<TableColumns> {
        let schema = table.schema.as_deref();
        let columns = self.get_columns(schema, &table.name).await?;
        if columns.is_empty() {
            return Err(BulkqlError::Configuration(format!(
                "table {} does not exist or has no columns",
                table
            )));
        }
        let primary_key = self.get_primary_key(schema, &table.name).await?;
        let resolved = TableColumns::from_column_info(table.clone(), &columns, primary_key);
        tracing::debug!(
            columns = resolved.all_columns.len(),
            primary_key = ?resolved.primary_key,
            "resolved table columns"
        );
        Ok(resolved)
    }
}

/// A possibly schema-qualified table name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    pub fn with_schema(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        TableRef::new(name)
    }
}

/// Column information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub ordinal: usize,
    pub data_type: String,
    pub nullable: bool,
    /// Default value expression as reported by the catalog
    pub default_value: Option<String>,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
}

/// Primary key information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryKeyInfo {
    pub name: Option<String>,
    pub columns: Vec<String>,
}

/// Table metadata as seen by the insert engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumns {
    pub table: TableRef,
    /// Every column, in table order
    pub all_columns: Vec<String>,
    /// Primary key columns (empty when the table has none)
    pub primary_key: Vec<String>,
    /// Columns with a database-side default, with the default expression when known
    pub server_defaults: BTreeMap<String, Option<String>>,
    /// Columns recognised as creation/update timestamps
    pub timestamp_columns: BTreeSet<String>,
}

impl TableColumns {
    /// Metadata with plain columns only. Use the `with_*` methods to add the rest.
    pub fn new<I, S>(table: impl Into<TableRef>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            all_columns: columns.into_iter().map(Into::into).collect(),
            primary_key: Vec::new(),
            server_defaults: BTreeMap::new(),
            timestamp_columns: BTreeSet::new(),
        }
    }

    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_server_default(mut self, column: impl Into<String>, expression: Option<&str>) -> Self {
        self.server_defaults
            .insert(column.into(), expression.map(str::to_string));
        self
    }

    pub fn with_timestamp_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.timestamp_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Build from catalog rows, applying the timestamp naming rule.
    pub fn from_column_info(
        table: TableRef,
        columns: &[ColumnInfo],
        primary_key: Option<PrimaryKeyInfo>,
    ) -> Self {
        let mut ordered: Vec<&ColumnInfo> = columns.iter().collect();
        ordered.sort_by_key(|c| c.ordinal);

        let primary_key = primary_key.map(|pk| pk.columns).unwrap_or_else(|| {
            ordered
                .iter()
                .filter(|c| c.is_primary_key)
                .map(|c| c.name.clone())
                .collect()
        });

        let server_defaults = ordered
            .iter()
            .filter(|c| c.default_value.is_some() || c.is_auto_increment)
            .map(|c| (c.name.clone(), c.default_value.clone()))
            .collect();

        let timestamp_columns = ordered
            .iter()
            .filter(|c| is_timestamp_column_name(&c.name))
            .map(|c| c.name.clone())
            .collect();

        Self {
            table,
            all_columns: ordered.iter().map(|c| c.name.clone()).collect(),
            primary_key,
            server_defaults,
            timestamp_columns,
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.all_columns.iter().any(|c| c == name)
    }

    pub fn is_primary_key(&self, name: &str) -> bool {
        self.primary_key.iter().any(|c| c == name)
    }

    pub fn has_server_default(&self, name: &str) -> bool {
        self.server_defaults.contains_key(name)
    }

    /// The default expression for `name`, if the catalog reported one
    pub fn server_default_expression(&self, name: &str) -> Option<&str> {
        self.server_defaults.get(name).and_then(|e| e.as_deref())
    }

    pub fn is_timestamp(&self, name: &str) -> bool {
        self.timestamp_columns.contains(name)
    }
}
