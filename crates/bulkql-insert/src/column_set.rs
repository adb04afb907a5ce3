//! Target column resolution

use bulkql_core::{BulkqlError, Result, TableColumns, TableRef};
use std::collections::HashSet;

/// How a `Cell::Default` in a column is filled at flush time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultPolicy {
    /// No special handling; the database applies whatever it has
    Explicit,
    /// Filled with the batch timestamp
    Timestamp,
    /// Database-side default, with the expression when the catalog reports one
    ServerDefault { expression: Option<String> },
}

/// Ordered target columns of an insert, with a default policy per column.
///
/// Immutable once built; the worker owns one for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSet {
    table: TableRef,
    columns: Vec<String>,
    policies: Vec<DefaultPolicy>,
}

impl ColumnSet {
    /// Resolve the target columns for `table`.
    ///
    /// An empty `explicit` list selects every column except the primary key,
    /// in table order. A non-empty list is used verbatim.
    pub fn resolve(explicit: &[String], table: &TableColumns) -> Result<Self> {
        let columns: Vec<String> = if explicit.is_empty() {
            table
                .all_columns
                .iter()
                .filter(|c| !table.is_primary_key(c))
                .cloned()
                .collect()
        } else {
            let mut seen = HashSet::with_capacity(explicit.len());
            for column in explicit {
                if !table.has_column(column) {
                    return Err(BulkqlError::Configuration(format!(
                        "column {} does not exist on table {}",
                        column, table.table
                    )));
                }
                if !seen.insert(column.as_str()) {
                    return Err(BulkqlError::Configuration(format!(
                        "column {} is listed more than once",
                        column
                    )));
                }
            }
            explicit.to_vec()
        };

        if columns.is_empty() {
            return Err(BulkqlError::Configuration(format!(
                "table {} has no insertable columns",
                table.table
            )));
        }

        let policies = columns
            .iter()
            .map(|column| {
                if table.is_timestamp(column) {
                    DefaultPolicy::Timestamp
                } else if table.has_server_default(column) {
                    DefaultPolicy::ServerDefault {
                        expression: table.server_default_expression(column).map(str::to_string),
                    }
                } else {
                    DefaultPolicy::Explicit
                }
            })
            .collect();

        Ok(Self {
            table: table.table.clone(),
            columns,
            policies,
        })
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    pub fn policy(&self, index: usize) -> Option<&DefaultPolicy> {
        self.policies.get(index)
    }

    /// Indices of the columns filled with the batch timestamp
    pub fn timestamp_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.policies
            .iter()
            .enumerate()
            .filter(|(_, p)| matches!(p, DefaultPolicy::Timestamp))
            .map(|(i, _)| i)
    }

    pub fn timestamp_columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.timestamp_indices().map(|i| self.columns[i].as_str())
    }
}
