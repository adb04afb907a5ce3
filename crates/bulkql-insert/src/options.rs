//! Bulk insert configuration
//!
//! Options can be built in code with the builder-style setters or loaded from
//! TOML, either at the document root or under a `[bulk_insert]` table:
//!
//! ```toml
//! [bulk_insert]
//! columns = ["email", "name"]
//! set_size = 1000
//! update_duplicates = ["email"]
//! update_columns = ["name"]
//! ```

use bulkql_core::{BulkqlError, Result};
use serde::{Deserialize, Serialize};

/// Rows per generated statement when nothing else is configured
pub const DEFAULT_SET_SIZE: usize = 500;

fn default_set_size() -> usize {
    DEFAULT_SET_SIZE
}

/// Update-on-duplicate request.
///
/// Deserialises from `false`, `true` or a list of conflict target columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UpdateDuplicatesRepr", into = "UpdateDuplicatesRepr")]
pub enum UpdateDuplicates {
    #[default]
    Disabled,
    /// Use the table's natural conflict target (its primary key)
    Natural,
    /// Explicit conflict target columns
    Columns(Vec<String>),
}

impl UpdateDuplicates {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, UpdateDuplicates::Disabled)
    }
}

impl From<bool> for UpdateDuplicates {
    fn from(enabled: bool) -> Self {
        if enabled {
            UpdateDuplicates::Natural
        } else {
            UpdateDuplicates::Disabled
        }
    }
}

impl From<Vec<String>> for UpdateDuplicates {
    fn from(columns: Vec<String>) -> Self {
        if columns.is_empty() {
            UpdateDuplicates::Natural
        } else {
            UpdateDuplicates::Columns(columns)
        }
    }
}

impl From<&[&str]> for UpdateDuplicates {
    fn from(columns: &[&str]) -> Self {
        columns
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .into()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum UpdateDuplicatesRepr {
    Flag(bool),
    Columns(Vec<String>),
}

impl From<UpdateDuplicatesRepr> for UpdateDuplicates {
    fn from(repr: UpdateDuplicatesRepr) -> Self {
        match repr {
            UpdateDuplicatesRepr::Flag(flag) => flag.into(),
            UpdateDuplicatesRepr::Columns(columns) => columns.into(),
        }
    }
}

impl From<UpdateDuplicates> for UpdateDuplicatesRepr {
    fn from(value: UpdateDuplicates) -> Self {
        match value {
            UpdateDuplicates::Disabled => UpdateDuplicatesRepr::Flag(false),
            UpdateDuplicates::Natural => UpdateDuplicatesRepr::Flag(true),
            UpdateDuplicates::Columns(columns) => UpdateDuplicatesRepr::Columns(columns),
        }
    }
}

/// Options for one bulk insert worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkInsertOptions {
    /// Target columns; empty means every column except the primary key
    #[serde(default)]
    pub columns: Vec<String>,

    /// Maximum rows per generated statement
    #[serde(default = "default_set_size")]
    pub set_size: usize,

    /// Skip rows that violate a unique constraint
    #[serde(default)]
    pub ignore: bool,

    #[serde(default)]
    pub update_duplicates: UpdateDuplicates,

    /// Columns to overwrite on conflict; defaults to every target column
    #[serde(default)]
    pub update_columns: Option<Vec<String>>,

    /// Collect generated primary keys with `RETURNING`
    #[serde(default)]
    pub return_primary_keys: bool,
}

impl Default for BulkInsertOptions {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            set_size: DEFAULT_SET_SIZE,
            ignore: false,
            update_duplicates: UpdateDuplicates::Disabled,
            update_columns: None,
            return_primary_keys: false,
        }
    }
}

impl BulkInsertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_size(mut self, set_size: usize) -> Self {
        self.set_size = set_size;
        self
    }

    pub fn ignore(mut self, ignore: bool) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn update_duplicates(mut self, update: impl Into<UpdateDuplicates>) -> Self {
        self.update_duplicates = update.into();
        self
    }

    pub fn update_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn return_primary_keys(mut self, enabled: bool) -> Self {
        self.return_primary_keys = enabled;
        self
    }

    /// Parse options from TOML. A `[bulk_insert]` table takes precedence over
    /// keys at the document root.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let invalid =
            |e: toml::de::Error| BulkqlError::Configuration(format!("invalid bulk insert options: {}", e));
        let mut document: toml::Table = toml::from_str(source).map_err(invalid)?;
        let section = match document.remove("bulk_insert") {
            Some(toml::Value::Table(table)) => table,
            Some(other) => {
                return Err(BulkqlError::Configuration(format!(
                    "bulk_insert must be a table, found {}",
                    other.type_str()
                )));
            }
            None => document,
        };
        let options: BulkInsertOptions = toml::Value::Table(section).try_into().map_err(invalid)?;
        options.validate()?;
        Ok(options)
    }

    /// Checks that do not need table metadata or a dialect
    pub fn validate(&self) -> Result<()> {
        if self.set_size == 0 {
            return Err(BulkqlError::Configuration(
                "set_size must be greater than zero".into(),
            ));
        }
        if self.ignore && self.update_duplicates.is_enabled() {
            return Err(BulkqlError::Configuration(
                "ignore and update_duplicates cannot be combined".into(),
            ));
        }
        if matches!(&self.update_columns, Some(columns) if columns.is_empty()) {
            return Err(BulkqlError::Configuration(
                "update_columns must name at least one column".into(),
            ));
        }
        if self.update_columns.is_some() && !self.update_duplicates.is_enabled() {
            tracing::debug!("update_columns has no effect without update_duplicates");
        }
        Ok(())
    }
}
