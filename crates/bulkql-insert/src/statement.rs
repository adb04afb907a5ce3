//! Multi-row INSERT statement generation
//!
//! Default cells in non-timestamp columns are resolved per batch:
//!
//! | Batch situation            | Generic / SQLite                                  | MySQL / PostgreSQL |
//! |----------------------------|---------------------------------------------------|--------------------|
//! | every row has `Default`    | column omitted                                    | column omitted     |
//! | some rows have `Default`   | catalog default expression inlined, else `NULL`   | `DEFAULT` keyword  |
//!
//! When omission would leave no columns at all, every column is kept and the
//! mixed rule applies. Timestamp columns are never omitted; their `Default`
//! cells receive the batch timestamp.

use crate::column_set::{ColumnSet, DefaultPolicy};
use crate::options::{BulkInsertOptions, UpdateDuplicates};
use crate::row::{Cell, Row};
use bulkql_core::{
    BulkqlError, IgnoreStyle, InsertDialect, Result, TableColumns, TableRef, Value,
};

/// Resolved update-on-duplicate clause inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertPlan {
    /// Conflict columns; empty for dialects that pick the key themselves
    pub conflict_target: Vec<String>,
    pub update_columns: Vec<String>,
}

/// Statement options resolved against table metadata and a dialect
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertPlan {
    pub ignore: bool,
    pub upsert: Option<UpsertPlan>,
    /// Key column to return, when returning was requested
    pub returning: Option<String>,
}

impl InsertPlan {
    pub fn resolve(
        options: &BulkInsertOptions,
        column_set: &ColumnSet,
        table: &TableColumns,
        dialect: &dyn InsertDialect,
    ) -> Result<Self> {
        if options.ignore && options.update_duplicates.is_enabled() {
            return Err(BulkqlError::Configuration(
                "ignore and update_duplicates cannot be combined".into(),
            ));
        }
        if options.ignore && !dialect.supports_ignore() {
            return Err(unsupported("ignore", dialect));
        }

        let upsert = match &options.update_duplicates {
            UpdateDuplicates::Disabled => None,
            requested => {
                let Some(style) = dialect.upsert_style() else {
                    return Err(unsupported("update_duplicates", dialect));
                };
                let conflict_target = match requested {
                    UpdateDuplicates::Columns(columns) => {
                        if let Some(missing) = columns.iter().find(|c| !table.has_column(c)) {
                            return Err(BulkqlError::Configuration(format!(
                                "conflict column {} does not exist on table {}",
                                missing, table.table
                            )));
                        }
                        if style.requires_conflict_target() {
                            columns.clone()
                        } else {
                            tracing::debug!(
                                dialect = dialect.id(),
                                "dialect chooses the conflicting key itself; conflict columns only validated"
                            );
                            Vec::new()
                        }
                    }
                    _ if style.requires_conflict_target() => {
                        if table.primary_key.is_empty() {
                            return Err(BulkqlError::Configuration(format!(
                                "table {} has no primary key to use as conflict target",
                                table.table
                            )));
                        }
                        table.primary_key.clone()
                    }
                    _ => Vec::new(),
                };

                let update_columns = match &options.update_columns {
                    Some(columns) => {
                        if let Some(stray) = columns.iter().find(|c| !column_set.contains(c)) {
                            return Err(BulkqlError::Configuration(format!(
                                "update column {} is not one of the inserted columns",
                                stray
                            )));
                        }
                        columns.clone()
                    }
                    None => column_set.columns().to_vec(),
                };

                Some(UpsertPlan {
                    conflict_target,
                    update_columns,
                })
            }
        };

        let returning = if options.return_primary_keys {
            if !dialect.supports_returning() {
                return Err(unsupported("return_primary_keys", dialect));
            }
            let key = table.primary_key.first().ok_or_else(|| {
                BulkqlError::Configuration(format!(
                    "table {} has no primary key to return",
                    table.table
                ))
            })?;
            if table.primary_key.len() > 1 {
                tracing::debug!(key = %key, "composite primary key; returning its first column");
            }
            Some(key.clone())
        } else {
            None
        };

        Ok(Self {
            ignore: options.ignore,
            upsert,
            returning,
        })
    }
}

fn unsupported(option: &'static str, dialect: &dyn InsertDialect) -> BulkqlError {
    BulkqlError::UnsupportedOption {
        option,
        dialect: dialect.id(),
    }
}

/// One executable statement
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
    /// The statement ends with a returning clause and yields rows
    pub returning: bool,
    /// Number of rows in the VALUES list
    pub row_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnMode {
    Omit,
    Include,
}

/// Builds INSERT statements for one column set, plan and dialect
#[derive(Debug, Clone, Copy)]
pub struct StatementBuilder<'a> {
    dialect: &'a dyn InsertDialect,
    column_set: &'a ColumnSet,
    plan: &'a InsertPlan,
}

impl<'a> StatementBuilder<'a> {
    pub fn new(dialect: &'a dyn InsertDialect, column_set: &'a ColumnSet, plan: &'a InsertPlan) -> Self {
        Self {
            dialect,
            column_set,
            plan,
        }
    }

    /// Fail if the plan asks for something the dialect cannot express
    pub fn check_capabilities(&self) -> Result<()> {
        if self.plan.ignore && !self.dialect.supports_ignore() {
            return Err(unsupported("ignore", self.dialect));
        }
        if self.plan.upsert.is_some() && !self.dialect.supports_update_on_duplicate() {
            return Err(unsupported("update_duplicates", self.dialect));
        }
        if self.plan.returning.is_some() && !self.dialect.supports_returning() {
            return Err(unsupported("return_primary_keys", self.dialect));
        }
        Ok(())
    }

    /// Build one statement for `rows`, or `None` when there are no rows.
    ///
    /// `batch_now` fills timestamp columns left at `Cell::Default`.
    pub fn build(&self, rows: &[Row], batch_now: Option<&Value>) -> Result<Option<Statement>> {
        self.check_capabilities()?;
        if rows.is_empty() {
            return Ok(None);
        }
        if let Some(row) = rows.iter().find(|r| r.len() != self.column_set.len()) {
            return Err(BulkqlError::RowShape(format!(
                "row has {} cells, column set has {}",
                row.len(),
                self.column_set.len()
            )));
        }

        let modes = self.column_modes(rows);
        let included: Vec<usize> = modes
            .iter()
            .enumerate()
            .filter(|(_, mode)| **mode == ColumnMode::Include)
            .map(|(i, _)| i)
            .collect();

        let mut sql = String::from("INSERT");
        if self.plan.ignore
            && let Some(IgnoreStyle::InsertModifier(modifier)) = self.dialect.ignore_style()
        {
            sql.push(' ');
            sql.push_str(modifier);
        }
        sql.push_str(" INTO ");
        sql.push_str(&self.quoted_table(self.column_set.table()));
        sql.push_str(" (");
        sql.push_str(
            &included
                .iter()
                .map(|&i| self.dialect.quote_identifier(&self.column_set.columns()[i]))
                .collect::<Vec<_>>()
                .join(", "),
        );
        sql.push_str(") VALUES ");

        let mut params = Vec::with_capacity(rows.len() * included.len());
        for (row_index, row) in rows.iter().enumerate() {
            if row_index > 0 {
                sql.push_str(", ");
            }
            sql.push('(');
            for (position, &column) in included.iter().enumerate() {
                if position > 0 {
                    sql.push_str(", ");
                }
                match &row.cells()[column] {
                    Cell::Value(value) => self.push_param(&mut sql, &mut params, value.clone()),
                    Cell::Default => self.push_default(&mut sql, &mut params, column, batch_now)?,
                }
            }
            sql.push(')');
        }

        if self.plan.ignore
            && let Some(IgnoreStyle::ConflictClause(clause)) = self.dialect.ignore_style()
        {
            sql.push(' ');
            sql.push_str(clause);
        }

        if let Some(upsert) = &self.plan.upsert {
            let update_columns = self.statement_update_columns(upsert, &included);
            if let Some(clause) = self
                .dialect
                .render_upsert(&upsert.conflict_target, &update_columns)
            {
                sql.push(' ');
                sql.push_str(&clause);
            }
        }

        let mut returning = false;
        if let Some(key) = &self.plan.returning
            && let Some(clause) = self.dialect.render_returning(key)
        {
            sql.push(' ');
            sql.push_str(&clause);
            returning = true;
        }

        Ok(Some(Statement {
            sql,
            params,
            returning,
            row_count: rows.len(),
        }))
    }

    fn column_modes(&self, rows: &[Row]) -> Vec<ColumnMode> {
        let modes: Vec<ColumnMode> = (0..self.column_set.len())
            .map(|column| {
                let timestamp = matches!(
                    self.column_set.policy(column),
                    Some(DefaultPolicy::Timestamp)
                );
                let all_default = rows.iter().all(|r| r.cells()[column].is_default());
                if all_default && !timestamp {
                    ColumnMode::Omit
                } else {
                    ColumnMode::Include
                }
            })
            .collect();

        if modes.iter().all(|m| *m == ColumnMode::Omit) {
            vec![ColumnMode::Include; modes.len()]
        } else {
            modes
        }
    }

    fn push_param(&self, sql: &mut String, params: &mut Vec<Value>, value: Value) {
        params.push(value);
        sql.push_str(&self.dialect.placeholder(params.len()));
    }

    fn push_default(
        &self,
        sql: &mut String,
        params: &mut Vec<Value>,
        column: usize,
        batch_now: Option<&Value>,
    ) -> Result<()> {
        match self.column_set.policy(column) {
            Some(DefaultPolicy::Timestamp) => {
                let now = batch_now.ok_or_else(|| {
                    BulkqlError::Configuration(format!(
                        "no batch timestamp for column {}",
                        self.column_set.columns()[column]
                    ))
                })?;
                self.push_param(sql, params, now.clone());
            }
            _ if self.dialect.supports_default_keyword() => sql.push_str("DEFAULT"),
            Some(DefaultPolicy::ServerDefault {
                expression: Some(expression),
            }) => {
                sql.push('(');
                sql.push_str(expression);
                sql.push(')');
            }
            _ => self.push_param(sql, params, Value::Null),
        }
        Ok(())
    }

    /// Update columns that are part of this statement; all of them when none are
    fn statement_update_columns(&self, upsert: &UpsertPlan, included: &[usize]) -> Vec<String> {
        let present: Vec<String> = upsert
            .update_columns
            .iter()
            .filter(|c| {
                self.column_set
                    .position(c)
                    .is_some_and(|i| included.contains(&i))
            })
            .cloned()
            .collect();
        if present.is_empty() {
            upsert.update_columns.clone()
        } else {
            present
        }
    }

    fn quoted_table(&self, table: &TableRef) -> String {
        match &table.schema {
            Some(schema) => format!(
                "{}.{}",
                self.dialect.quote_identifier(schema),
                self.dialect.quote_identifier(&table.name)
            ),
            None => self.dialect.quote_identifier(&table.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::RowInput;
    use bulkql_core::{GenericDialect, MySqlDialect, PostgresDialect, SqliteDialect};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn users() -> TableColumns {
        TableColumns::new("users", ["id", "email", "name", "status", "created_at"])
            .with_primary_key(["id"])
            .with_server_default("id", None)
            .with_server_default("status", Some("'active'"))
            .with_timestamp_columns(["created_at"])
    }

    fn column_set(columns: &[&str]) -> ColumnSet {
        let explicit: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        ColumnSet::resolve(&explicit, &users()).unwrap()
    }

    fn rows(set: &ColumnSet, inputs: Vec<RowInput>) -> Vec<Row> {
        inputs.into_iter().map(|i| set.normalize(i).unwrap()).collect()
    }

    fn build(
        dialect: &dyn InsertDialect,
        set: &ColumnSet,
        plan: &InsertPlan,
        rows: &[Row],
    ) -> Statement {
        StatementBuilder::new(dialect, set, plan)
            .build(rows, Some(&Value::from("2024-01-01T00:00:00Z")))
            .unwrap()
            .unwrap()
    }

    #[rstest]
    #[case::generic(&GenericDialect, "INSERT INTO \"users\" (\"email\", \"name\") VALUES (?, ?), (?, ?)")]
    #[case::mysql(&MySqlDialect, "INSERT INTO `users` (`email`, `name`) VALUES (?, ?), (?, ?)")]
    #[case::postgres(&PostgresDialect, "INSERT INTO \"users\" (\"email\", \"name\") VALUES ($1, $2), ($3, $4)")]
    #[case::sqlite(&SqliteDialect, "INSERT INTO \"users\" (\"email\", \"name\") VALUES (?, ?), (?, ?)")]
    fn plain_multi_row_insert(#[case] dialect: &dyn InsertDialect, #[case] expected: &str) {
        let set = column_set(&["email", "name"]);
        let batch = rows(
            &set,
            vec![
                vec![Value::from("a@x"), Value::from("Ann")].into(),
                vec![Value::from("b@x"), Value::from("Bob")].into(),
            ],
        );
        let statement = build(dialect, &set, &InsertPlan::default(), &batch);
        assert_eq!(statement.sql, expected);
        assert_eq!(
            statement.params,
            vec![
                Value::from("a@x"),
                Value::from("Ann"),
                Value::from("b@x"),
                Value::from("Bob")
            ]
        );
        assert_eq!(statement.row_count, 2);
        assert!(!statement.returning);
    }

    #[test]
    fn schema_qualified_table_is_quoted_per_part() {
        let table = TableColumns::new(TableRef::with_schema("app", "users"), ["email"]);
        let set = ColumnSet::resolve(&[], &table).unwrap();
        let batch = rows(&set, vec![vec![Value::from("a@x")].into()]);
        let statement = build(&PostgresDialect, &set, &InsertPlan::default(), &batch);
        assert_eq!(
            statement.sql,
            "INSERT INTO \"app\".\"users\" (\"email\") VALUES ($1)"
        );
    }

    #[rstest]
    #[case::mysql(&MySqlDialect, "INSERT IGNORE INTO `users` (`email`) VALUES (?)")]
    #[case::postgres(&PostgresDialect, "INSERT INTO \"users\" (\"email\") VALUES ($1) ON CONFLICT DO NOTHING")]
    #[case::sqlite(&SqliteDialect, "INSERT OR IGNORE INTO \"users\" (\"email\") VALUES (?)")]
    fn ignore_clause_per_dialect(#[case] dialect: &dyn InsertDialect, #[case] expected: &str) {
        let set = column_set(&["email"]);
        let plan = InsertPlan {
            ignore: true,
            ..Default::default()
        };
        let batch = rows(&set, vec![vec![Value::from("a@x")].into()]);
        assert_eq!(build(dialect, &set, &plan, &batch).sql, expected);
    }

    #[test]
    fn ignore_on_generic_is_unsupported() {
        let set = column_set(&["email"]);
        let options = BulkInsertOptions::new().ignore(true);
        let err = InsertPlan::resolve(&options, &set, &users(), &GenericDialect).unwrap_err();
        assert!(matches!(
            err,
            BulkqlError::UnsupportedOption {
                option: "ignore",
                dialect: "generic"
            }
        ));
    }

    #[test]
    fn builder_rejects_plan_the_dialect_cannot_express() {
        let set = column_set(&["email"]);
        let plan = InsertPlan {
            returning: Some("id".into()),
            ..Default::default()
        };
        let batch = rows(&set, vec![vec![Value::from("a@x")].into()]);
        let err = StatementBuilder::new(&MySqlDialect, &set, &plan)
            .build(&batch, None)
            .unwrap_err();
        assert!(matches!(err, BulkqlError::UnsupportedOption { .. }));
    }

    #[test]
    fn natural_upsert_on_postgres_targets_primary_key() {
        let set = column_set(&["id", "email", "name"]);
        let options = BulkInsertOptions::new()
            .update_duplicates(true)
            .update_columns(["name"]);
        let plan = InsertPlan::resolve(&options, &set, &users(), &PostgresDialect).unwrap();
        assert_eq!(
            plan.upsert,
            Some(UpsertPlan {
                conflict_target: vec!["id".into()],
                update_columns: vec!["name".into()],
            })
        );
        let batch = rows(
            &set,
            vec![vec![Value::Int64(1), Value::from("a@x"), Value::from("Ann")].into()],
        );
        assert_eq!(
            build(&PostgresDialect, &set, &plan, &batch).sql,
            "INSERT INTO \"users\" (\"id\", \"email\", \"name\") VALUES ($1, $2, $3) \
             ON CONFLICT (\"id\") DO UPDATE SET \"name\"=EXCLUDED.\"name\""
        );
    }

    #[test]
    fn explicit_conflict_columns_on_sqlite() {
        let set = column_set(&["email", "name"]);
        let options = BulkInsertOptions::new().update_duplicates(&["email"][..]);
        let plan = InsertPlan::resolve(&options, &set, &users(), &SqliteDialect).unwrap();
        let batch = rows(&set, vec![vec![Value::from("a@x"), Value::from("Ann")].into()]);
        assert_eq!(
            build(&SqliteDialect, &set, &plan, &batch).sql,
            "INSERT INTO \"users\" (\"email\", \"name\") VALUES (?, ?) \
             ON CONFLICT (\"email\") DO UPDATE SET \"email\"=EXCLUDED.\"email\", \"name\"=EXCLUDED.\"name\""
        );
    }

    #[test]
    fn mysql_upsert_needs_no_conflict_target() {
        let set = column_set(&["email", "name"]);
        let options = BulkInsertOptions::new().update_duplicates(&["email"][..]);
        let plan = InsertPlan::resolve(&options, &set, &users(), &MySqlDialect).unwrap();
        assert_eq!(plan.upsert.as_ref().map(|u| u.conflict_target.len()), Some(0));
        let batch = rows(&set, vec![vec![Value::from("a@x"), Value::from("Ann")].into()]);
        assert_eq!(
            build(&MySqlDialect, &set, &plan, &batch).sql,
            "INSERT INTO `users` (`email`, `name`) VALUES (?, ?) \
             ON DUPLICATE KEY UPDATE `email`=VALUES(`email`), `name`=VALUES(`name`)"
        );
    }

    #[rstest]
    #[case::unknown_conflict_column(BulkInsertOptions::new().update_duplicates(&["nope"][..]))]
    #[case::update_column_not_inserted(
        BulkInsertOptions::new().update_duplicates(true).update_columns(["status"])
    )]
    #[case::ignore_with_update(BulkInsertOptions::new().ignore(true).update_duplicates(true))]
    fn invalid_upsert_requests(#[case] options: BulkInsertOptions) {
        let set = column_set(&["email", "name"]);
        let err = InsertPlan::resolve(&options, &set, &users(), &PostgresDialect).unwrap_err();
        assert!(matches!(err, BulkqlError::Configuration(_)), "{err}");
    }

    #[test]
    fn natural_upsert_without_primary_key_is_rejected() {
        let table = TableColumns::new("events", ["kind"]);
        let set = ColumnSet::resolve(&[], &table).unwrap();
        let options = BulkInsertOptions::new().update_duplicates(true);
        let err = InsertPlan::resolve(&options, &set, &table, &SqliteDialect).unwrap_err();
        assert!(err.is_configuration());
    }

    #[rstest]
    #[case::postgres(&PostgresDialect, "INSERT INTO \"users\" (\"email\") VALUES ($1), ($2) RETURNING \"id\"")]
    #[case::sqlite(&SqliteDialect, "INSERT INTO \"users\" (\"email\") VALUES (?), (?) RETURNING \"id\"")]
    fn returning_clause(#[case] dialect: &dyn InsertDialect, #[case] expected: &str) {
        let set = column_set(&["email"]);
        let options = BulkInsertOptions::new().return_primary_keys(true);
        let plan = InsertPlan::resolve(&options, &set, &users(), dialect).unwrap();
        let batch = rows(
            &set,
            vec![vec![Value::from("a@x")].into(), vec![Value::from("b@x")].into()],
        );
        let statement = build(dialect, &set, &plan, &batch);
        assert_eq!(statement.sql, expected);
        assert!(statement.returning);
    }

    #[rstest]
    #[case::generic(&GenericDialect)]
    #[case::mysql(&MySqlDialect)]
    fn returning_unsupported(#[case] dialect: &dyn InsertDialect) {
        let set = column_set(&["email"]);
        let options = BulkInsertOptions::new().return_primary_keys(true);
        let err = InsertPlan::resolve(&options, &set, &users(), dialect).unwrap_err();
        assert!(matches!(
            err,
            BulkqlError::UnsupportedOption {
                option: "return_primary_keys",
                ..
            }
        ));
    }

    #[rstest]
    #[case::generic(&GenericDialect)]
    #[case::mysql(&MySqlDialect)]
    #[case::postgres(&PostgresDialect)]
    #[case::sqlite(&SqliteDialect)]
    fn column_default_in_every_row_is_omitted(#[case] dialect: &dyn InsertDialect) {
        let set = column_set(&["email", "status"]);
        let batch = rows(
            &set,
            vec![
                vec![("email", Value::from("a@x"))].into(),
                vec![("email", Value::from("b@x"))].into(),
            ],
        );
        let statement = build(dialect, &set, &InsertPlan::default(), &batch);
        let quoted_status = dialect.quote_identifier("status");
        assert!(!statement.sql.contains(&quoted_status), "{}", statement.sql);
        assert_eq!(statement.params.len(), 2);
    }

    #[rstest]
    #[case::generic(&GenericDialect, "INSERT INTO \"users\" (\"email\", \"status\") VALUES (?, ?), (?, ('active'))", 3)]
    #[case::mysql(&MySqlDialect, "INSERT INTO `users` (`email`, `status`) VALUES (?, ?), (?, DEFAULT)", 3)]
    #[case::postgres(&PostgresDialect, "INSERT INTO \"users\" (\"email\", \"status\") VALUES ($1, $2), ($3, DEFAULT)", 3)]
    #[case::sqlite(&SqliteDialect, "INSERT INTO \"users\" (\"email\", \"status\") VALUES (?, ?), (?, ('active'))", 3)]
    fn mixed_column_default_per_dialect(
        #[case] dialect: &dyn InsertDialect,
        #[case] expected: &str,
        #[case] param_count: usize,
    ) {
        let set = column_set(&["email", "status"]);
        let batch = rows(
            &set,
            vec![
                vec![("email", Value::from("a@x")), ("status", Value::from("banned"))].into(),
                vec![("email", Value::from("b@x"))].into(),
            ],
        );
        let statement = build(dialect, &set, &InsertPlan::default(), &batch);
        assert_eq!(statement.sql, expected);
        assert_eq!(statement.params.len(), param_count);
    }

    #[test]
    fn mixed_default_without_expression_binds_null_on_sqlite() {
        let set = column_set(&["email", "name"]);
        let batch = rows(
            &set,
            vec![
                vec![("email", Value::from("a@x")), ("name", Value::from("Ann"))].into(),
                vec![("email", Value::from("b@x"))].into(),
            ],
        );
        let statement = build(&SqliteDialect, &set, &InsertPlan::default(), &batch);
        assert_eq!(
            statement.params,
            vec![
                Value::from("a@x"),
                Value::from("Ann"),
                Value::from("b@x"),
                Value::Null
            ]
        );
    }

    #[rstest]
    #[case::postgres(&PostgresDialect, "INSERT INTO \"users\" (\"email\", \"name\") VALUES (DEFAULT, DEFAULT)")]
    #[case::sqlite(&SqliteDialect, "INSERT INTO \"users\" (\"email\", \"name\") VALUES (?, ?)")]
    fn all_default_row_keeps_every_column(#[case] dialect: &dyn InsertDialect, #[case] expected: &str) {
        let set = column_set(&["email", "name"]);
        let batch = rows(&set, vec![RowInput::Keyed(Vec::new())]);
        assert_eq!(build(dialect, &set, &InsertPlan::default(), &batch).sql, expected);
    }

    #[test]
    fn timestamp_defaults_share_the_batch_timestamp() {
        let set = column_set(&["email", "created_at"]);
        let now = Value::from("2024-05-06T07:08:09Z");
        let supplied = Value::from("1999-12-31T23:59:59Z");
        let batch = rows(
            &set,
            vec![
                vec![("email", Value::from("a@x"))].into(),
                vec![("email", Value::from("b@x")), ("created_at", supplied.clone())].into(),
                vec![("email", Value::from("c@x"))].into(),
            ],
        );
        let statement = StatementBuilder::new(&SqliteDialect, &set, &InsertPlan::default())
            .build(&batch, Some(&now))
            .unwrap()
            .unwrap();
        assert_eq!(
            statement.params,
            vec![
                Value::from("a@x"),
                now.clone(),
                Value::from("b@x"),
                supplied,
                Value::from("c@x"),
                now
            ]
        );
    }

    #[test]
    fn timestamp_default_without_batch_time_fails() {
        let set = column_set(&["email", "created_at"]);
        let batch = rows(&set, vec![vec![("email", Value::from("a@x"))].into()]);
        let err = StatementBuilder::new(&SqliteDialect, &set, &InsertPlan::default())
            .build(&batch, None)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn empty_batch_builds_nothing() {
        let set = column_set(&["email"]);
        let built = StatementBuilder::new(&SqliteDialect, &set, &InsertPlan::default())
            .build(&[], None)
            .unwrap();
        assert_eq!(built, None);
    }

    #[test]
    fn output_is_deterministic() {
        let set = column_set(&["email", "status"]);
        let batch = rows(
            &set,
            vec![
                vec![("email", Value::from("a@x"))].into(),
                vec![("status", Value::from("x")), ("email", Value::from("b@x"))].into(),
            ],
        );
        let first = build(&PostgresDialect, &set, &InsertPlan::default(), &batch);
        let second = build(&PostgresDialect, &set, &InsertPlan::default(), &batch);
        assert_eq!(first, second);
    }

    #[test]
    fn identifiers_with_quotes_are_escaped() {
        let table = TableColumns::new("odd\"table", ["we\"ird"]);
        let set = ColumnSet::resolve(&[], &table).unwrap();
        let batch = rows(&set, vec![vec![Value::from(1i64)].into()]);
        assert_eq!(
            build(&SqliteDialect, &set, &InsertPlan::default(), &batch).sql,
            "INSERT INTO \"odd\"\"table\" (\"we\"\"ird\") VALUES (?)"
        );
    }
}
