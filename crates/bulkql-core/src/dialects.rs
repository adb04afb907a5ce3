//! Built-in insert dialects and the dialect registry
//!
//! | Capability          | Generic | MySQL          | PostgreSQL               | SQLite          |
//! |---------------------|---------|----------------|--------------------------|-----------------|
//! | identifier quote    | `"`     | `` ` ``        | `"`                      | `"`             |
//! | placeholder         | `?`     | `?`            | `$n`                     | `?`             |
//! | ignore              | -       | `INSERT IGNORE`| `ON CONFLICT DO NOTHING` | `INSERT OR IGNORE` |
//! | upsert              | -       | duplicate key  | conflict target          | conflict target |
//! | returning           | -       | -              | yes                      | yes             |
//! | `DEFAULT` in VALUES | -       | yes            | yes                      | -               |

use crate::dialect::{IgnoreStyle, InsertDialect, PlaceholderStyle, UpsertStyle};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// ANSI fallback: plain multi-row INSERT, nothing else
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericDialect;

impl InsertDialect for GenericDialect {
    fn id(&self) -> &'static str {
        "generic"
    }

    fn display_name(&self) -> &'static str {
        "SQL"
    }
}

/// MySQL / MariaDB
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl InsertDialect for MySqlDialect {
    fn id(&self) -> &'static str {
        "mysql"
    }

    fn display_name(&self) -> &'static str {
        "MySQL"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn ignore_style(&self) -> Option<IgnoreStyle> {
        Some(IgnoreStyle::InsertModifier("IGNORE"))
    }

    fn upsert_style(&self) -> Option<UpsertStyle> {
        Some(UpsertStyle::DuplicateKeyUpdate)
    }

    fn supports_default_keyword(&self) -> bool {
        true
    }

    fn max_bind_parameters(&self) -> Option<usize> {
        Some(65_535)
    }
}

/// PostgreSQL
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl InsertDialect for PostgresDialect {
    fn id(&self) -> &'static str {
        "postgres"
    }

    fn display_name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::DollarNumbered
    }

    fn ignore_style(&self) -> Option<IgnoreStyle> {
        Some(IgnoreStyle::ConflictClause("ON CONFLICT DO NOTHING"))
    }

    fn upsert_style(&self) -> Option<UpsertStyle> {
        Some(UpsertStyle::OnConflictUpdate)
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn supports_default_keyword(&self) -> bool {
        true
    }

    fn max_bind_parameters(&self) -> Option<usize> {
        Some(65_535)
    }
}

/// SQLite (3.35+ for RETURNING)
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl InsertDialect for SqliteDialect {
    fn id(&self) -> &'static str {
        "sqlite"
    }

    fn display_name(&self) -> &'static str {
        "SQLite"
    }

    fn ignore_style(&self) -> Option<IgnoreStyle> {
        Some(IgnoreStyle::InsertModifier("OR IGNORE"))
    }

    fn upsert_style(&self) -> Option<UpsertStyle> {
        Some(UpsertStyle::OnConflictUpdate)
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn max_bind_parameters(&self) -> Option<usize> {
        // SQLITE_MAX_VARIABLE_NUMBER since 3.32
        Some(32_766)
    }
}

/// Global insert dialect registry, keyed by driver id and its aliases
pub static INSERT_DIALECTS: LazyLock<HashMap<&'static str, Arc<dyn InsertDialect>>> =
    LazyLock::new(|| {
        let postgres: Arc<dyn InsertDialect> = Arc::new(PostgresDialect);
        let mysql: Arc<dyn InsertDialect> = Arc::new(MySqlDialect);
        let sqlite: Arc<dyn InsertDialect> = Arc::new(SqliteDialect);
        let generic: Arc<dyn InsertDialect> = Arc::new(GenericDialect);

        let mut registry = HashMap::new();
        for alias in ["postgres", "postgresql", "pg"] {
            registry.insert(alias, Arc::clone(&postgres));
        }
        for alias in ["mysql", "mariadb"] {
            registry.insert(alias, Arc::clone(&mysql));
        }
        for alias in ["sqlite", "sqlite3"] {
            registry.insert(alias, Arc::clone(&sqlite));
        }
        registry.insert("generic", generic);
        registry
    });

/// Get the insert dialect for a connection's dialect id.
///
/// Unknown or missing ids fall back to the generic dialect.
pub fn get_insert_dialect(dialect_id: Option<&str>) -> Arc<dyn InsertDialect> {
    let key = dialect_id.map(str::to_ascii_lowercase);
    match key.as_deref().and_then(|id| INSERT_DIALECTS.get(id)) {
        Some(dialect) => Arc::clone(dialect),
        None => {
            if let Some(id) = dialect_id {
                tracing::warn!(dialect = %id, "unknown insert dialect, falling back to generic SQL");
            }
            Arc::new(GenericDialect)
        }
    }
}
